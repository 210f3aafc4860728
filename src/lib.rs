//! Generic in-memory graph traversal.
//!
//! Graphs are described by capability traits in [`core`] and implemented by
//! the representations in [`storage`]. The searches in [`search`] walk any
//! graph with the required capabilities and report their progress through
//! [events](event). Results are collected by [observers](observer) attached
//! to a search, and [`algo`] builds complete algorithms out of both.

pub mod algo;
pub mod core;
pub mod event;
pub mod infra;
pub mod observer;
pub mod search;
pub mod storage;

pub mod prelude {
    pub use crate::{
        algo::RootedAlgorithm,
        core::{
            Edge, EdgeSet, ImplicitGraph, ImplicitUndirectedGraph, ImplicitVertexSet,
            IncidenceGraph, BidirectionalIncidenceGraph, GraphBase, SEdge, VertexSet,
        },
        observer::Observer,
        search::{Bfs, Dfs, UndirectedBfs, UndirectedDfs},
        storage::{AdjacencyGraph, BidirectionalGraph, UndirectedGraph},
    };
}
