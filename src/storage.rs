//! Graph representations.
//!
//! * [`AdjacencyGraph`]: mutable, directed, out-edge lists.
//! * [`BidirectionalGraph`]: mutable, directed, out-edge and in-edge lists.
//! * [`UndirectedGraph`]: mutable, undirected.
//! * [`CompressedSparseRowGraph`]: immutable snapshot of a directed graph.
//! * [`delegate`]: graphs computed on demand by a function.
//!
//! The mutable graphs announce structural changes through
//! [`GraphEvents`]. These notifications are unrelated to traversal events.

pub mod adjacency;
pub mod bidirectional;
pub mod csr;
pub mod delegate;
pub mod undirected;

mod shared;

pub use adjacency::AdjacencyGraph;
pub use bidirectional::BidirectionalGraph;
pub use csr::CompressedSparseRowGraph;
pub use delegate::{DelegateImplicitGraph, DelegateIncidenceGraph, DelegateUndirectedGraph};
pub use shared::{EdgeListIter, EdgesIter, GraphEvents};
pub use undirected::UndirectedGraph;
