//! Color-based graph searches.
//!
//! Every search walks vertices (or edges) through the colors
//! [`White`](crate::core::Color::White) → [`Gray`](crate::core::Color::Gray) →
//! [`Black`](crate::core::Color::Black)
//! and classifies each examined edge by the color of its target at that
//! moment:
//!
//! * white target: tree edge,
//! * gray target: back edge,
//! * black target: forward or cross edge.
//!
//! The searches report their progress only through their event structs. They
//! never collect results themselves, that is what [observers](crate::observer)
//! are for.
//!
//! # Examples
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use walkgraph::{
//!     algo::RootedAlgorithm,
//!     core::SEdge,
//!     search::Bfs,
//!     storage::AdjacencyGraph,
//! };
//!
//! let graph = AdjacencyGraph::from_edges(
//!     [SEdge::new(1, 2), SEdge::new(1, 3), SEdge::new(2, 4), SEdge::new(3, 4)],
//!     true,
//! );
//!
//! let mut bfs = Bfs::new(&graph);
//! let order = Rc::new(RefCell::new(Vec::new()));
//! let _sub = bfs.events().discover_vertex.subscribe({
//!     let order = Rc::clone(&order);
//!     move |v| order.borrow_mut().push(*v)
//! });
//!
//! bfs.compute_from(1).unwrap();
//!
//! assert_eq!(*order.borrow(), vec![1, 2, 3, 4]);
//! ```

pub mod bfs;
pub mod bidirectional_dfs;
pub mod dfs;
pub mod edge_dfs;
pub mod implicit_dfs;
pub mod implicit_edge_dfs;
pub mod undirected_bfs;
pub mod undirected_dfs;

use std::vec;

use crate::core::{Edge, Error, ImplicitGraph, OwnableRef, VertexType};

pub use bfs::{Bfs, BfsEvents};
pub use bidirectional_dfs::BidirectionalDfs;
pub use dfs::{Dfs, DfsEvents};
pub use edge_dfs::{EdgeDfs, EdgeDfsEvents};
pub use implicit_dfs::ImplicitDfs;
pub use implicit_edge_dfs::ImplicitEdgeDfs;
pub use undirected_bfs::{UndirectedBfs, UndirectedBfsEvents};
pub use undirected_dfs::{UndirectedDfs, UndirectedDfsEvents};

/// An edge of an undirected graph as seen by a search.
///
/// `source` is the vertex the search came from and `target` the vertex it
/// reached. If the search traversed the edge from its stored target to its
/// stored source, `reversed` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UndirectedEdgeArgs<V, E> {
    pub edge: E,
    pub source: V,
    pub target: V,
    pub reversed: bool,
}

impl<V: VertexType, E: Edge<V>> UndirectedEdgeArgs<V, E> {
    pub(crate) fn new(edge: E, from: &V) -> Self {
        let reversed = edge.source() != from;
        let target = edge.other_vertex(from).clone();

        Self {
            source: from.clone(),
            target,
            reversed,
            edge,
        }
    }
}

/// Pair of edges in an edge search: `edge` was reached from `source_edge`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeEdgeArgs<E> {
    pub source_edge: E,
    pub edge: E,
}

/// Restricts or reorders the out-edges of a vertex before a depth-first
/// search examines them.
pub type OutEdgesFilter<'g, V, E> = Box<dyn Fn(&V, Vec<E>) -> Vec<E> + 'g>;

/// Out-edges of a vertex as they are handed to a search, either directly
/// from the graph or after passing an [`OutEdgesFilter`].
pub(crate) enum EdgeCursor<'g, G>
where
    G: ImplicitGraph + 'g,
{
    Graph(G::OutEdgesIter<'g>),
    Filtered(vec::IntoIter<G::Edge>),
}

impl<'g, G> EdgeCursor<'g, G>
where
    G: ImplicitGraph + 'g,
{
    /// Fetches the out-edges of the vertex, calling the filter once if there
    /// is one.
    pub(crate) fn new(
        graph: &'g G,
        vertex: &G::Vertex,
        filter: Option<&OutEdgesFilter<'g, G::Vertex, G::Edge>>,
    ) -> Result<Self, Error> {
        let edges = graph.out_edges(vertex)?;

        Ok(match filter {
            Some(filter) => {
                let edges = edges.map(OwnableRef::into_owned).collect();
                EdgeCursor::Filtered(filter(vertex, edges).into_iter())
            }
            None => EdgeCursor::Graph(edges),
        })
    }
}

impl<'g, G> Iterator for EdgeCursor<'g, G>
where
    G: ImplicitGraph + 'g,
{
    type Item = OwnableRef<'g, G::Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EdgeCursor::Graph(edges) => edges.next(),
            EdgeCursor::Filtered(edges) => edges.next().map(OwnableRef::Owned),
        }
    }
}
