//! Reusable listeners that turn search events into results.
//!
//! An observer subscribes to the events of an algorithm when
//! [attached](Observer::attach) and stays subscribed as long as the returned
//! [`ObserverGuard`] is alive. The observer itself is a cheap handle to shared
//! state, so the results can be read after the computation while the
//! algorithm still borrows the graph.
//!
//! Algorithms advertise which events they have through the capability traits
//! in this module. Each observer requires the least capable trait it needs.
//! Recorded results are cleared whenever the observed algorithm starts a new
//! run.
//!
//! ```
//! use walkgraph::{
//!     algo::RootedAlgorithm,
//!     core::SEdge,
//!     observer::{Observer, VertexPredecessorRecorder},
//!     search::Dfs,
//!     storage::AdjacencyGraph,
//! };
//!
//! let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(1, 2)], true);
//! let mut dfs = Dfs::new(&graph);
//!
//! let recorder = VertexPredecessorRecorder::new();
//! let guard = recorder.attach(&dfs);
//! dfs.compute_from(0).unwrap();
//! guard.detach();
//!
//! assert_eq!(
//!     recorder.try_get_path(&2),
//!     Some(vec![SEdge::new(0, 1), SEdge::new(1, 2)])
//! );
//! ```

mod cycle;
mod predecessors;
mod recorders;
mod time_stamps;
#[cfg(feature = "tracing")]
mod logging;

use crate::{
    algo::base::RootedAlgorithm,
    core::Edge,
    event::{Event, Subscription},
    search::{EdgeEdgeArgs, UndirectedEdgeArgs},
};

pub use cycle::CycleDetector;
pub use predecessors::{
    EdgePredecessorRecorder, UndirectedVertexPredecessorRecorder, VertexPredecessorRecorder,
};
pub use recorders::{EdgeRecorder, VertexRecorder};
pub use time_stamps::VertexTimeStamper;
#[cfg(feature = "tracing")]
pub use logging::TracingObserver;

/// Something that can listen to the events of an algorithm of type `A`.
pub trait Observer<A: ?Sized> {
    /// Subscribes to the events of the algorithm. The subscriptions end when
    /// the returned guard is dropped.
    fn attach(&self, algorithm: &A) -> ObserverGuard;
}

/// Keeps an observer attached.
#[must_use = "dropping the guard detaches the observer immediately"]
pub struct ObserverGuard {
    subscriptions: Vec<Subscription>,
}

impl ObserverGuard {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self { subscriptions }
    }

    /// Detaches the observer now. Same as dropping the guard.
    pub fn detach(self) {}

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl std::fmt::Debug for ObserverGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverGuard")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// An algorithm that discovers and finishes vertices.
pub trait TimeStampEvents: RootedAlgorithm {
    fn discover_vertex_event(&self) -> &Event<Self::Vertex>;

    fn finish_vertex_event(&self) -> &Event<Self::Vertex>;
}

/// An algorithm that grows a forest of search trees along directed edges.
///
/// Every tree edge points from the parent to the child.
pub trait VertexTreeEvents: TimeStampEvents {
    type Edge: Edge<Self::Vertex>;

    /// Raised for the root of every search tree.
    fn start_vertex_event(&self) -> &Event<Self::Vertex>;

    fn tree_edge_event(&self) -> &Event<Self::Edge>;
}

/// A directed depth-first search that reports back edges.
pub trait BackEdgeEvents: VertexTreeEvents {
    fn back_edge_event(&self) -> &Event<Self::Edge>;
}

/// An algorithm that grows a forest of search trees along undirected edges.
pub trait UndirectedTreeEvents: TimeStampEvents {
    type Edge: Edge<Self::Vertex>;

    fn start_vertex_event(&self) -> &Event<Self::Vertex>;

    fn tree_edge_event(&self) -> &Event<UndirectedEdgeArgs<Self::Vertex, Self::Edge>>;
}

/// An edge-colored search.
pub trait EdgeTreeEvents: RootedAlgorithm {
    type Edge: Edge<Self::Vertex>;

    /// Raised for the first edge of every search tree.
    fn start_edge_event(&self) -> &Event<Self::Edge>;

    /// Raised when an edge is entered.
    fn tree_edge_event(&self) -> &Event<Self::Edge>;

    fn discover_tree_edge_event(&self) -> &Event<EdgeEdgeArgs<Self::Edge>>;

    fn finish_edge_event(&self) -> &Event<Self::Edge>;
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use crate::{core::SEdge, search::Dfs, storage::AdjacencyGraph};

    use super::*;

    #[test]
    fn guards_detach_when_handler_panics() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(1, 2)], true);
        let mut dfs = Dfs::new(&graph);

        let recorder = VertexPredecessorRecorder::new();
        let stamper = VertexTimeStamper::new();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _recorder = recorder.attach(&dfs);
            let _stamper = stamper.attach(&dfs);
            let _boom = dfs
                .events()
                .finish_vertex
                .subscribe(|vertex| panic!("handler failed at {vertex}"));

            assert!(dfs.events().finish_vertex.has_handlers());
            dfs.compute_from(0)
        }));

        assert!(result.is_err());

        let events = dfs.events();
        assert_eq!(dfs.state_events().started.handler_count(), 0);
        assert_eq!(events.start_vertex.handler_count(), 0);
        assert_eq!(events.discover_vertex.handler_count(), 0);
        assert_eq!(events.tree_edge.handler_count(), 0);
        assert_eq!(events.finish_vertex.handler_count(), 0);

        // The partial results stay readable.
        assert_eq!(recorder.try_get_path(&2), Some(vec![SEdge::new(0, 1), SEdge::new(1, 2)]));
    }

    #[test]
    fn guard_len() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1)], true);
        let dfs = Dfs::new(&graph);

        let guard = VertexTimeStamper::new().attach(&dfs);
        assert_eq!(guard.len(), 3);
        assert!(!guard.is_empty());
        assert_eq!(dfs.events().discover_vertex.handler_count(), 1);

        guard.detach();
        assert!(!dfs.events().discover_vertex.has_handlers());
    }
}
