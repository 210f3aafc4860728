use tracing::{debug, trace};

use super::{Observer, ObserverGuard, TimeStampEvents};

/// Emits [`tracing`] events for the lifecycle and the vertex events of an
/// algorithm.
///
/// State changes are logged at the debug level, discovered and finished
/// vertices at the trace level.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    name: &'static str,
}

impl TracingObserver {
    /// The name is attached to every emitted event as the `algorithm` field.
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("search")
    }
}

impl<A> Observer<A> for TracingObserver
where
    A: TimeStampEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let name = self.name;

        let state_changed = algorithm
            .state_events()
            .state_changed
            .subscribe(move |state| debug!(algorithm = name, ?state, "state changed"));

        let discover = algorithm
            .discover_vertex_event()
            .subscribe(move |vertex| trace!(algorithm = name, ?vertex, "discover vertex"));

        let finish = algorithm
            .finish_vertex_event()
            .subscribe(move |vertex| trace!(algorithm = name, ?vertex, "finish vertex"));

        ObserverGuard::new(vec![state_changed, discover, finish])
    }
}

#[cfg(all(test, feature = "tracing"))]
mod tests {
    use crate::{algo::RootedAlgorithm, core::SEdge, search::Dfs, storage::AdjacencyGraph};

    use super::*;

    #[test]
    fn attached_to_dfs() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(1, 2)], true);
        let mut dfs = Dfs::new(&graph);

        let guard = TracingObserver::new("dfs").attach(&dfs);
        assert_eq!(guard.len(), 3);
        assert!(dfs.state_events().state_changed.has_handlers());

        assert_eq!(dfs.compute_from(0), Ok(()));

        guard.detach();
        assert!(!dfs.events().discover_vertex.has_handlers());
        assert!(!dfs.events().finish_vertex.has_handlers());
    }
}
