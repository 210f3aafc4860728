use std::{cell::RefCell, rc::Rc};

use super::{BackEdgeEvents, Observer, ObserverGuard};

struct Cycles<E> {
    back_edges: Vec<E>,
}

/// Detects directed cycles by watching for back edges.
///
/// A depth-first search finds a back edge if and only if the visited part of
/// the graph contains a cycle. With [`stop_on_first`](CycleDetector::stop_on_first),
/// the detector cancels the search at the first back edge and the search
/// ends with [`Error::Aborted`](crate::core::Error::Aborted).
pub struct CycleDetector<E> {
    state: Rc<RefCell<Cycles<E>>>,
    stop_on_first: bool,
}

impl<E: Clone> CycleDetector<E> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(Cycles {
                back_edges: Vec::new(),
            })),
            stop_on_first: false,
        }
    }

    /// Cancels the observed search at the first back edge.
    pub fn stop_on_first(self) -> Self {
        Self {
            stop_on_first: true,
            ..self
        }
    }

    pub fn has_cycle(&self) -> bool {
        !self.state.borrow().back_edges.is_empty()
    }

    /// Back edges found by the last run. Each closes a cycle with the tree
    /// edges on the search stack.
    pub fn back_edges(&self) -> Vec<E> {
        self.state.borrow().back_edges.clone()
    }
}

impl<E: Clone> Default for CycleDetector<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for CycleDetector<E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            stop_on_first: self.stop_on_first,
        }
    }
}

impl<A> Observer<A> for CycleDetector<A::Edge>
where
    A: BackEdgeEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let started = algorithm.state_events().started.subscribe({
            let state = Rc::clone(&self.state);
            move |_| state.borrow_mut().back_edges.clear()
        });

        let cancel = self.stop_on_first.then(|| algorithm.cancel_manager().clone());
        let back_edge = algorithm.back_edge_event().subscribe({
            let state = Rc::clone(&self.state);
            move |edge| {
                state.borrow_mut().back_edges.push(edge.clone());

                if let Some(cancel) = &cancel {
                    cancel.cancel();
                }
            }
        });

        ObserverGuard::new(vec![started, back_edge])
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::{
        algo::RootedAlgorithm,
        core::{Error, SEdge},
        search::Dfs,
        storage::AdjacencyGraph,
    };

    use super::*;

    #[test]
    fn acyclic() {
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(0, 2), SEdge::new(1, 2)],
            true,
        );
        let mut dfs = Dfs::new(&graph);
        let detector = CycleDetector::new();
        let _guard = detector.attach(&dfs);

        dfs.compute().unwrap();

        assert!(!detector.has_cycle());
    }

    #[test]
    fn cyclic() {
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(1, 2), SEdge::new(2, 1)],
            true,
        );
        let mut dfs = Dfs::new(&graph);
        let detector = CycleDetector::new();
        let _guard = detector.attach(&dfs);

        dfs.compute().unwrap();

        assert!(detector.has_cycle());
        assert_eq!(detector.back_edges(), vec![SEdge::new(2, 1)]);
    }

    #[test]
    fn stops_on_first() {
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 0), SEdge::new(1, 1)],
            true,
        );
        let mut dfs = Dfs::new(&graph);
        let detector = CycleDetector::new().stop_on_first();
        let _guard = detector.attach(&dfs);

        assert_matches!(dfs.compute(), Err(Error::Aborted));
        assert_eq!(detector.back_edges(), vec![SEdge::new(0, 0)]);
    }
}
