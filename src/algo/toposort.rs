//! Topological order and acyclicity, derived from depth-first search events.

use std::{cell::RefCell, rc::Rc};

use crate::{
    core::{Error, IncidenceGraph, VertexSet},
    observer::{CycleDetector, Observer},
    search::Dfs,
};

use super::base::RootedAlgorithm;

/// Orders the vertices so that every edge goes from an earlier vertex to a
/// later one.
///
/// The order is the reverse of the order in which a depth-first search over
/// all vertices finishes them. The search is cancelled at the first back edge
/// and [`Error::NonAcyclicGraph`] is returned.
pub fn topological_sort<G>(graph: &G) -> Result<Vec<G::Vertex>, Error>
where
    G: IncidenceGraph + VertexSet,
{
    let mut dfs = Dfs::new(graph);

    let finished = Rc::new(RefCell::new(Vec::with_capacity(graph.vertex_count())));
    let _finish = dfs.events().finish_vertex.subscribe({
        let finished = Rc::clone(&finished);
        move |vertex| finished.borrow_mut().push(vertex.clone())
    });

    let detector = CycleDetector::new().stop_on_first();
    let _cycles = detector.attach(&dfs);

    match dfs.compute() {
        Ok(()) => {}
        Err(Error::Aborted) if detector.has_cycle() => return Err(Error::NonAcyclicGraph),
        Err(error) => return Err(error),
    }

    let mut order = finished.take();
    order.reverse();
    Ok(order)
}

/// Returns `Ok(true)` if the graph has no directed cycle. A self-edge is a
/// cycle.
///
/// Fails if the search cannot walk the whole graph, for example when the
/// out-edges of a vertex from the vertex set are not available.
pub fn is_acyclic<G>(graph: &G) -> Result<bool, Error>
where
    G: IncidenceGraph + VertexSet,
{
    let mut dfs = Dfs::new(graph);
    let detector = CycleDetector::new().stop_on_first();
    let _guard = detector.attach(&dfs);

    match dfs.compute() {
        Ok(()) => Ok(!detector.has_cycle()),
        Err(Error::Aborted) if detector.has_cycle() => Ok(false),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use crate::{
        core::{Edge, EdgeSet, SEdge},
        infra::proptest::graph_directed,
        storage::{AdjacencyGraph, DelegateIncidenceGraph},
    };

    use super::*;

    fn assert_valid<G>(graph: &G)
    where
        G: IncidenceGraph + VertexSet + EdgeSet,
    {
        match (topological_sort(graph), is_acyclic(graph).unwrap()) {
            (Ok(sorted), true) => {
                assert_eq!(sorted.len(), graph.vertex_count());

                for edge in graph.edges() {
                    let position = |vertex: &G::Vertex| {
                        sorted
                            .iter()
                            .position(|v| v == vertex)
                            .unwrap_or_else(|| panic!("algorithm omitted vertex {vertex:?}"))
                    };

                    assert!(
                        position(edge.source()) < position(edge.target()),
                        "invalid topological order for {:?} -> {:?}",
                        edge.source(),
                        edge.target()
                    );
                }
            }
            (Ok(_), false) => panic!("algorithm did not detect cycle"),
            (Err(error), true) => panic!("algorithm incorrectly returned error: {error:?}"),
            (Err(error), false) => assert_eq!(error, Error::NonAcyclicGraph),
        }
    }

    fn create_basic_graph() -> AdjacencyGraph<i32, SEdge<i32>> {
        AdjacencyGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(1, 2),
                SEdge::new(2, 3),
                SEdge::new(0, 2),
                SEdge::new(0, 3),
            ],
            true,
        )
    }

    fn create_cyclic_graph() -> AdjacencyGraph<i32, SEdge<i32>> {
        AdjacencyGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(1, 2),
                SEdge::new(2, 3),
                SEdge::new(3, 1),
            ],
            true,
        )
    }

    fn create_disconnected_graph() -> AdjacencyGraph<i32, SEdge<i32>> {
        AdjacencyGraph::from_edges(
            [
                SEdge::new(3, 2),
                SEdge::new(2, 1),
                SEdge::new(5, 4),
                SEdge::new(6, 4),
            ],
            true,
        )
    }

    #[test]
    fn basic() {
        let graph = create_basic_graph();
        assert_valid(&graph);
        assert_eq!(topological_sort(&graph).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn cycle() {
        let graph = create_cyclic_graph();
        assert_valid(&graph);
        assert_matches!(topological_sort(&graph), Err(Error::NonAcyclicGraph));
        assert_eq!(is_acyclic(&graph), Ok(false));
    }

    #[test]
    fn self_edge() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(1, 1)], true);
        assert_matches!(topological_sort(&graph), Err(Error::NonAcyclicGraph));
    }

    #[test]
    fn disconnected() {
        let graph = create_disconnected_graph();
        assert_valid(&graph);
        assert_eq!(is_acyclic(&graph), Ok(true));
    }

    #[test]
    fn empty() {
        let graph = AdjacencyGraph::<i32, SEdge<i32>>::default();
        assert_eq!(topological_sort(&graph).unwrap(), Vec::<i32>::new());
        assert_eq!(is_acyclic(&graph), Ok(true));
    }

    #[test]
    fn missing_out_edges() {
        // 1 <-> 2 is a cycle, but the out-edges of 0 are not available.
        let graph = DelegateIncidenceGraph::new(
            [0, 1, 2],
            |&n: &u32| match n {
                1 => Some(vec![SEdge::new(1, 2)]),
                2 => Some(vec![SEdge::new(2, 1)]),
                _ => None,
            },
            false,
        );

        assert_matches!(topological_sort(&graph), Err(Error::VertexNotFound));
        assert_matches!(is_acyclic(&graph), Err(Error::VertexNotFound));
    }

    proptest! {
        #[test]
        #[ignore = "run property-based tests with `cargo test proptest_ -- --ignored`"]
        fn proptest_toposort_acyclic(graph in graph_directed().acyclic()) {
            assert_valid(&graph);
            prop_assert_eq!(is_acyclic(&graph), Ok(true));
        }

        #[test]
        #[ignore = "run property-based tests with `cargo test proptest_ -- --ignored`"]
        fn proptest_toposort_any(graph in graph_directed().allow_loops()) {
            assert_valid(&graph);
        }
    }
}
