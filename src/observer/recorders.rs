use std::{cell::RefCell, rc::Rc};

use crate::core::VertexType;

use super::{Observer, ObserverGuard, TimeStampEvents, VertexTreeEvents};

/// Records vertices in the order they are discovered.
pub struct VertexRecorder<V> {
    vertices: Rc<RefCell<Vec<V>>>,
}

impl<V: VertexType> VertexRecorder<V> {
    pub fn new() -> Self {
        Self {
            vertices: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn vertices(&self) -> Vec<V> {
        self.vertices.borrow().clone()
    }
}

impl<V: VertexType> Default for VertexRecorder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for VertexRecorder<V> {
    fn clone(&self) -> Self {
        Self {
            vertices: Rc::clone(&self.vertices),
        }
    }
}

impl<A> Observer<A> for VertexRecorder<A::Vertex>
where
    A: TimeStampEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let started = algorithm.state_events().started.subscribe({
            let vertices = Rc::clone(&self.vertices);
            move |_| vertices.borrow_mut().clear()
        });

        let discover = algorithm.discover_vertex_event().subscribe({
            let vertices = Rc::clone(&self.vertices);
            move |vertex| vertices.borrow_mut().push(vertex.clone())
        });

        ObserverGuard::new(vec![started, discover])
    }
}

/// Records tree edges in the order they are traversed.
pub struct EdgeRecorder<E> {
    edges: Rc<RefCell<Vec<E>>>,
}

impl<E: Clone> EdgeRecorder<E> {
    pub fn new() -> Self {
        Self {
            edges: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn edges(&self) -> Vec<E> {
        self.edges.borrow().clone()
    }
}

impl<E: Clone> Default for EdgeRecorder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EdgeRecorder<E> {
    fn clone(&self) -> Self {
        Self {
            edges: Rc::clone(&self.edges),
        }
    }
}

impl<A> Observer<A> for EdgeRecorder<<A as VertexTreeEvents>::Edge>
where
    A: VertexTreeEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let started = algorithm.state_events().started.subscribe({
            let edges = Rc::clone(&self.edges);
            move |_| edges.borrow_mut().clear()
        });

        let tree_edge = algorithm.tree_edge_event().subscribe({
            let edges = Rc::clone(&self.edges);
            move |edge| edges.borrow_mut().push(edge.clone())
        });

        ObserverGuard::new(vec![started, tree_edge])
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        algo::RootedAlgorithm,
        core::SEdge,
        search::{Bfs, Dfs},
        storage::AdjacencyGraph,
    };

    use super::*;

    fn diamond() -> AdjacencyGraph<i32, SEdge<i32>> {
        AdjacencyGraph::from_edges(
            [
                SEdge::new(1, 2),
                SEdge::new(1, 3),
                SEdge::new(2, 4),
                SEdge::new(3, 4),
            ],
            true,
        )
    }

    #[test]
    fn discovery_order() {
        let graph = diamond();

        let mut bfs = Bfs::new(&graph);
        let recorder = VertexRecorder::new();
        let _guard = recorder.attach(&bfs);
        bfs.compute_from(1).unwrap();
        assert_eq!(recorder.vertices(), vec![1, 2, 3, 4]);

        let mut dfs = Dfs::new(&graph);
        let recorder = VertexRecorder::new();
        let _guard = recorder.attach(&dfs);
        dfs.compute_from(1).unwrap();
        assert_eq!(recorder.vertices(), vec![1, 2, 4, 3]);
    }

    #[test]
    fn tree_edges() {
        let graph = diamond();
        let mut dfs = Dfs::new(&graph);
        let recorder = EdgeRecorder::new();
        let _guard = recorder.attach(&dfs);

        dfs.compute_from(1).unwrap();

        assert_eq!(
            recorder.edges(),
            vec![SEdge::new(1, 2), SEdge::new(2, 4), SEdge::new(1, 3)]
        );
    }
}
