use std::{cell::RefCell, rc::Rc};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    core::{Edge, VertexType},
    search::UndirectedEdgeArgs,
};

use super::{EdgeTreeEvents, Observer, ObserverGuard, UndirectedTreeEvents, VertexTreeEvents};

struct VertexPredecessors<V, E> {
    roots: FxHashSet<V>,
    predecessors: FxHashMap<V, E>,
}

impl<V, E> Default for VertexPredecessors<V, E> {
    fn default() -> Self {
        Self {
            roots: FxHashSet::default(),
            predecessors: FxHashMap::default(),
        }
    }
}

impl<V, E> VertexPredecessors<V, E> {
    fn clear(&mut self) {
        self.roots.clear();
        self.predecessors.clear();
    }
}

/// Records the tree edge through which each vertex was discovered.
///
/// Together, the recorded edges form the search forest. The path from the
/// root of its tree to any reached vertex can be read back with
/// [`try_get_path`](VertexPredecessorRecorder::try_get_path). For a
/// breadth-first search, it is a path with the fewest edges.
pub struct VertexPredecessorRecorder<V, E> {
    state: Rc<RefCell<VertexPredecessors<V, E>>>,
}

impl<V: VertexType, E: Edge<V>> VertexPredecessorRecorder<V, E> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(VertexPredecessors::default())),
        }
    }

    /// The tree edge that led to the vertex. `None` for roots and unreached
    /// vertices.
    pub fn predecessor(&self, vertex: &V) -> Option<E> {
        self.state.borrow().predecessors.get(vertex).cloned()
    }

    pub fn predecessors(&self) -> FxHashMap<V, E> {
        self.state.borrow().predecessors.clone()
    }

    /// Returns the tree edges from the root of the search tree to the vertex,
    /// an empty path for a root, or `None` if the vertex was not reached.
    pub fn try_get_path(&self, vertex: &V) -> Option<Vec<E>> {
        let state = self.state.borrow();

        let mut path = Vec::new();
        let mut current = vertex;
        while let Some(edge) = state.predecessors.get(current) {
            path.push(edge.clone());
            current = edge.source();
        }

        if path.is_empty() && !state.roots.contains(vertex) {
            return None;
        }

        path.reverse();
        Some(path)
    }
}

impl<V: VertexType, E: Edge<V>> Default for VertexPredecessorRecorder<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Clone for VertexPredecessorRecorder<V, E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A> Observer<A> for VertexPredecessorRecorder<A::Vertex, <A as VertexTreeEvents>::Edge>
where
    A: VertexTreeEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let started = algorithm.state_events().started.subscribe({
            let state = Rc::clone(&self.state);
            move |_| state.borrow_mut().clear()
        });

        let start_vertex = algorithm.start_vertex_event().subscribe({
            let state = Rc::clone(&self.state);
            move |vertex| {
                state.borrow_mut().roots.insert(vertex.clone());
            }
        });

        let tree_edge = algorithm.tree_edge_event().subscribe({
            let state = Rc::clone(&self.state);
            move |edge| {
                state
                    .borrow_mut()
                    .predecessors
                    .insert(edge.target().clone(), edge.clone());
            }
        });

        ObserverGuard::new(vec![started, start_vertex, tree_edge])
    }
}

/// [`VertexPredecessorRecorder`] for the searches over undirected graphs.
///
/// Remembers the direction in which each tree edge was traversed, so paths
/// can be read back regardless of how the edges are stored.
pub struct UndirectedVertexPredecessorRecorder<V, E> {
    state: Rc<RefCell<VertexPredecessors<V, UndirectedEdgeArgs<V, E>>>>,
}

impl<V: VertexType, E: Edge<V>> UndirectedVertexPredecessorRecorder<V, E> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(VertexPredecessors::default())),
        }
    }

    /// The tree edge that led to the vertex and the vertex it was reached
    /// from.
    pub fn predecessor(&self, vertex: &V) -> Option<(E, V)> {
        self.state
            .borrow()
            .predecessors
            .get(vertex)
            .map(|args| (args.edge.clone(), args.source.clone()))
    }

    /// Same as [`VertexPredecessorRecorder::try_get_path`].
    pub fn try_get_path(&self, vertex: &V) -> Option<Vec<E>> {
        let state = self.state.borrow();

        let mut path = Vec::new();
        let mut current = vertex;
        while let Some(args) = state.predecessors.get(current) {
            path.push(args.edge.clone());
            current = &args.source;
        }

        if path.is_empty() && !state.roots.contains(vertex) {
            return None;
        }

        path.reverse();
        Some(path)
    }

    /// Vertices on the path from the root of the search tree to the vertex,
    /// both ends included.
    pub fn try_get_vertex_path(&self, vertex: &V) -> Option<Vec<V>> {
        let state = self.state.borrow();

        let mut path = vec![vertex.clone()];
        let mut current = vertex;
        while let Some(args) = state.predecessors.get(current) {
            path.push(args.source.clone());
            current = &args.source;
        }

        if path.len() == 1 && !state.roots.contains(vertex) {
            return None;
        }

        path.reverse();
        Some(path)
    }
}

impl<V: VertexType, E: Edge<V>> Default for UndirectedVertexPredecessorRecorder<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Clone for UndirectedVertexPredecessorRecorder<V, E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A> Observer<A>
    for UndirectedVertexPredecessorRecorder<A::Vertex, <A as UndirectedTreeEvents>::Edge>
where
    A: UndirectedTreeEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let started = algorithm.state_events().started.subscribe({
            let state = Rc::clone(&self.state);
            move |_| state.borrow_mut().clear()
        });

        let start_vertex = algorithm.start_vertex_event().subscribe({
            let state = Rc::clone(&self.state);
            move |vertex| {
                state.borrow_mut().roots.insert(vertex.clone());
            }
        });

        let tree_edge = algorithm.tree_edge_event().subscribe({
            let state = Rc::clone(&self.state);
            move |args| {
                state
                    .borrow_mut()
                    .predecessors
                    .insert(args.target.clone(), args.clone());
            }
        });

        ObserverGuard::new(vec![started, start_vertex, tree_edge])
    }
}

struct EdgePredecessors<E> {
    predecessors: FxHashMap<E, E>,
    // Edges that were followed by another tree edge.
    continued: FxHashSet<E>,
    end_path_edges: Vec<E>,
}

impl<E> Default for EdgePredecessors<E> {
    fn default() -> Self {
        Self {
            predecessors: FxHashMap::default(),
            continued: FxHashSet::default(),
            end_path_edges: Vec::new(),
        }
    }
}

/// Records, for an edge-colored search, which edge each tree edge was entered
/// from.
///
/// Edges that were finished without entering any other edge end a path.
/// [`all_paths`](EdgePredecessorRecorder::all_paths) returns the paths from
/// the start edges to all of them.
pub struct EdgePredecessorRecorder<E> {
    state: Rc<RefCell<EdgePredecessors<E>>>,
}

impl<E> EdgePredecessorRecorder<E>
where
    E: Clone + Eq + std::hash::Hash,
{
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(EdgePredecessors::default())),
        }
    }

    pub fn predecessor(&self, edge: &E) -> Option<E> {
        self.state.borrow().predecessors.get(edge).cloned()
    }

    pub fn end_path_edges(&self) -> Vec<E> {
        self.state.borrow().end_path_edges.clone()
    }

    /// The tree edges from the start edge of the search tree to the edge.
    pub fn path(&self, edge: &E) -> Vec<E> {
        let state = self.state.borrow();

        let mut path = vec![edge.clone()];
        let mut current = edge;
        while let Some(predecessor) = state.predecessors.get(current) {
            path.push(predecessor.clone());
            current = predecessor;
        }

        path.reverse();
        path
    }

    pub fn all_paths(&self) -> Vec<Vec<E>> {
        self.end_path_edges()
            .iter()
            .map(|edge| self.path(edge))
            .collect()
    }
}

impl<E> Default for EdgePredecessorRecorder<E>
where
    E: Clone + Eq + std::hash::Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EdgePredecessorRecorder<E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<A> Observer<A> for EdgePredecessorRecorder<<A as EdgeTreeEvents>::Edge>
where
    A: EdgeTreeEvents,
{
    fn attach(&self, algorithm: &A) -> ObserverGuard {
        let started = algorithm.state_events().started.subscribe({
            let state = Rc::clone(&self.state);
            move |_| {
                let mut state = state.borrow_mut();
                state.predecessors.clear();
                state.continued.clear();
                state.end_path_edges.clear();
            }
        });

        let discover_tree_edge = algorithm.discover_tree_edge_event().subscribe({
            let state = Rc::clone(&self.state);
            move |args| {
                let mut state = state.borrow_mut();
                state
                    .predecessors
                    .insert(args.edge.clone(), args.source_edge.clone());
                state.continued.insert(args.source_edge.clone());
            }
        });

        let finish_edge = algorithm.finish_edge_event().subscribe({
            let state = Rc::clone(&self.state);
            move |edge| {
                let mut state = state.borrow_mut();
                if !state.continued.contains(edge) {
                    state.end_path_edges.push(edge.clone());
                }
            }
        });

        ObserverGuard::new(vec![started, discover_tree_edge, finish_edge])
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        algo::RootedAlgorithm,
        core::SEdge,
        search::{Bfs, Dfs, EdgeDfs, UndirectedDfs},
        storage::{AdjacencyGraph, UndirectedGraph},
    };

    use super::*;

    #[test]
    fn paths_in_forest() {
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(1, 2), SEdge::new(3, 4)],
            true,
        );
        let mut dfs = Dfs::new(&graph);
        let recorder = VertexPredecessorRecorder::new();
        let _guard = recorder.attach(&dfs);

        dfs.compute().unwrap();

        assert_eq!(
            recorder.try_get_path(&2),
            Some(vec![SEdge::new(0, 1), SEdge::new(1, 2)])
        );
        assert_eq!(recorder.try_get_path(&3), Some(Vec::new()));
        assert_eq!(recorder.try_get_path(&4), Some(vec![SEdge::new(3, 4)]));
        assert_eq!(recorder.predecessor(&0), None);
    }

    #[test]
    fn unreached_vertex_has_no_path() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(2, 1)], true);
        let mut bfs = Bfs::new(&graph);
        let recorder = VertexPredecessorRecorder::new();
        let _guard = recorder.attach(&bfs);

        bfs.compute_from(0).unwrap();

        assert_eq!(recorder.try_get_path(&2), None);
        assert_eq!(recorder.try_get_path(&7), None);
    }

    #[test]
    fn cleared_on_rerun() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(2, 1)], true);
        let mut bfs = Bfs::new(&graph);
        let recorder = VertexPredecessorRecorder::new();
        let _guard = recorder.attach(&bfs);

        bfs.compute_from(0).unwrap();
        assert_eq!(recorder.predecessor(&1), Some(SEdge::new(0, 1)));

        bfs.compute_from(2).unwrap();
        assert_eq!(recorder.predecessor(&1), Some(SEdge::new(2, 1)));
        assert_eq!(recorder.try_get_path(&0), None);
    }

    #[test]
    fn detached_recorder_stays_empty() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1)], true);
        let mut dfs = Dfs::new(&graph);
        let recorder = VertexPredecessorRecorder::new();
        recorder.attach(&dfs).detach();

        dfs.compute_from(0).unwrap();

        assert!(recorder.predecessors().is_empty());
    }

    #[test]
    fn undirected_paths() {
        let graph = UndirectedGraph::from_edges([SEdge::new(1, 0), SEdge::new(2, 1)], true);
        let mut dfs = UndirectedDfs::new(&graph);
        let recorder = UndirectedVertexPredecessorRecorder::new();
        let _guard = recorder.attach(&dfs);

        dfs.compute_from(0).unwrap();

        assert_eq!(
            recorder.try_get_path(&2),
            Some(vec![SEdge::new(1, 0), SEdge::new(2, 1)])
        );
        assert_eq!(recorder.try_get_vertex_path(&2), Some(vec![0, 1, 2]));
        assert_eq!(recorder.predecessor(&1), Some((SEdge::new(1, 0), 0)));
    }

    #[test]
    fn edge_paths() {
        //   0 → 1 → 2
        //       ↓
        //       3
        let graph = AdjacencyGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(1, 2), SEdge::new(1, 3)],
            true,
        );
        let mut dfs = EdgeDfs::new(&graph);
        let recorder = EdgePredecessorRecorder::new();
        let _guard = recorder.attach(&dfs);

        dfs.compute_from(0).unwrap();

        assert_eq!(
            recorder.all_paths(),
            vec![
                vec![SEdge::new(0, 1), SEdge::new(1, 2)],
                vec![SEdge::new(0, 1), SEdge::new(1, 3)],
            ]
        );
        assert_eq!(recorder.predecessor(&SEdge::new(1, 3)), Some(SEdge::new(0, 1)));
    }
}
