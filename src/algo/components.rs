//! Connected components of undirected graphs, derived from depth-first search
//! events.

use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{
    core::{Error, ImplicitUndirectedGraph, VertexSet, VertexType},
    search::UndirectedDfs,
};

use super::base::RootedAlgorithm;

/// Assignment of vertices to connected components.
///
/// Components are numbered from zero in the order in which the search
/// reaches them, which follows the enumeration order of the graph.
#[derive(Debug, Clone)]
pub struct ConnectedComponents<V> {
    components: FxHashMap<V, usize>,
    count: usize,
}

impl<V: VertexType> PartialEq for ConnectedComponents<V> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.components == other.components
    }
}

impl<V: VertexType> Eq for ConnectedComponents<V> {}

impl<V: VertexType> ConnectedComponents<V> {
    /// Number of components.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Index of the component containing the vertex.
    pub fn component(&self, vertex: &V) -> Option<usize> {
        self.components.get(vertex).copied()
    }

    pub fn same_component(&self, a: &V, b: &V) -> bool {
        match (self.component(a), self.component(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Vertices grouped by component, in component index order.
    pub fn groups(&self) -> Vec<Vec<V>> {
        let mut groups = vec![Vec::new(); self.count];
        for (vertex, &component) in &self.components {
            groups[component].push(vertex.clone());
        }
        groups
    }
}

/// Finds the connected components of an undirected graph.
///
/// Every search tree of a depth-first search over all vertices spans exactly
/// one component. A new component starts with every start vertex.
pub fn connected_components<G>(graph: &G) -> Result<ConnectedComponents<G::Vertex>, Error>
where
    G: ImplicitUndirectedGraph + VertexSet,
{
    let mut dfs = UndirectedDfs::new(graph);

    let components = Rc::new(RefCell::new(FxHashMap::default()));
    let count = Rc::new(RefCell::new(0usize));

    let _start = dfs.events().start_vertex.subscribe({
        let count = Rc::clone(&count);
        move |_| *count.borrow_mut() += 1
    });

    let _discover = dfs.events().discover_vertex.subscribe({
        let components = Rc::clone(&components);
        let count = Rc::clone(&count);
        move |vertex| {
            let current = *count.borrow() - 1;
            components.borrow_mut().insert(vertex.clone(), current);
        }
    });

    dfs.compute()?;

    let components = components.take();
    let count = *count.borrow();
    Ok(ConnectedComponents { components, count })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{
        core::{Edge, EdgeSet, SEdge},
        infra::proptest::graph_undirected,
        storage::UndirectedGraph,
    };

    use super::*;

    #[test]
    fn basic() {
        //   0 - 1   3 - 4   6
        //    \ /     \
        //     2       5
        let mut graph = UndirectedGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(1, 2),
                SEdge::new(2, 0),
                SEdge::new(3, 4),
                SEdge::new(5, 3),
            ],
            true,
        );
        graph.add_vertex(6);

        let components = connected_components(&graph).unwrap();

        assert_eq!(components.count(), 3);
        assert_eq!(components.component(&0), Some(0));
        assert_eq!(components.component(&5), Some(1));
        assert_eq!(components.component(&6), Some(2));
        assert!(components.same_component(&1, &2));
        assert!(!components.same_component(&2, &3));
        assert_eq!(components.component(&7), None);

        let mut groups = components.groups();
        groups.iter_mut().for_each(|group| group.sort_unstable());
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
    }

    #[test]
    fn equality() {
        let graph = UndirectedGraph::from_edges([SEdge::new(0, 1), SEdge::new(2, 3)], true);
        let other = UndirectedGraph::from_edges([SEdge::new(0, 1), SEdge::new(1, 2)], true);

        let components = connected_components(&graph).unwrap();
        assert_eq!(components, connected_components(&graph).unwrap());
        assert_ne!(components, connected_components(&other).unwrap());
    }

    #[test]
    fn empty() {
        let graph = UndirectedGraph::<i32, SEdge<i32>>::new(true);
        let components = connected_components(&graph).unwrap();

        assert_eq!(components.count(), 0);
        assert!(components.groups().is_empty());
    }

    proptest! {
        #[test]
        #[ignore = "run property-based tests with `cargo test proptest_ -- --ignored`"]
        fn proptest_edges_within_components(graph in graph_undirected().allow_loops()) {
            let components = connected_components(&graph).unwrap();

            for edge in graph.edges() {
                prop_assert!(components.same_component(edge.source(), edge.target()));
            }

            let total = components.groups().iter().map(Vec::len).sum::<usize>();
            prop_assert_eq!(total, graph.vertex_count());
        }
    }
}
