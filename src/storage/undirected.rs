//! Mutable undirected graph.
//!
//! Every edge is registered under both of its endpoints, a self-edge only
//! once. Enumeration of all edges yields each edge once, from the list of its
//! source.
//!
//! # Examples
//!
//! ```
//! use walkgraph::{
//!     core::{ImplicitUndirectedGraph, SEdge},
//!     storage::UndirectedGraph,
//! };
//!
//! let graph = UndirectedGraph::from_edges([SEdge::new(1, 2), SEdge::new(3, 3)], true);
//!
//! assert!(graph.contains_edge_between(&2, &1));
//! assert_eq!(graph.adjacent_degree(&3), Ok(2));
//! ```

use std::fmt;

use crate::core::{
    Edge, EdgeEquality, EdgeSet, Error, GraphBase, ImplicitUndirectedGraph, ImplicitVertexSet,
    VertexSet, VertexType,
};

use super::shared::{remove_first, EdgeListIter, EdgesIter, GraphEvents, VertexEdgeMap};

pub struct UndirectedGraph<V, E> {
    vertices: VertexEdgeMap<V, E>,
    edge_count: usize,
    allow_parallel_edges: bool,
    edge_equality: EdgeEquality,
    events: GraphEvents<V, E>,
}

impl<V, E> UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    /// Creates an empty graph with the edge equality policy picked by
    /// [`EdgeEquality::for_edge`].
    pub fn new(allow_parallel_edges: bool) -> Self {
        Self::with_edge_equality(EdgeEquality::for_edge::<V, E>(), allow_parallel_edges)
    }

    pub fn with_edge_equality(edge_equality: EdgeEquality, allow_parallel_edges: bool) -> Self {
        Self {
            vertices: VertexEdgeMap::default(),
            edge_count: 0,
            allow_parallel_edges,
            edge_equality,
            events: GraphEvents::default(),
        }
    }

    pub fn from_edges<I>(edges: I, allow_parallel_edges: bool) -> Self
    where
        I: IntoIterator<Item = E>,
    {
        let mut graph = Self::new(allow_parallel_edges);
        for edge in edges {
            graph.add_verts_and_edge(edge);
        }
        graph
    }

    /// Builds the graph from a vertex collection and a factory producing the
    /// edges of each vertex.
    ///
    /// Every produced edge must be incident to the vertex it was produced for
    /// and lead to a vertex of the collection, otherwise the construction
    /// fails with [`Error::VertexNotFound`]. An edge produced for both of its
    /// endpoints is added twice.
    pub fn from_vertices_and_edges<I, F, N>(
        vertices: I,
        mut adjacent_edges: F,
        allow_parallel_edges: bool,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> N,
        N: IntoIterator<Item = E>,
    {
        let mut graph = Self::new(allow_parallel_edges);
        graph.add_vertex_range(vertices);

        let keys = graph.vertices.keys().cloned().collect::<Vec<_>>();
        for vertex in keys {
            for edge in adjacent_edges(&vertex) {
                if !edge.is_adjacent(&vertex) {
                    return Err(Error::VertexNotFound);
                }
                graph.add_edge(edge)?;
            }
        }

        Ok(graph)
    }

    pub fn events(&self) -> &GraphEvents<V, E> {
        &self.events
    }

    /// Returns the endpoint of the edge opposite to the vertex.
    pub fn adjacent_vertex<'a>(&self, edge: &'a E, vertex: &V) -> &'a V {
        edge.other_vertex(vertex)
    }

    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.vertices.contains_key(&vertex) {
            return false;
        }

        self.vertices.insert(vertex.clone(), Vec::new());
        self.events.vertex_added.raise(&vertex);
        true
    }

    pub fn add_vertex_range<I>(&mut self, vertices: I) -> usize
    where
        I: IntoIterator<Item = V>,
    {
        vertices
            .into_iter()
            .filter(|vertex| self.add_vertex(vertex.clone()))
            .count()
    }

    pub fn remove_vertex(&mut self, vertex: &V) -> bool {
        let Some(edges) = self.vertices.shift_remove(vertex) else {
            return false;
        };

        for edge in edges.iter() {
            if !edge.is_self_edge() {
                if let Some(other) = self.vertices.get_mut(edge.other_vertex(vertex)) {
                    remove_first(other, edge);
                }
            }
            self.events.edge_removed.raise(edge);
        }

        self.edge_count -= edges.len();
        self.events.vertex_removed.raise(vertex);
        true
    }

    pub fn remove_vertex_if<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&V) -> bool,
    {
        let doomed = self
            .vertices
            .keys()
            .filter(|vertex| predicate(vertex))
            .cloned()
            .collect::<Vec<_>>();

        doomed
            .iter()
            .filter(|vertex| self.remove_vertex(vertex))
            .count()
    }

    /// Adds the edge.
    ///
    /// Fails if any of the endpoints is not in the graph. Returns `Ok(false)`
    /// if the graph does not allow parallel edges and an edge between the
    /// same pair, in any orientation, is already present.
    pub fn add_edge(&mut self, edge: E) -> Result<bool, Error> {
        if !self.vertices.contains_key(edge.source()) || !self.vertices.contains_key(edge.target())
        {
            return Err(Error::VertexNotFound);
        }

        if !self.allow_parallel_edges
            && ImplicitUndirectedGraph::contains_edge_between(&*self, edge.source(), edge.target())
        {
            return Ok(false);
        }

        if let Some(edges) = self.vertices.get_mut(edge.source()) {
            edges.push(edge.clone());
        }
        if !edge.is_self_edge() {
            if let Some(edges) = self.vertices.get_mut(edge.target()) {
                edges.push(edge.clone());
            }
        }

        self.edge_count += 1;
        self.events.edge_added.raise(&edge);
        Ok(true)
    }

    pub fn add_verts_and_edge(&mut self, edge: E) -> bool {
        self.add_vertex(edge.source().clone());
        self.add_vertex(edge.target().clone());
        self.add_edge(edge).unwrap_or(false)
    }

    pub fn add_edge_range<I>(&mut self, edges: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = E>,
    {
        let mut added = 0;
        for edge in edges {
            if self.add_edge(edge)? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn remove_edge(&mut self, edge: &E) -> bool {
        let Some(removed) = self
            .vertices
            .get_mut(edge.source())
            .and_then(|edges| remove_first(edges, edge))
        else {
            return false;
        };

        if !edge.is_self_edge() {
            if let Some(edges) = self.vertices.get_mut(edge.target()) {
                remove_first(edges, edge);
            }
        }

        self.edge_count -= 1;
        self.events.edge_removed.raise(&removed);
        true
    }

    pub fn remove_edge_if<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&E) -> bool,
    {
        let doomed = EdgesIter::new(&self.vertices, true)
            .filter(|edge| predicate(&**edge))
            .map(|edge| edge.into_owned())
            .collect::<Vec<_>>();

        self.remove_all(doomed)
    }

    /// Removes the edges incident to the vertex that match the predicate.
    pub fn remove_adjacent_edge_if<P>(&mut self, vertex: &V, mut predicate: P) -> Result<usize, Error>
    where
        P: FnMut(&E) -> bool,
    {
        let doomed = self
            .vertices
            .get(vertex)
            .ok_or(Error::VertexNotFound)?
            .iter()
            .filter(|edge| predicate(edge))
            .cloned()
            .collect::<Vec<_>>();

        Ok(self.remove_all(doomed))
    }

    pub fn clear_adjacent_edges(&mut self, vertex: &V) -> Result<usize, Error> {
        self.remove_adjacent_edge_if(vertex, |_| true)
    }

    pub fn trim_edge_excess(&mut self) {
        for edges in self.vertices.values_mut() {
            edges.shrink_to_fit();
        }
    }

    pub fn clear(&mut self) {
        let vertices = std::mem::take(&mut self.vertices);
        self.edge_count = 0;

        for (vertex, edges) in vertices.iter() {
            for edge in edges.iter().filter(|edge| edge.source() == vertex) {
                self.events.edge_removed.raise(edge);
            }
            self.events.vertex_removed.raise(vertex);
        }
    }

    fn remove_all(&mut self, edges: Vec<E>) -> usize {
        edges.iter().filter(|edge| self.remove_edge(edge)).count()
    }
}

impl<V, E> Default for UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn default() -> Self {
        Self::new(true)
    }
}

impl<V, E> Clone for UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            edge_count: self.edge_count,
            allow_parallel_edges: self.allow_parallel_edges,
            edge_equality: self.edge_equality,
            events: GraphEvents::default(),
        }
    }
}

impl<V: fmt::Debug, E: fmt::Debug> fmt::Debug for UndirectedGraph<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndirectedGraph")
            .field("vertices", &self.vertices)
            .field("edge_count", &self.edge_count)
            .field("allow_parallel_edges", &self.allow_parallel_edges)
            .field("edge_equality", &self.edge_equality)
            .finish()
    }
}

impl<V, E> GraphBase for UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type Vertex = V;
    type Edge = E;

    fn is_directed(&self) -> bool {
        false
    }

    fn allows_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }
}

impl<V, E> ImplicitVertexSet for UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn contains_vertex(&self, vertex: &V) -> bool {
        self.vertices.contains_key(vertex)
    }
}

impl<V, E> VertexSet for UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type VerticesIter<'a> = indexmap::map::Keys<'a, V, Vec<E>>
    where
        Self: 'a;

    fn vertices(&self) -> Self::VerticesIter<'_> {
        self.vertices.keys()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn is_vertices_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl<V, E> EdgeSet for UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type EdgesIter<'a> = EdgesIter<'a, V, E>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgesIter<'_> {
        EdgesIter::new(&self.vertices, true)
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn is_edges_empty(&self) -> bool {
        self.edge_count == 0
    }

    fn contains_edge(&self, edge: &E) -> bool {
        self.vertices
            .get(edge.source())
            .is_some_and(|edges| edges.contains(edge))
    }
}

impl<V, E> ImplicitUndirectedGraph for UndirectedGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type AdjacentEdgesIter<'a> = EdgeListIter<'a, E>
    where
        Self: 'a;

    fn try_adjacent_edges(&self, vertex: &V) -> Option<Self::AdjacentEdgesIter<'_>> {
        self.vertices.get(vertex).map(|edges| EdgeListIter::new(edges))
    }

    fn edge_equality(&self) -> EdgeEquality {
        self.edge_equality
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::core::{SEdge, SUndirectedEdge};

    use super::*;

    #[test]
    fn self_edge_degree() {
        let graph = UndirectedGraph::from_edges([SEdge::new(7, 7)], true);

        assert_eq!(graph.adjacent_degree(&7), Ok(2));
        assert_eq!(graph.adjacent_edges(&7).unwrap().count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges().count(), 1);
    }

    #[test]
    fn edges_reachable_from_both_endpoints() {
        let graph = UndirectedGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(1, 2), SEdge::new(2, 0)],
            true,
        );

        assert_eq!(graph.adjacent_degree(&1), Ok(2));
        assert!(graph.contains_edge_between(&1, &0));
        assert!(graph.contains_edge_between(&0, &1));
        assert_eq!(graph.edge_count(), 3);

        let mut edges = graph
            .edges()
            .map(|e| e.into_owned().into_pair())
            .collect::<Vec<_>>();
        edges.sort_unstable();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn absent_vertex() {
        let graph = UndirectedGraph::<i32, SEdge<i32>>::default();

        assert_matches!(graph.adjacent_edges(&0).map(Iterator::count), Err(Error::VertexNotFound));
        assert_matches!(graph.adjacent_degree(&0), Err(Error::VertexNotFound));
        assert!(graph.try_adjacent_edges(&0).is_none());
        assert!(graph.try_adjacent_edge(&0, 0).is_none());
    }

    #[test]
    fn parallel_edges_in_any_orientation() {
        let mut graph = UndirectedGraph::from_edges([SEdge::new(0, 1)], false);

        assert_eq!(graph.edge_equality(), EdgeEquality::UnorderedPair);
        assert_eq!(graph.add_edge(SEdge::new(1, 0)), Ok(false));
        assert_eq!(graph.add_edge(SEdge::new(0, 1)), Ok(false));
        assert_eq!(graph.edge_count(), 1);

        let mut multi = UndirectedGraph::from_edges([SEdge::new(0, 1)], true);
        assert_eq!(multi.add_edge(SEdge::new(1, 0)), Ok(true));
        assert_eq!(multi.adjacent_degree(&0), Ok(2));
    }

    #[test]
    fn sorted_pair_equality() {
        let graph = UndirectedGraph::from_edges([SUndirectedEdge::new(4, 2)], true);

        assert_eq!(graph.edge_equality(), EdgeEquality::SortedPair);
        assert!(graph.contains_edge_between(&4, &2));
        assert_eq!(
            graph.try_get_edge(&4, &2).map(|e| e.into_owned()),
            Some(SUndirectedEdge::new(2, 4))
        );

        let strict = UndirectedGraph::<i32, SEdge<i32>>::with_edge_equality(
            EdgeEquality::SortedPair,
            true,
        );
        assert_eq!(strict.edge_equality(), EdgeEquality::SortedPair);
    }

    #[test]
    fn remove_vertex_and_edges() {
        let mut graph = UndirectedGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(1, 1),
                SEdge::new(1, 2),
                SEdge::new(2, 0),
            ],
            true,
        );

        assert!(graph.remove_edge(&SEdge::new(2, 0)));
        assert!(!graph.remove_edge(&SEdge::new(2, 0)));
        assert_eq!(graph.adjacent_degree(&0), Ok(1));

        assert!(graph.remove_vertex(&1));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.adjacent_degree(&0), Ok(0));
        assert_eq!(graph.adjacent_degree(&2), Ok(0));
    }

    #[test]
    fn remove_adjacent_edges() {
        let mut graph = UndirectedGraph::from_edges(
            [SEdge::new(0, 1), SEdge::new(2, 0), SEdge::new(1, 2)],
            true,
        );

        assert_eq!(graph.clear_adjacent_edges(&0), Ok(2));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.adjacent_degree(&1), Ok(1));

        assert_eq!(graph.remove_edge_if(|e| e.is_adjacent(&2)), 1);
        assert!(graph.is_edges_empty());
    }

    #[test]
    fn adjacent_vertex() {
        let graph = UndirectedGraph::from_edges([SEdge::new(0, 1)], true);
        let edge = SEdge::new(0, 1);

        assert_eq!(graph.adjacent_vertex(&edge, &1), &0);
        assert_eq!(graph.adjacent_vertex(&edge, &0), &1);
    }
}
