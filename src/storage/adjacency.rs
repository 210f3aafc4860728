//! Mutable directed graph storing the out-edges of each vertex.
//!
//! Vertices are kept in insertion order, which is also the enumeration order
//! used by the searches when they process all components.
//!
//! # Examples
//!
//! ```
//! use walkgraph::{
//!     core::{ImplicitGraph, IncidenceGraph, SEdge},
//!     storage::AdjacencyGraph,
//! };
//!
//! let graph = AdjacencyGraph::from_edges([SEdge::new(1, 2), SEdge::new(2, 3)], true);
//!
//! assert!(graph.contains_edge_between(&1, &2));
//! assert_eq!(graph.out_degree(&2), Ok(1));
//! assert!(graph.out_degree(&4).is_err());
//! ```

use std::fmt;

use crate::core::{
    Edge, EdgeSet, Error, GraphBase, ImplicitGraph, ImplicitVertexSet, IncidenceGraph, VertexSet,
    VertexType,
};

use super::shared::{remove_first, EdgeListIter, EdgesIter, GraphEvents, VertexEdgeMap};

pub struct AdjacencyGraph<V, E> {
    vertices: VertexEdgeMap<V, E>,
    edge_count: usize,
    allow_parallel_edges: bool,
    events: GraphEvents<V, E>,
}

impl<V, E> AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    pub fn new(allow_parallel_edges: bool) -> Self {
        Self::with_capacity(0, allow_parallel_edges)
    }

    pub fn with_capacity(vertex_capacity: usize, allow_parallel_edges: bool) -> Self {
        Self {
            vertices: VertexEdgeMap::with_capacity_and_hasher(vertex_capacity, Default::default()),
            edge_count: 0,
            allow_parallel_edges,
            events: GraphEvents::default(),
        }
    }

    /// Builds the graph from an edge list. Endpoints are added as they are
    /// encountered.
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
    /// out-edges of each vertex.
    ///
    /// Fails with [`Error::VertexNotFound`] if the factory produces an edge
    /// that does not start at the vertex or that leads outside of the vertex
    /// collection.
    pub fn from_vertices_and_edges<I, F, N>(
        vertices: I,
        mut out_edges: F,
        allow_parallel_edges: bool,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> N,
        N: IntoIterator<Item = E>,
    {
        let mut graph = Self::new(allow_parallel_edges);
        graph.add_vertex_range(vertices);

        let sources = graph.vertices.keys().cloned().collect::<Vec<_>>();
        for source in sources {
            for edge in out_edges(&source) {
                if edge.source() != &source {
                    return Err(Error::VertexNotFound);
                }
                graph.add_edge(edge)?;
            }
        }

        Ok(graph)
    }

    /// Structural notifications of this graph.
    pub fn events(&self) -> &GraphEvents<V, E> {
        &self.events
    }

    /// Adds the vertex. Returns `false` if it was already present.
    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.vertices.contains_key(&vertex) {
            return false;
        }

        self.vertices.insert(vertex.clone(), Vec::new());
        self.events.vertex_added.raise(&vertex);
        true
    }

    /// Adds all vertices and returns how many of them were new.
    pub fn add_vertex_range<I>(&mut self, vertices: I) -> usize
    where
        I: IntoIterator<Item = V>,
    {
        vertices
            .into_iter()
            .filter(|vertex| self.add_vertex(vertex.clone()))
            .count()
    }

    /// Removes the vertex together with all edges incident to it.
    pub fn remove_vertex(&mut self, vertex: &V) -> bool {
        let Some(out_edges) = self.vertices.shift_remove(vertex) else {
            return false;
        };

        self.edge_count -= out_edges.len();
        for edge in out_edges.iter() {
            self.events.edge_removed.raise(edge);
        }

        let events = &self.events;
        let mut removed = 0;
        for edges in self.vertices.values_mut() {
            edges.retain(|edge| {
                if edge.target() == vertex {
                    events.edge_removed.raise(edge);
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        self.edge_count -= removed;

        self.events.vertex_removed.raise(vertex);
        true
    }

    /// Removes all vertices matching the predicate and returns their number.
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
    /// if the graph does not allow parallel edges and the same edge is
    /// already present.
    pub fn add_edge(&mut self, edge: E) -> Result<bool, Error> {
        if !self.vertices.contains_key(edge.target()) {
            return Err(Error::VertexNotFound);
        }

        let allow_parallel_edges = self.allow_parallel_edges;
        let out_edges = self
            .vertices
            .get_mut(edge.source())
            .ok_or(Error::VertexNotFound)?;

        if !allow_parallel_edges && out_edges.iter().any(|e| e.target() == edge.target()) {
            return Ok(false);
        }

        out_edges.push(edge.clone());
        self.edge_count += 1;
        self.events.edge_added.raise(&edge);
        Ok(true)
    }

    /// Adds the edge together with any of its endpoints that are missing.
    pub fn add_verts_and_edge(&mut self, edge: E) -> bool {
        self.add_vertex(edge.source().clone());
        self.add_vertex(edge.target().clone());
        // Both endpoints exist now.
        self.add_edge(edge).unwrap_or(false)
    }

    /// Adds all edges and returns how many were added.
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

    /// Removes one occurrence of the edge.
    pub fn remove_edge(&mut self, edge: &E) -> bool {
        let Some(out_edges) = self.vertices.get_mut(edge.source()) else {
            return false;
        };

        match remove_first(out_edges, edge) {
            Some(removed) => {
                self.edge_count -= 1;
                self.events.edge_removed.raise(&removed);
                true
            }
            None => false,
        }
    }

    /// Removes all edges matching the predicate and returns their number.
    pub fn remove_edge_if<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&E) -> bool,
    {
        let events = &self.events;
        let mut removed = 0;
        for edges in self.vertices.values_mut() {
            edges.retain(|edge| {
                if predicate(edge) {
                    events.edge_removed.raise(edge);
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }

        self.edge_count -= removed;
        removed
    }

    /// Removes the out-edges of the vertex matching the predicate.
    pub fn remove_out_edge_if<P>(&mut self, vertex: &V, mut predicate: P) -> Result<usize, Error>
    where
        P: FnMut(&E) -> bool,
    {
        let events = &self.events;
        let edges = self
            .vertices
            .get_mut(vertex)
            .ok_or(Error::VertexNotFound)?;

        let before = edges.len();
        edges.retain(|edge| {
            if predicate(edge) {
                events.edge_removed.raise(edge);
                false
            } else {
                true
            }
        });

        let removed = before - edges.len();
        self.edge_count -= removed;
        Ok(removed)
    }

    /// Removes all out-edges of the vertex.
    pub fn clear_out_edges(&mut self, vertex: &V) -> Result<usize, Error> {
        self.remove_out_edge_if(vertex, |_| true)
    }

    /// Releases unused capacity of the edge lists.
    pub fn trim_edge_excess(&mut self) {
        for edges in self.vertices.values_mut() {
            edges.shrink_to_fit();
        }
    }

    /// Removes all vertices and edges.
    pub fn clear(&mut self) {
        let vertices = std::mem::take(&mut self.vertices);
        self.edge_count = 0;

        for (vertex, edges) in vertices {
            for edge in edges.iter() {
                self.events.edge_removed.raise(edge);
            }
            self.events.vertex_removed.raise(&vertex);
        }
    }
}

impl<V, E> Default for AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn default() -> Self {
        Self::new(true)
    }
}

impl<V, E> Clone for AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    /// Clones the structure. Handlers subscribed to the structural events are
    /// not carried over.
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            edge_count: self.edge_count,
            allow_parallel_edges: self.allow_parallel_edges,
            events: GraphEvents::default(),
        }
    }
}

impl<V: fmt::Debug, E: fmt::Debug> fmt::Debug for AdjacencyGraph<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacencyGraph")
            .field("vertices", &self.vertices)
            .field("edge_count", &self.edge_count)
            .field("allow_parallel_edges", &self.allow_parallel_edges)
            .finish()
    }
}

impl<V, E> GraphBase for AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type Vertex = V;
    type Edge = E;

    fn is_directed(&self) -> bool {
        true
    }

    fn allows_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }
}

impl<V, E> ImplicitVertexSet for AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn contains_vertex(&self, vertex: &V) -> bool {
        self.vertices.contains_key(vertex)
    }
}

impl<V, E> VertexSet for AdjacencyGraph<V, E>
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

impl<V, E> EdgeSet for AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type EdgesIter<'a> = EdgesIter<'a, V, E>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgesIter<'_> {
        EdgesIter::new(&self.vertices, false)
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

impl<V, E> ImplicitGraph for AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type OutEdgesIter<'a> = EdgeListIter<'a, E>
    where
        Self: 'a;

    fn try_out_edges(&self, vertex: &V) -> Option<Self::OutEdgesIter<'_>> {
        self.vertices.get(vertex).map(|edges| EdgeListIter::new(edges))
    }

    fn out_degree(&self, vertex: &V) -> Result<usize, Error> {
        self.vertices
            .get(vertex)
            .map(Vec::len)
            .ok_or(Error::VertexNotFound)
    }
}

impl<V, E> IncidenceGraph for AdjacencyGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use assert_matches::assert_matches;

    use crate::core::{SEdge, TaggedEdge};

    use super::*;

    fn sorted_edges<G>(graph: &G) -> Vec<(i32, i32)>
    where
        G: EdgeSet<Vertex = i32>,
    {
        let mut edges = graph
            .edges()
            .map(|e| (*e.source(), *e.target()))
            .collect::<Vec<_>>();
        edges.sort_unstable();
        edges
    }

    #[test]
    fn basic() {
        let mut graph = AdjacencyGraph::<i32, SEdge<i32>>::default();

        assert!(graph.add_vertex(0));
        assert!(!graph.add_vertex(0));
        assert_eq!(graph.add_vertex_range([1, 2, 3]), 3);

        assert_eq!(graph.add_edge(SEdge::new(0, 1)), Ok(true));
        assert_eq!(graph.add_edge(SEdge::new(0, 2)), Ok(true));
        assert_eq!(graph.add_edge(SEdge::new(2, 3)), Ok(true));
        assert_eq!(graph.add_edge(SEdge::new(3, 0)), Ok(true));

        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.out_degree(&0), Ok(2));
        assert!(graph.contains_edge_between(&3, &0));
        assert!(!graph.contains_edge_between(&0, &3));

        assert!(graph.remove_vertex(&0));
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(sorted_edges(&graph), vec![(2, 3)]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn absent_vertex() {
        let mut graph = AdjacencyGraph::<i32, SEdge<i32>>::default();
        graph.add_vertex(1);

        assert_matches!(graph.out_edges(&2).map(Iterator::count), Err(Error::VertexNotFound));
        assert!(graph.try_out_edges(&2).is_none());
        assert_eq!(graph.out_degree(&1), Ok(0));
        assert_matches!(graph.add_edge(SEdge::new(1, 2)), Err(Error::VertexNotFound));
        assert_matches!(graph.add_edge(SEdge::new(2, 1)), Err(Error::VertexNotFound));
        assert_matches!(graph.clear_out_edges(&2), Err(Error::VertexNotFound));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn parallel_edges() {
        let mut multi = AdjacencyGraph::from_edges([SEdge::new(0, 1)], true);
        assert_eq!(multi.add_edge(SEdge::new(0, 1)), Ok(true));
        assert_eq!(multi.edge_count(), 2);
        assert_eq!(multi.try_get_edges(&0, &1).map(|e| e.len()), Some(2));

        let mut simple = AdjacencyGraph::from_edges([SEdge::new(0, 1)], false);
        assert_eq!(simple.add_edge(SEdge::new(0, 1)), Ok(false));
        assert!(!simple.add_verts_and_edge(SEdge::new(0, 1)));
        assert_eq!(simple.edge_count(), 1);
    }

    #[test]
    fn remove_edges() {
        let mut graph = AdjacencyGraph::from_edges(
            [
                TaggedEdge::new(0, 1, 'a'),
                TaggedEdge::new(0, 1, 'b'),
                TaggedEdge::new(1, 2, 'c'),
                TaggedEdge::new(2, 0, 'd'),
            ],
            true,
        );

        assert!(graph.remove_edge(&TaggedEdge::new(0, 1, 'b')));
        assert!(!graph.remove_edge(&TaggedEdge::new(0, 1, 'b')));
        assert_eq!(graph.edge_count(), 3);

        assert_eq!(graph.remove_edge_if(|e| *e.tag() == 'c'), 1);
        assert_eq!(graph.remove_out_edge_if(&2, |_| true), Ok(1));
        assert_eq!(graph.edge_count(), 1);

        assert_eq!(graph.clear_out_edges(&0), Ok(1));
        assert!(graph.is_edges_empty());
    }

    #[test]
    fn from_vertices_and_edges() {
        let graph = AdjacencyGraph::from_vertices_and_edges(
            0..4,
            |&v| (v + 1..4).map(move |u| SEdge::new(v, u)),
            true,
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.vertices().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let invalid =
            AdjacencyGraph::from_vertices_and_edges(0..2, |&v| [SEdge::new(v, 5)], true);
        assert_matches!(invalid, Err(Error::VertexNotFound));
    }

    #[test]
    fn structural_events() {
        let mut graph = AdjacencyGraph::<i32, SEdge<i32>>::default();
        let log = Rc::new(RefCell::new(Vec::new()));

        let _subs = [
            graph.events().vertex_added.subscribe({
                let log = Rc::clone(&log);
                move |v| log.borrow_mut().push(format!("+v{v}"))
            }),
            graph.events().vertex_removed.subscribe({
                let log = Rc::clone(&log);
                move |v| log.borrow_mut().push(format!("-v{v}"))
            }),
            graph.events().edge_added.subscribe({
                let log = Rc::clone(&log);
                move |e| log.borrow_mut().push(format!("+e{}{}", e.source(), e.target()))
            }),
            graph.events().edge_removed.subscribe({
                let log = Rc::clone(&log);
                move |e| log.borrow_mut().push(format!("-e{}{}", e.source(), e.target()))
            }),
        ];

        graph.add_verts_and_edge(SEdge::new(1, 2));
        graph.remove_vertex(&2);

        assert_eq!(*log.borrow(), vec!["+v1", "+v2", "+e12", "-e12", "-v2"]);
    }

    #[test]
    fn clear() {
        let mut graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(1, 2)], true);
        graph.clear();

        assert!(graph.is_vertices_empty());
        assert!(graph.is_edges_empty());
    }

    #[test]
    fn clone_keeps_structure() {
        let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(1, 2)], true);
        let _sub = graph.events().edge_added.subscribe(|_| {});
        let copy = graph.clone();

        assert_eq!(sorted_edges(&copy), sorted_edges(&graph));
        assert!(!copy.events().edge_added.has_handlers());
    }
}
