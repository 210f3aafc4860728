//! Mutable directed graph that keeps both out-edges and in-edges of every
//! vertex.
//!
//! Each edge is stored twice, once in the outgoing list of its source and
//! once in the incoming list of its target, which makes in-edge queries as
//! cheap as out-edge queries at the cost of double bookkeeping on mutation.

use std::fmt;

use crate::core::{
    BidirectionalIncidenceGraph, Direction, Edge, EdgeSet, Error, GraphBase, ImplicitGraph,
    ImplicitVertexSet, IncidenceGraph, VertexSet, VertexType,
};

use super::shared::{remove_first, EdgeListIter, EdgesIter, GraphEvents, VertexEdgeMap};

pub struct BidirectionalGraph<V, E> {
    // Indexed by `Direction::index`. Both maps always have the same keys in
    // the same order.
    adjacency: [VertexEdgeMap<V, E>; 2],
    edge_count: usize,
    allow_parallel_edges: bool,
    events: GraphEvents<V, E>,
}

impl<V, E> BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    pub fn new(allow_parallel_edges: bool) -> Self {
        Self::with_capacity(0, allow_parallel_edges)
    }

    pub fn with_capacity(vertex_capacity: usize, allow_parallel_edges: bool) -> Self {
        Self {
            adjacency: [
                VertexEdgeMap::with_capacity_and_hasher(vertex_capacity, Default::default()),
                VertexEdgeMap::with_capacity_and_hasher(vertex_capacity, Default::default()),
            ],
            edge_count: 0,
            allow_parallel_edges,
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

    /// See [`AdjacencyGraph::from_vertices_and_edges`](super::AdjacencyGraph::from_vertices_and_edges).
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

        let sources = graph.out_map().keys().cloned().collect::<Vec<_>>();
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

    pub fn events(&self) -> &GraphEvents<V, E> {
        &self.events
    }

    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.out_map().contains_key(&vertex) {
            return false;
        }

        for map in self.adjacency.iter_mut() {
            map.insert(vertex.clone(), Vec::new());
        }
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
        let [outgoing, incoming] = &mut self.adjacency;

        let Some(out_edges) = outgoing.shift_remove(vertex) else {
            return false;
        };
        let in_edges = incoming.shift_remove(vertex).unwrap_or_default();

        let mut removed = 0;
        for edge in out_edges.iter() {
            if !edge.is_self_edge() {
                if let Some(edges) = incoming.get_mut(edge.target()) {
                    remove_first(edges, edge);
                }
            }
            self.events.edge_removed.raise(edge);
            removed += 1;
        }

        // Self-edges were already handled with the out-edges.
        for edge in in_edges.iter().filter(|edge| !edge.is_self_edge()) {
            if let Some(edges) = outgoing.get_mut(edge.source()) {
                remove_first(edges, edge);
            }
            self.events.edge_removed.raise(edge);
            removed += 1;
        }

        self.edge_count -= removed;
        self.events.vertex_removed.raise(vertex);
        true
    }

    pub fn remove_vertex_if<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&V) -> bool,
    {
        let doomed = self
            .out_map()
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
        if !self.out_map().contains_key(edge.target()) {
            return Err(Error::VertexNotFound);
        }

        let [outgoing, incoming] = &mut self.adjacency;
        let out_edges = outgoing
            .get_mut(edge.source())
            .ok_or(Error::VertexNotFound)?;

        if !self.allow_parallel_edges && out_edges.iter().any(|e| e.target() == edge.target()) {
            return Ok(false);
        }

        out_edges.push(edge.clone());
        if let Some(in_edges) = incoming.get_mut(edge.target()) {
            in_edges.push(edge.clone());
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
        let [outgoing, incoming] = &mut self.adjacency;

        let Some(removed) = outgoing
            .get_mut(edge.source())
            .and_then(|edges| remove_first(edges, edge))
        else {
            return false;
        };

        if let Some(edges) = incoming.get_mut(edge.target()) {
            remove_first(edges, edge);
        }

        self.edge_count -= 1;
        self.events.edge_removed.raise(&removed);
        true
    }

    pub fn remove_edge_if<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&E) -> bool,
    {
        let doomed = self
            .out_map()
            .values()
            .flatten()
            .filter(|edge| predicate(edge))
            .cloned()
            .collect::<Vec<_>>();

        self.remove_all(doomed)
    }

    pub fn remove_out_edge_if<P>(&mut self, vertex: &V, predicate: P) -> Result<usize, Error>
    where
        P: FnMut(&E) -> bool,
    {
        self.remove_incident_edge_if(vertex, Direction::Outgoing, predicate)
    }

    pub fn remove_in_edge_if<P>(&mut self, vertex: &V, predicate: P) -> Result<usize, Error>
    where
        P: FnMut(&E) -> bool,
    {
        self.remove_incident_edge_if(vertex, Direction::Incoming, predicate)
    }

    pub fn clear_out_edges(&mut self, vertex: &V) -> Result<usize, Error> {
        self.remove_out_edge_if(vertex, |_| true)
    }

    pub fn clear_in_edges(&mut self, vertex: &V) -> Result<usize, Error> {
        self.remove_in_edge_if(vertex, |_| true)
    }

    /// Removes all edges incident to the vertex, keeping the vertex.
    pub fn clear_edges(&mut self, vertex: &V) -> Result<usize, Error> {
        Ok(self.clear_out_edges(vertex)? + self.clear_in_edges(vertex)?)
    }

    /// Removes the vertex and reconnects its neighborhood.
    ///
    /// For every pair of an in-edge `(u, v)` and an out-edge `(v, w)`, the
    /// edge produced by `edge_factory(in_edge, out_edge)` is added. Self-edges
    /// of the vertex are dropped. Returns the number of added edges.
    pub fn merge_vertex<F>(&mut self, vertex: &V, mut edge_factory: F) -> Result<usize, Error>
    where
        F: FnMut(&E, &E) -> E,
    {
        let in_edges = self.edge_list(vertex, Direction::Incoming)?.to_vec();
        let out_edges = self.edge_list(vertex, Direction::Outgoing)?.to_vec();

        self.remove_vertex(vertex);

        let mut added = 0;
        for in_edge in in_edges.iter().filter(|edge| !edge.is_self_edge()) {
            for out_edge in out_edges.iter().filter(|edge| !edge.is_self_edge()) {
                if self.add_edge(edge_factory(in_edge, out_edge))? {
                    added += 1;
                }
            }
        }

        Ok(added)
    }

    /// Merges all vertices matching the predicate, one by one.
    pub fn merge_vertex_if<P, F>(&mut self, mut predicate: P, mut edge_factory: F) -> usize
    where
        P: FnMut(&V) -> bool,
        F: FnMut(&E, &E) -> E,
    {
        let doomed = self
            .out_map()
            .keys()
            .filter(|vertex| predicate(vertex))
            .cloned()
            .collect::<Vec<_>>();

        doomed
            .iter()
            .filter_map(|vertex| self.merge_vertex(vertex, &mut edge_factory).ok())
            .count()
    }

    pub fn trim_edge_excess(&mut self) {
        for map in self.adjacency.iter_mut() {
            for edges in map.values_mut() {
                edges.shrink_to_fit();
            }
        }
    }

    pub fn clear(&mut self) {
        let [outgoing, incoming] = &mut self.adjacency;
        let vertices = std::mem::take(outgoing);
        incoming.clear();
        self.edge_count = 0;

        for (vertex, edges) in vertices {
            for edge in edges.iter() {
                self.events.edge_removed.raise(edge);
            }
            self.events.vertex_removed.raise(&vertex);
        }
    }

    fn out_map(&self) -> &VertexEdgeMap<V, E> {
        &self.adjacency[Direction::Outgoing.index()]
    }

    fn edge_list(&self, vertex: &V, dir: Direction) -> Result<&[E], Error> {
        self.adjacency[dir.index()]
            .get(vertex)
            .map(Vec::as_slice)
            .ok_or(Error::VertexNotFound)
    }

    fn remove_incident_edge_if<P>(
        &mut self,
        vertex: &V,
        dir: Direction,
        mut predicate: P,
    ) -> Result<usize, Error>
    where
        P: FnMut(&E) -> bool,
    {
        let doomed = self
            .edge_list(vertex, dir)?
            .iter()
            .filter(|edge| predicate(edge))
            .cloned()
            .collect::<Vec<_>>();

        Ok(self.remove_all(doomed))
    }

    fn remove_all(&mut self, edges: Vec<E>) -> usize {
        edges.iter().filter(|edge| self.remove_edge(edge)).count()
    }
}

impl<V, E> Default for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn default() -> Self {
        Self::new(true)
    }
}

impl<V, E> Clone for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn clone(&self) -> Self {
        Self {
            adjacency: self.adjacency.clone(),
            edge_count: self.edge_count,
            allow_parallel_edges: self.allow_parallel_edges,
            events: GraphEvents::default(),
        }
    }
}

impl<V: fmt::Debug, E: fmt::Debug> fmt::Debug for BidirectionalGraph<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BidirectionalGraph")
            .field("out_edges", &self.adjacency[0])
            .field("in_edges", &self.adjacency[1])
            .field("edge_count", &self.edge_count)
            .field("allow_parallel_edges", &self.allow_parallel_edges)
            .finish()
    }
}

impl<V, E> GraphBase for BidirectionalGraph<V, E>
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

impl<V, E> ImplicitVertexSet for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    fn contains_vertex(&self, vertex: &V) -> bool {
        self.adjacency[Direction::Outgoing.index()].contains_key(vertex)
    }
}

impl<V, E> VertexSet for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type VerticesIter<'a> = indexmap::map::Keys<'a, V, Vec<E>>
    where
        Self: 'a;

    fn vertices(&self) -> Self::VerticesIter<'_> {
        self.adjacency[Direction::Outgoing.index()].keys()
    }

    fn vertex_count(&self) -> usize {
        self.adjacency[Direction::Outgoing.index()].len()
    }

    fn is_vertices_empty(&self) -> bool {
        self.adjacency[Direction::Outgoing.index()].is_empty()
    }
}

impl<V, E> EdgeSet for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type EdgesIter<'a> = EdgesIter<'a, V, E>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgesIter<'_> {
        EdgesIter::new(&self.adjacency[Direction::Outgoing.index()], false)
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn is_edges_empty(&self) -> bool {
        self.edge_count == 0
    }

    fn contains_edge(&self, edge: &E) -> bool {
        self.adjacency[Direction::Outgoing.index()]
            .get(edge.source())
            .is_some_and(|edges| edges.contains(edge))
    }
}

impl<V, E> ImplicitGraph for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type OutEdgesIter<'a> = EdgeListIter<'a, E>
    where
        Self: 'a;

    fn try_out_edges(&self, vertex: &V) -> Option<Self::OutEdgesIter<'_>> {
        self.adjacency[Direction::Outgoing.index()]
            .get(vertex)
            .map(|edges| EdgeListIter::new(edges))
    }

    fn out_degree(&self, vertex: &V) -> Result<usize, Error> {
        self.adjacency[Direction::Outgoing.index()]
            .get(vertex)
            .map(Vec::len)
            .ok_or(Error::VertexNotFound)
    }
}

impl<V, E> IncidenceGraph for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
}

impl<V, E> BidirectionalIncidenceGraph for BidirectionalGraph<V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type InEdgesIter<'a> = EdgeListIter<'a, E>
    where
        Self: 'a;

    fn try_in_edges(&self, vertex: &V) -> Option<Self::InEdgesIter<'_>> {
        self.adjacency[Direction::Incoming.index()]
            .get(vertex)
            .map(|edges| EdgeListIter::new(edges))
    }

    fn in_degree(&self, vertex: &V) -> Result<usize, Error> {
        self.adjacency[Direction::Incoming.index()]
            .get(vertex)
            .map(Vec::len)
            .ok_or(Error::VertexNotFound)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::core::{SEdge, TaggedEdge};

    use super::*;

    fn sources_of(graph: &BidirectionalGraph<i32, SEdge<i32>>, vertex: i32) -> Vec<i32> {
        let mut sources = graph
            .in_edges(&vertex)
            .unwrap()
            .map(|e| *e.source())
            .collect::<Vec<_>>();
        sources.sort_unstable();
        sources
    }

    #[test]
    fn in_edges_mirror_out_edges() {
        let graph = BidirectionalGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(2, 1),
                SEdge::new(1, 3),
                SEdge::new(3, 1),
            ],
            true,
        );

        assert_eq!(sources_of(&graph, 1), vec![0, 2, 3]);
        assert_eq!(graph.in_degree(&1), Ok(3));
        assert_eq!(graph.out_degree(&1), Ok(1));
        assert_eq!(graph.degree(&1), Ok(4));
        assert_eq!(graph.in_degree(&0), Ok(0));
        assert_matches!(graph.in_edges(&9).map(Iterator::count), Err(Error::VertexNotFound));
        assert!(graph.try_in_edges(&9).is_none());
    }

    #[test]
    fn self_edge_in_both_lists() {
        let graph = BidirectionalGraph::from_edges([SEdge::new(5, 5)], true);

        assert_eq!(graph.out_degree(&5), Ok(1));
        assert_eq!(graph.in_degree(&5), Ok(1));
        assert_eq!(graph.degree(&5), Ok(2));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_vertex_updates_both_sides() {
        let mut graph = BidirectionalGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(1, 2),
                SEdge::new(1, 1),
                SEdge::new(2, 0),
            ],
            true,
        );

        assert!(graph.remove_vertex(&1));
        assert!(!graph.remove_vertex(&1));

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.out_degree(&0), Ok(0));
        assert_eq!(graph.in_degree(&2), Ok(0));
        assert_eq!(graph.in_degree(&0), Ok(1));
    }

    #[test]
    fn clear_edges() {
        let mut graph = BidirectionalGraph::from_edges(
            [
                SEdge::new(0, 1),
                SEdge::new(1, 2),
                SEdge::new(1, 1),
                SEdge::new(3, 1),
            ],
            true,
        );

        assert_eq!(graph.clear_in_edges(&1), Ok(3));
        assert_eq!(graph.out_degree(&0), Ok(0));
        assert_eq!(graph.out_degree(&1), Ok(1));

        assert_eq!(graph.clear_edges(&1), Ok(1));
        assert!(graph.is_edges_empty());
        assert!(graph.contains_vertex(&1));
        assert_matches!(graph.clear_edges(&7), Err(Error::VertexNotFound));
    }

    #[test]
    fn remove_edges_by_predicate() {
        let mut graph = BidirectionalGraph::from_edges(
            [
                TaggedEdge::new(0, 1, 1),
                TaggedEdge::new(0, 1, 2),
                TaggedEdge::new(1, 0, 3),
            ],
            true,
        );

        assert_eq!(graph.remove_in_edge_if(&1, |e| *e.tag() == 2), Ok(1));
        assert_eq!(graph.in_degree(&1), Ok(1));
        assert_eq!(graph.out_degree(&0), Ok(1));

        assert_eq!(graph.remove_edge_if(|e| *e.tag() > 0), 2);
        assert!(graph.is_edges_empty());
        assert_eq!(graph.in_degree(&0), Ok(0));
    }

    #[test]
    fn merge_vertex() {
        let mut graph = BidirectionalGraph::from_edges(
            [
                SEdge::new(0, 2),
                SEdge::new(1, 2),
                SEdge::new(2, 2),
                SEdge::new(2, 3),
                SEdge::new(2, 4),
            ],
            true,
        );

        let added = graph.merge_vertex(&2, |i, o| SEdge::new(*i.source(), *o.target()));

        assert_eq!(added, Ok(4));
        assert!(!graph.contains_vertex(&2));
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.contains_edge_between(&0, &3));
        assert!(graph.contains_edge_between(&1, &4));
        assert_eq!(sources_of(&graph, 4), vec![0, 1]);

        assert_matches!(
            graph.merge_vertex(&2, |i, _| i.clone()),
            Err(Error::VertexNotFound)
        );
    }

    #[test]
    fn parallel_edges_refused() {
        let mut graph = BidirectionalGraph::from_edges([SEdge::new(0, 1)], false);

        assert_eq!(graph.add_edge(SEdge::new(0, 1)), Ok(false));
        assert_eq!(graph.in_degree(&1), Ok(1));
        assert_eq!(graph.add_edge(SEdge::new(1, 0)), Ok(true));
    }
}
