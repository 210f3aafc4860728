//! Graphs whose edges are computed on demand by a caller-supplied function.
//!
//! The delegate is called with a vertex and returns its out-edges (adjacent
//! edges for the undirected variant), or `None` if it does not know the
//! vertex. Nothing is cached, the delegate is called on every query.
//!
//! [`DelegateIncidenceGraph`] and [`DelegateUndirectedGraph`] also carry an
//! explicit vertex set. Edges returned by the delegate that have an endpoint
//! outside of this set are dropped on every query: edge enumeration, degree
//! and lookup all see the same filtered view. [`DelegateImplicitGraph`] has
//! no vertex set and trusts the delegate.
//!
//! The graphs cannot deduplicate edges on the fly. Whether parallel edges
//! occur is the delegate's business, the `allow_parallel_edges` flag only
//! documents it for the algorithms.

use std::{hash::BuildHasherDefault, marker::PhantomData, vec};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

use crate::core::{
    Edge, EdgeEquality, EdgeSet, GraphBase, ImplicitGraph, ImplicitUndirectedGraph,
    ImplicitVertexSet, IncidenceGraph, OwnableRef, VertexSet, VertexType,
};

type VertexIndexSet<V> = IndexSet<V, BuildHasherDefault<FxHasher>>;

/// Edges produced by a delegate, handed out by value.
pub struct OwnedEdgesIter<'a, E> {
    inner: vec::IntoIter<E>,
    ty: PhantomData<&'a E>,
}

impl<E> OwnedEdgesIter<'_, E> {
    fn new(edges: Vec<E>) -> Self {
        Self {
            inner: edges.into_iter(),
            ty: PhantomData,
        }
    }
}

impl<'a, E> Iterator for OwnedEdgesIter<'a, E> {
    type Item = OwnableRef<'a, E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(OwnableRef::Owned)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> ExactSizeIterator for OwnedEdgesIter<'_, E> {}

/// Directed graph defined only by its out-edge function.
///
/// A vertex is in the graph if the delegate returns `Some` for it. The graph
/// has no enumerable vertex set and can be used with the implicit searches
/// only.
///
/// ```
/// use walkgraph::{
///     core::{ImplicitGraph, ImplicitVertexSet, SEdge},
///     storage::DelegateImplicitGraph,
/// };
///
/// let graph = DelegateImplicitGraph::new(
///     |&n: &u32| (n < 100).then(|| vec![SEdge::new(n, n * 2), SEdge::new(n, n * 2 + 1)]),
///     true,
/// );
///
/// assert!(graph.contains_vertex(&42));
/// assert!(!graph.contains_vertex(&100));
/// assert_eq!(graph.out_degree(&7), Ok(2));
/// ```
pub struct DelegateImplicitGraph<V, E, F> {
    out_edges: F,
    allow_parallel_edges: bool,
    ty: PhantomData<fn() -> (V, E)>,
}

impl<V, E, F> DelegateImplicitGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    pub fn new(out_edges: F, allow_parallel_edges: bool) -> Self {
        Self {
            out_edges,
            allow_parallel_edges,
            ty: PhantomData,
        }
    }
}

impl<V, E, F> GraphBase for DelegateImplicitGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
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

impl<V, E, F> ImplicitVertexSet for DelegateImplicitGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    fn contains_vertex(&self, vertex: &V) -> bool {
        (self.out_edges)(vertex).is_some()
    }
}

impl<V, E, F> ImplicitGraph for DelegateImplicitGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    type OutEdgesIter<'a> = OwnedEdgesIter<'a, E>
    where
        Self: 'a;

    fn try_out_edges(&self, vertex: &V) -> Option<Self::OutEdgesIter<'_>> {
        (self.out_edges)(vertex).map(OwnedEdgesIter::new)
    }
}

impl<V, E, F> IncidenceGraph for DelegateImplicitGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
}

/// Directed graph over an explicit vertex set with delegated out-edges.
pub struct DelegateIncidenceGraph<V, E, F> {
    vertices: VertexIndexSet<V>,
    out_edges: F,
    allow_parallel_edges: bool,
    ty: PhantomData<fn() -> E>,
}

impl<V, E, F> DelegateIncidenceGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    pub fn new<I>(vertices: I, out_edges: F, allow_parallel_edges: bool) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Self {
            vertices: vertices.into_iter().collect(),
            out_edges,
            allow_parallel_edges,
            ty: PhantomData,
        }
    }

    fn filtered_out_edges(&self, vertex: &V) -> Option<Vec<E>> {
        if !self.vertices.contains(vertex) {
            return None;
        }

        let mut edges = (self.out_edges)(vertex)?;
        edges.retain(|edge| {
            self.vertices.contains(edge.source()) && self.vertices.contains(edge.target())
        });
        Some(edges)
    }
}

/// Wraps an existing `vertex -> out-edges` mapping.
///
/// The keys form the vertex set, in the iteration order of the mapping.
pub fn from_map<V, E, I>(
    map: I,
    allow_parallel_edges: bool,
) -> DelegateIncidenceGraph<V, E, impl Fn(&V) -> Option<Vec<E>>>
where
    V: VertexType,
    E: Edge<V>,
    I: IntoIterator<Item = (V, Vec<E>)>,
{
    let map = map
        .into_iter()
        .collect::<IndexMap<_, _, BuildHasherDefault<FxHasher>>>();
    let vertices = map.keys().cloned().collect::<Vec<_>>();

    DelegateIncidenceGraph::new(
        vertices,
        move |vertex: &V| map.get(vertex).cloned(),
        allow_parallel_edges,
    )
}

impl<V, E, F> GraphBase for DelegateIncidenceGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
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

impl<V, E, F> ImplicitVertexSet for DelegateIncidenceGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    fn contains_vertex(&self, vertex: &V) -> bool {
        self.vertices.contains(vertex)
    }
}

impl<V, E, F> VertexSet for DelegateIncidenceGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    type VerticesIter<'a> = indexmap::set::Iter<'a, V>
    where
        Self: 'a;

    fn vertices(&self) -> Self::VerticesIter<'_> {
        self.vertices.iter()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl<V, E, F> EdgeSet for DelegateIncidenceGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    type EdgesIter<'a> = std::iter::Flatten<vec::IntoIter<OwnedEdgesIter<'a, E>>>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgesIter<'_> {
        self.vertices
            .iter()
            .filter_map(|vertex| self.filtered_out_edges(vertex))
            .map(OwnedEdgesIter::new)
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
    }

    fn contains_edge(&self, edge: &E) -> bool {
        self.filtered_out_edges(edge.source())
            .is_some_and(|edges| edges.contains(edge))
    }
}

impl<V, E, F> ImplicitGraph for DelegateIncidenceGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    type OutEdgesIter<'a> = OwnedEdgesIter<'a, E>
    where
        Self: 'a;

    fn try_out_edges(&self, vertex: &V) -> Option<Self::OutEdgesIter<'_>> {
        self.filtered_out_edges(vertex).map(OwnedEdgesIter::new)
    }
}

impl<V, E, F> IncidenceGraph for DelegateIncidenceGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
}

/// Undirected graph over an explicit vertex set with delegated adjacent
/// edges.
///
/// The delegate is expected to return an edge from both of its endpoints,
/// and a self-edge once. Enumeration of all edges yields every edge from its
/// source only.
pub struct DelegateUndirectedGraph<V, E, F> {
    vertices: VertexIndexSet<V>,
    adjacent_edges: F,
    allow_parallel_edges: bool,
    edge_equality: EdgeEquality,
    ty: PhantomData<fn() -> E>,
}

impl<V, E, F> DelegateUndirectedGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    pub fn new<I>(vertices: I, adjacent_edges: F, allow_parallel_edges: bool) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Self::with_edge_equality(
            vertices,
            adjacent_edges,
            EdgeEquality::for_edge::<V, E>(),
            allow_parallel_edges,
        )
    }

    pub fn with_edge_equality<I>(
        vertices: I,
        adjacent_edges: F,
        edge_equality: EdgeEquality,
        allow_parallel_edges: bool,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Self {
            vertices: vertices.into_iter().collect(),
            adjacent_edges,
            allow_parallel_edges,
            edge_equality,
            ty: PhantomData,
        }
    }

    fn filtered_adjacent_edges(&self, vertex: &V) -> Option<Vec<E>> {
        if !self.vertices.contains(vertex) {
            return None;
        }

        let mut edges = (self.adjacent_edges)(vertex)?;
        edges.retain(|edge| {
            edge.is_adjacent(vertex)
                && self.vertices.contains(edge.source())
                && self.vertices.contains(edge.target())
        });
        Some(edges)
    }
}

impl<V, E, F> GraphBase for DelegateUndirectedGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
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

impl<V, E, F> ImplicitVertexSet for DelegateUndirectedGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    fn contains_vertex(&self, vertex: &V) -> bool {
        self.vertices.contains(vertex)
    }
}

impl<V, E, F> VertexSet for DelegateUndirectedGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    type VerticesIter<'a> = indexmap::set::Iter<'a, V>
    where
        Self: 'a;

    fn vertices(&self) -> Self::VerticesIter<'_> {
        self.vertices.iter()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl<V, E, F> EdgeSet for DelegateUndirectedGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    type EdgesIter<'a> = OwnedEdgesIter<'a, E>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgesIter<'_> {
        let edges = self
            .vertices
            .iter()
            .filter_map(|vertex| {
                let mut edges = self.filtered_adjacent_edges(vertex)?;
                edges.retain(|edge| edge.source() == vertex);
                Some(edges)
            })
            .flatten()
            .collect();

        OwnedEdgesIter::new(edges)
    }

    fn contains_edge(&self, edge: &E) -> bool {
        self.filtered_adjacent_edges(edge.source())
            .is_some_and(|edges| edges.contains(edge))
    }
}

impl<V, E, F> ImplicitUndirectedGraph for DelegateUndirectedGraph<V, E, F>
where
    V: VertexType,
    E: Edge<V>,
    F: Fn(&V) -> Option<Vec<E>>,
{
    type AdjacentEdgesIter<'a> = OwnedEdgesIter<'a, E>
    where
        Self: 'a;

    fn try_adjacent_edges(&self, vertex: &V) -> Option<Self::AdjacentEdgesIter<'_>> {
        self.filtered_adjacent_edges(vertex)
            .map(OwnedEdgesIter::new)
    }

    fn edge_equality(&self) -> EdgeEquality {
        self.edge_equality
    }
}
