//! Immutable directed graph in compressed sparse row form.
//!
//! All out-edge targets live in one flat array. Every vertex owns a half-open
//! range `[start, end)` of it, the ranges are contiguous and follow the
//! vertex enumeration order of the graph the representation was built from.
//!
//! # Examples
//!
//! ```
//! use walkgraph::{
//!     core::{EdgeSet, ImplicitGraph, SEdge},
//!     storage::{AdjacencyGraph, CompressedSparseRowGraph},
//! };
//!
//! let graph = AdjacencyGraph::from_edges([SEdge::new(0, 1), SEdge::new(0, 2)], true);
//! let csr = CompressedSparseRowGraph::from_graph(&graph);
//!
//! assert_eq!(csr.out_edge_range(&0), Some(0..2));
//! assert_eq!(csr.out_degree(&0), Ok(2));
//! assert_eq!(csr.edge_count(), 2);
//! ```

use std::{hash::BuildHasherDefault, ops::Range, slice::Iter};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::core::{
    Edge, EdgeSet, Error, GraphBase, ImplicitGraph, ImplicitVertexSet, IncidenceGraph,
    OwnableRef, SEdge, VertexSet, VertexType,
};

#[derive(Debug, Clone)]
pub struct CompressedSparseRowGraph<V> {
    ranges: IndexMap<V, Range<usize>, BuildHasherDefault<FxHasher>>,
    targets: Vec<V>,
    allow_parallel_edges: bool,
}

impl<V: VertexType> CompressedSparseRowGraph<V> {
    /// Takes a snapshot of the graph. Only the endpoints of the edges are
    /// kept.
    pub fn from_graph<G>(graph: &G) -> Self
    where
        G: IncidenceGraph<Vertex = V> + VertexSet,
    {
        let mut ranges =
            IndexMap::with_capacity_and_hasher(graph.vertex_count(), Default::default());
        let mut targets = Vec::new();
        let mut index = 0;

        for vertex in graph.vertices() {
            let start = index;
            let end = start + graph.out_degree(vertex).unwrap_or(0);

            if let Some(edges) = graph.try_out_edges(vertex) {
                for edge in edges {
                    targets.push(edge.target().clone());
                    index += 1;
                }
            }

            // The cursor must land exactly on the end of the range, otherwise
            // the ranges of the following vertices would overlap.
            debug_assert_eq!(index, end, "out-degree does not match out-edges of {vertex:?}");
            ranges.insert(vertex.clone(), start..index);
        }

        debug_assert_eq!(index, targets.len());

        Self {
            ranges,
            targets,
            allow_parallel_edges: graph.allows_parallel_edges(),
        }
    }

    /// The range of the flat target array holding the out-edges of the
    /// vertex.
    pub fn out_edge_range(&self, vertex: &V) -> Option<Range<usize>> {
        self.ranges.get(vertex).cloned()
    }

    /// Targets of the out-edges of the vertex.
    pub fn targets(&self, vertex: &V) -> Option<&[V]> {
        self.ranges
            .get(vertex)
            .map(|range| &self.targets[range.clone()])
    }
}

impl<V: VertexType> GraphBase for CompressedSparseRowGraph<V> {
    type Vertex = V;
    type Edge = SEdge<V>;

    fn is_directed(&self) -> bool {
        true
    }

    fn allows_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }
}

impl<V: VertexType> ImplicitVertexSet for CompressedSparseRowGraph<V> {
    fn contains_vertex(&self, vertex: &V) -> bool {
        self.ranges.contains_key(vertex)
    }
}

impl<V: VertexType> VertexSet for CompressedSparseRowGraph<V> {
    type VerticesIter<'a> = indexmap::map::Keys<'a, V, Range<usize>>
    where
        Self: 'a;

    fn vertices(&self) -> Self::VerticesIter<'_> {
        self.ranges.keys()
    }

    fn vertex_count(&self) -> usize {
        self.ranges.len()
    }
}

impl<V: VertexType> EdgeSet for CompressedSparseRowGraph<V> {
    type EdgesIter<'a> = EdgesIter<'a, V>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgesIter<'_> {
        EdgesIter {
            ranges: self.ranges.iter(),
            targets: &self.targets,
            current: None,
        }
    }

    fn edge_count(&self) -> usize {
        self.targets.len()
    }

    fn contains_edge(&self, edge: &SEdge<V>) -> bool {
        self.targets(edge.source())
            .is_some_and(|targets| targets.contains(edge.target()))
    }
}

impl<V: VertexType> ImplicitGraph for CompressedSparseRowGraph<V> {
    type OutEdgesIter<'a> = OutEdgesIter<'a, V>
    where
        Self: 'a;

    fn try_out_edges(&self, vertex: &V) -> Option<Self::OutEdgesIter<'_>> {
        let (source, range) = self.ranges.get_key_value(vertex)?;
        Some(OutEdgesIter {
            source,
            targets: self.targets[range.clone()].iter(),
        })
    }

    fn out_degree(&self, vertex: &V) -> Result<usize, Error> {
        self.ranges
            .get(vertex)
            .map(|range| range.len())
            .ok_or(Error::VertexNotFound)
    }
}

impl<V: VertexType> IncidenceGraph for CompressedSparseRowGraph<V> {}

pub struct OutEdgesIter<'a, V> {
    source: &'a V,
    targets: Iter<'a, V>,
}

impl<'a, V: VertexType> Iterator for OutEdgesIter<'a, V> {
    type Item = OwnableRef<'a, SEdge<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        let target = self.targets.next()?;
        Some(OwnableRef::Owned(SEdge::new(
            self.source.clone(),
            target.clone(),
        )))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.targets.size_hint()
    }
}

impl<V: VertexType> ExactSizeIterator for OutEdgesIter<'_, V> {}

pub struct EdgesIter<'a, V> {
    ranges: indexmap::map::Iter<'a, V, Range<usize>>,
    targets: &'a [V],
    current: Option<OutEdgesIter<'a, V>>,
}

impl<'a, V: VertexType> Iterator for EdgesIter<'a, V> {
    type Item = OwnableRef<'a, SEdge<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(edge) = self.current.as_mut().and_then(|edges| edges.next()) {
                return Some(edge);
            }

            let (source, range) = self.ranges.next()?;
            self.current = Some(OutEdgesIter {
                source,
                targets: self.targets[range.clone()].iter(),
            });
        }
    }
}
