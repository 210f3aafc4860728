use std::{hash::BuildHasherDefault, slice::Iter};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::{
    core::{Edge, OwnableRef, VertexType},
    event::event_set,
};

/// Insertion-ordered map from a vertex to its incident edges.
pub(crate) type VertexEdgeMap<V, E> = IndexMap<V, Vec<E>, BuildHasherDefault<FxHasher>>;

event_set! {
    /// Structural notifications of mutable graphs.
    ///
    /// These are unrelated to traversal events: they fire when the graph
    /// itself changes, never while an algorithm walks it.
    pub struct GraphEvents<V, E> {
        vertex_added: V,
        vertex_removed: V,
        edge_added: E,
        edge_removed: E,
    }
}

/// Edges of a single vertex, lent from the storage.
#[derive(Debug, Clone)]
pub struct EdgeListIter<'a, E> {
    inner: Iter<'a, E>,
}

impl<'a, E> EdgeListIter<'a, E> {
    pub(crate) fn new(edges: &'a [E]) -> Self {
        Self {
            inner: edges.iter(),
        }
    }
}

impl<'a, E> Iterator for EdgeListIter<'a, E> {
    type Item = OwnableRef<'a, E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(OwnableRef::Borrowed)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> ExactSizeIterator for EdgeListIter<'_, E> {}

/// All edges of a storage that keeps a per-vertex edge list.
///
/// If the storage registers an edge under both endpoints, `owned_only` makes
/// the iterator yield it just from the list of its source.
pub struct EdgesIter<'a, V, E> {
    vertices: indexmap::map::Iter<'a, V, Vec<E>>,
    current: Option<(&'a V, Iter<'a, E>)>,
    owned_only: bool,
}

impl<'a, V, E> EdgesIter<'a, V, E> {
    pub(crate) fn new(map: &'a VertexEdgeMap<V, E>, owned_only: bool) -> Self {
        Self {
            vertices: map.iter(),
            current: None,
            owned_only,
        }
    }
}

impl<'a, V, E> Iterator for EdgesIter<'a, V, E>
where
    V: VertexType,
    E: Edge<V>,
{
    type Item = OwnableRef<'a, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((vertex, edges)) = self.current.as_mut() {
                for edge in edges.by_ref() {
                    if !self.owned_only || edge.source() == *vertex {
                        return Some(OwnableRef::Borrowed(edge));
                    }
                }
            }

            let (vertex, edges) = self.vertices.next()?;
            self.current = Some((vertex, edges.iter()));
        }
    }
}

/// Removes the first edge equal to `edge` from the list.
pub(crate) fn remove_first<E: PartialEq>(edges: &mut Vec<E>, edge: &E) -> Option<E> {
    let index = edges.iter().position(|e| e == edge)?;
    Some(edges.remove(index))
}
