//! Vertex and edge vocabulary.
//!
//! The engine treats vertices as opaque values compared by equality and
//! hashing. Edges are anything that can name their two endpoints, see
//! [`Edge`].

use std::{fmt::Debug, hash::Hash};

/// Requirements on a vertex type.
///
/// Implemented automatically for every type satisfying the supertraits.
pub trait VertexType: Clone + Eq + Hash + Debug + 'static {}

impl<T> VertexType for T where T: Clone + Eq + Hash + Debug + 'static {}

/// An edge between two vertices of type `V`.
///
/// Directed graphs read the edge as going from [`source`](Edge::source) to
/// [`target`](Edge::target). Undirected graphs store the same type but
/// interpret it symmetrically.
pub trait Edge<V: VertexType>: Clone + Eq + Hash + Debug + 'static {
    /// Set to `true` by edge types that are inherently undirected and keep
    /// their endpoints in a canonical order. Undirected graphs use it to pick
    /// [`EdgeEquality::SortedPair`] automatically.
    const IS_UNDIRECTED: bool = false;

    fn source(&self) -> &V;
    fn target(&self) -> &V;

    fn is_self_edge(&self) -> bool {
        self.source() == self.target()
    }

    /// Returns `true` if the vertex is one of the endpoints.
    fn is_adjacent(&self, vertex: &V) -> bool {
        self.source() == vertex || self.target() == vertex
    }

    /// Returns the endpoint opposite to `vertex`.
    ///
    /// If `vertex` is not an endpoint, the source is returned.
    fn other_vertex(&self, vertex: &V) -> &V {
        if self.source() == vertex {
            self.target()
        } else {
            self.source()
        }
    }

    /// Brings a queried vertex pair into the canonical order of this edge
    /// type. Identity unless the type declares itself
    /// [undirected](Edge::IS_UNDIRECTED).
    fn normalize_endpoints<'a>(source: &'a V, target: &'a V) -> (&'a V, &'a V) {
        (source, target)
    }
}

/// The plain edge: an ordered pair of vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct SEdge<V> {
    source: V,
    target: V,
}

impl<V> SEdge<V> {
    pub fn new(source: V, target: V) -> Self {
        Self { source, target }
    }

    /// Returns the same edge going in the opposite direction.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }

    pub fn into_pair(self) -> (V, V) {
        (self.source, self.target)
    }
}

impl<V: VertexType> Edge<V> for SEdge<V> {
    fn source(&self) -> &V {
        &self.source
    }

    fn target(&self) -> &V {
        &self.target
    }
}

impl<V> From<(V, V)> for SEdge<V> {
    fn from((source, target): (V, V)) -> Self {
        Self::new(source, target)
    }
}

/// An edge carrying a payload.
///
/// Edge identity is value equality, so the tag is what distinguishes
/// parallel edges between the same pair of vertices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaggedEdge<V, T> {
    source: V,
    target: V,
    tag: T,
}

impl<V, T> TaggedEdge<V, T> {
    pub fn new(source: V, target: V, tag: T) -> Self {
        Self {
            source,
            target,
            tag,
        }
    }

    pub fn tag(&self) -> &T {
        &self.tag
    }

    pub fn into_tag(self) -> T {
        self.tag
    }
}

impl<V, T> Edge<V> for TaggedEdge<V, T>
where
    V: VertexType,
    T: Clone + Eq + Hash + Debug + 'static,
{
    fn source(&self) -> &V {
        &self.source
    }

    fn target(&self) -> &V {
        &self.target
    }
}

/// An inherently undirected edge.
///
/// The endpoints are stored sorted, so `SUndirectedEdge::new(3, 1)` and
/// `SUndirectedEdge::new(1, 3)` are the same edge with source `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SUndirectedEdge<V> {
    source: V,
    target: V,
}

impl<V: Ord> SUndirectedEdge<V> {
    pub fn new(a: V, b: V) -> Self {
        if a <= b {
            Self {
                source: a,
                target: b,
            }
        } else {
            Self {
                source: b,
                target: a,
            }
        }
    }
}

impl<V: VertexType + Ord> Edge<V> for SUndirectedEdge<V> {
    const IS_UNDIRECTED: bool = true;

    fn source(&self) -> &V {
        &self.source
    }

    fn target(&self) -> &V {
        &self.target
    }

    fn normalize_endpoints<'a>(source: &'a V, target: &'a V) -> (&'a V, &'a V) {
        if source <= target {
            (source, target)
        } else {
            (target, source)
        }
    }
}

/// How an undirected graph decides whether an edge connects a queried pair
/// of vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEquality {
    /// The queried pair is brought to the canonical order of the edge type
    /// and compared with the endpoints as stored.
    SortedPair,
    /// The pair matches in either orientation.
    UnorderedPair,
}

impl EdgeEquality {
    /// Picks the policy suited for the edge type.
    pub fn for_edge<V, E>() -> Self
    where
        V: VertexType,
        E: Edge<V>,
    {
        if E::IS_UNDIRECTED {
            EdgeEquality::SortedPair
        } else {
            EdgeEquality::UnorderedPair
        }
    }

    pub fn matches<V, E>(self, edge: &E, source: &V, target: &V) -> bool
    where
        V: VertexType,
        E: Edge<V>,
    {
        match self {
            EdgeEquality::SortedPair => {
                let (source, target) = E::normalize_endpoints(source, target);
                edge.source() == source && edge.target() == target
            }
            EdgeEquality::UnorderedPair => {
                (edge.source() == source && edge.target() == target)
                    || (edge.source() == target && edge.target() == source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_edge() {
        assert!(SEdge::new(1, 1).is_self_edge());
        assert!(!SEdge::new(1, 2).is_self_edge());
    }

    #[test]
    fn other_vertex() {
        let edge = SEdge::new("a", "b");
        assert_eq!(edge.other_vertex(&"a"), &"b");
        assert_eq!(edge.other_vertex(&"b"), &"a");
    }

    #[test]
    fn undirected_edge_is_sorted() {
        let edge = SUndirectedEdge::new(3, 1);
        assert_eq!(edge.source(), &1);
        assert_eq!(edge.target(), &3);
        assert_eq!(edge, SUndirectedEdge::new(1, 3));
    }

    #[test]
    fn equality_policy_selection() {
        assert_eq!(
            EdgeEquality::for_edge::<i32, SUndirectedEdge<i32>>(),
            EdgeEquality::SortedPair
        );
        assert_eq!(
            EdgeEquality::for_edge::<i32, SEdge<i32>>(),
            EdgeEquality::UnorderedPair
        );
    }

    #[test]
    fn equality_policy_matching() {
        let sorted = SUndirectedEdge::new(1, 2);
        assert!(EdgeEquality::SortedPair.matches(&sorted, &2, &1));
        assert!(EdgeEquality::SortedPair.matches(&sorted, &1, &2));

        let plain = SEdge::new(1, 2);
        assert!(EdgeEquality::UnorderedPair.matches(&plain, &2, &1));
        assert!(!EdgeEquality::SortedPair.matches(&plain, &2, &1));
        assert!(!EdgeEquality::UnorderedPair.matches(&plain, &1, &3));
    }

    #[test]
    fn tagged_edges_differ_by_tag() {
        let a = TaggedEdge::new(0, 1, "x");
        let b = TaggedEdge::new(0, 1, "y");
        assert_ne!(a, b);
        assert_eq!(a.tag(), &"x");
    }
}
