use super::{
    borrow::OwnableRef,
    edge::{Edge, EdgeEquality, VertexType},
    error::Error,
};

/// Types shared by every graph representation.
pub trait GraphBase {
    type Vertex: VertexType;
    type Edge: Edge<Self::Vertex>;

    fn is_directed(&self) -> bool;

    fn allows_parallel_edges(&self) -> bool;
}

/// A graph that can only answer whether a vertex exists, possibly by probing.
pub trait ImplicitVertexSet: GraphBase {
    fn contains_vertex(&self, vertex: &Self::Vertex) -> bool;
}

/// A graph with an enumerable set of vertices.
///
/// The enumeration order is stable between calls as long as the graph is not
/// mutated. Searches rely on it when they process all components.
pub trait VertexSet: ImplicitVertexSet {
    type VerticesIter<'a>: Iterator<Item = &'a Self::Vertex>
    where
        Self: 'a;

    fn vertices(&self) -> Self::VerticesIter<'_>;

    fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    fn is_vertices_empty(&self) -> bool {
        self.vertices().next().is_none()
    }
}

/// A graph with an enumerable set of edges.
pub trait EdgeSet: GraphBase {
    type EdgesIter<'a>: Iterator<Item = OwnableRef<'a, Self::Edge>>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgesIter<'_>;

    fn edge_count(&self) -> usize {
        self.edges().count()
    }

    fn is_edges_empty(&self) -> bool {
        self.edges().next().is_none()
    }

    fn contains_edge(&self, edge: &Self::Edge) -> bool {
        self.edges().any(|e| &*e == edge)
    }
}

/// A graph that can enumerate the out-edges of a vertex, without the need of
/// knowing all vertices upfront.
pub trait ImplicitGraph: GraphBase {
    type OutEdgesIter<'a>: Iterator<Item = OwnableRef<'a, Self::Edge>>
    where
        Self: 'a;

    /// Returns the out-edges of the vertex or `None` if the vertex is not in
    /// the graph.
    fn try_out_edges(&self, vertex: &Self::Vertex) -> Option<Self::OutEdgesIter<'_>>;

    fn out_edges(&self, vertex: &Self::Vertex) -> Result<Self::OutEdgesIter<'_>, Error> {
        self.try_out_edges(vertex).ok_or(Error::VertexNotFound)
    }

    fn out_degree(&self, vertex: &Self::Vertex) -> Result<usize, Error> {
        Ok(self.out_edges(vertex)?.count())
    }

    fn is_out_edges_empty(&self, vertex: &Self::Vertex) -> Result<bool, Error> {
        Ok(self.out_edges(vertex)?.next().is_none())
    }

    /// Returns the `index`-th out-edge of the vertex, if both exist.
    fn try_out_edge(
        &self,
        vertex: &Self::Vertex,
        index: usize,
    ) -> Option<OwnableRef<'_, Self::Edge>> {
        self.try_out_edges(vertex)?.nth(index)
    }
}

/// Directed lookups of edges between a pair of vertices.
pub trait IncidenceGraph: ImplicitGraph {
    fn contains_edge_between(&self, source: &Self::Vertex, target: &Self::Vertex) -> bool {
        self.try_get_edge(source, target).is_some()
    }

    /// Returns any edge going from `source` to `target`.
    fn try_get_edge(
        &self,
        source: &Self::Vertex,
        target: &Self::Vertex,
    ) -> Option<OwnableRef<'_, Self::Edge>> {
        self.try_out_edges(source)?.find(|e| e.target() == target)
    }

    /// Returns all (parallel) edges going from `source` to `target`, or `None`
    /// if `source` is not in the graph.
    fn try_get_edges(
        &self,
        source: &Self::Vertex,
        target: &Self::Vertex,
    ) -> Option<Vec<Self::Edge>> {
        Some(
            self.try_out_edges(source)?
                .filter(|e| e.target() == target)
                .map(OwnableRef::into_owned)
                .collect(),
        )
    }
}

/// A directed graph that also knows the in-edges of its vertices.
pub trait BidirectionalIncidenceGraph: IncidenceGraph {
    type InEdgesIter<'a>: Iterator<Item = OwnableRef<'a, Self::Edge>>
    where
        Self: 'a;

    fn try_in_edges(&self, vertex: &Self::Vertex) -> Option<Self::InEdgesIter<'_>>;

    fn in_edges(&self, vertex: &Self::Vertex) -> Result<Self::InEdgesIter<'_>, Error> {
        self.try_in_edges(vertex).ok_or(Error::VertexNotFound)
    }

    fn in_degree(&self, vertex: &Self::Vertex) -> Result<usize, Error> {
        Ok(self.in_edges(vertex)?.count())
    }

    fn is_in_edges_empty(&self, vertex: &Self::Vertex) -> Result<bool, Error> {
        Ok(self.in_edges(vertex)?.next().is_none())
    }

    fn try_in_edge(
        &self,
        vertex: &Self::Vertex,
        index: usize,
    ) -> Option<OwnableRef<'_, Self::Edge>> {
        self.try_in_edges(vertex)?.nth(index)
    }

    /// Sum of in and out degree. A self-edge contributes to both.
    fn degree(&self, vertex: &Self::Vertex) -> Result<usize, Error> {
        Ok(self.out_degree(vertex)? + self.in_degree(vertex)?)
    }
}

/// A graph whose edges are interpreted symmetrically.
pub trait ImplicitUndirectedGraph: GraphBase {
    type AdjacentEdgesIter<'a>: Iterator<Item = OwnableRef<'a, Self::Edge>>
    where
        Self: 'a;

    /// Returns the edges incident to the vertex or `None` if the vertex is not
    /// in the graph. A self-edge is yielded once.
    fn try_adjacent_edges(&self, vertex: &Self::Vertex) -> Option<Self::AdjacentEdgesIter<'_>>;

    /// The policy used by [`contains_edge_between`] and [`try_get_edge`].
    ///
    /// [`contains_edge_between`]: ImplicitUndirectedGraph::contains_edge_between
    /// [`try_get_edge`]: ImplicitUndirectedGraph::try_get_edge
    fn edge_equality(&self) -> EdgeEquality;

    fn adjacent_edges(&self, vertex: &Self::Vertex) -> Result<Self::AdjacentEdgesIter<'_>, Error> {
        self.try_adjacent_edges(vertex).ok_or(Error::VertexNotFound)
    }

    /// Number of edge endpoints at the vertex. Self-edges count twice.
    fn adjacent_degree(&self, vertex: &Self::Vertex) -> Result<usize, Error> {
        Ok(self
            .adjacent_edges(vertex)?
            .map(|edge| if edge.is_self_edge() { 2 } else { 1 })
            .sum())
    }

    fn is_adjacent_edges_empty(&self, vertex: &Self::Vertex) -> Result<bool, Error> {
        Ok(self.adjacent_edges(vertex)?.next().is_none())
    }

    fn try_adjacent_edge(
        &self,
        vertex: &Self::Vertex,
        index: usize,
    ) -> Option<OwnableRef<'_, Self::Edge>> {
        self.try_adjacent_edges(vertex)?.nth(index)
    }

    fn contains_edge_between(&self, source: &Self::Vertex, target: &Self::Vertex) -> bool {
        self.try_get_edge(source, target).is_some()
    }

    fn try_get_edge(
        &self,
        source: &Self::Vertex,
        target: &Self::Vertex,
    ) -> Option<OwnableRef<'_, Self::Edge>> {
        let equality = self.edge_equality();
        self.try_adjacent_edges(source)?
            .find(|edge| equality.matches(&**edge, source, target))
    }
}

/// A directed graph with enumerable vertices and edges.
pub trait VertexAndEdgeListGraph: IncidenceGraph + VertexSet + EdgeSet {}

impl<G> VertexAndEdgeListGraph for G where G: IncidenceGraph + VertexSet + EdgeSet {}

/// An undirected graph with enumerable vertices and edges.
pub trait UndirectedListGraph: ImplicitUndirectedGraph + VertexSet + EdgeSet {}

impl<G> UndirectedListGraph for G where G: ImplicitUndirectedGraph + VertexSet + EdgeSet {}
