use thiserror::Error;

/// Failures reported by graph lookups, the traversal engine and the
/// algorithms built on top of it.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation referred to a vertex that is not part of the graph.
    #[error("vertex does not exist in the graph")]
    VertexNotFound,
    /// The algorithm can only start from a root vertex, but none was set.
    #[error("root vertex is required but not set")]
    MissingRootVertex,
    /// The computation was cancelled through its cancel manager.
    #[error("computation was aborted")]
    Aborted,
    /// An algorithm that requires an acyclic graph found a cycle.
    #[error("graph contains a cycle")]
    NonAcyclicGraph,
}
