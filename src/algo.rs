//! Algorithm lifecycle and algorithms built on top of the searches.

pub mod base;
pub mod components;
pub mod toposort;

pub use base::{AlgorithmBase, CancelManager, ComputationState, RootedAlgorithm, StateEvents};
pub use components::{connected_components, ConnectedComponents};
pub use toposort::{is_acyclic, topological_sort};
