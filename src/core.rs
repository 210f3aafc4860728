//! Core vocabulary of the library: vertex and edge types, graph capability
//! traits, visitation colors and errors.

pub mod borrow;
pub mod color;
pub mod edge;
pub mod error;
pub mod graph;
pub mod marker;

pub use borrow::OwnableRef;
pub use color::{Color, ColorMap, DenseColorMap};
pub use edge::{Edge, EdgeEquality, SEdge, SUndirectedEdge, TaggedEdge, VertexType};
pub use error::Error;
pub use graph::*;
pub use marker::Direction;
