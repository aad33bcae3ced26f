//! Core types for the layered graph.

pub mod edge;
pub mod node;

pub use edge::{EdgeError, StreamEdge};
pub use node::{IdentityError, NodeKey};
