//! Layered graph construction and the fanout adjacency index.

pub mod dag;
pub mod fanout;

pub use dag::{GraphError, LayeredGraph};
pub use fanout::{ChildLink, FanoutIndex};
