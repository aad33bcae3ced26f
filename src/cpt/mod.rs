//! Conditional probability tables and the per-pair model registry.

pub mod builder;
pub mod registry;
pub mod table;

pub use builder::build_bayes_net;
pub use registry::BayesNet;
pub use table::{Cpt, CptEntry};
