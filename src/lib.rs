//! # layered-bayes
//!
//! Statistical core for join sampling over a chain of layers.
//!
//! Given weighted directed edges between adjacent layers of a multipartite
//! graph, the crate computes:
//!
//! 1. a bottom-up scalar **group weight** per node, and
//! 2. per-layer-pair **conditional probability tables** (CPTs) supporting
//!    normalized lookup and weighted sampling.
//!
//! ## Pipeline
//!
//! ```text
//! StreamEdge batch → LayeredGraph (validates adjacency, builds FanoutIndex)
//!                  → compute_group_weights (+ priors, leaf bonus) → WeightTable
//!                  → build_bayes_net → BayesNet { "AB" → Cpt, "BC" → Cpt, … }
//! ```
//!
//! The model is build-once, query-many: construction errors surface
//! immediately and synchronously; query paths never fail, they return empty
//! rows or `None` instead.
//!
//! ## Concurrency contract
//!
//! `FanoutIndex`, `WeightTable`, and `Cpt` rows accept concurrent writers
//! with per-key atomic insert-or-combine semantics; cross-key operations
//! are not transactional. The weight pass requires all writes for layer
//! i+1 to be visible before layer i reads them — that barrier belongs to
//! the caller, not the engine.
//!
//! ## Example
//!
//! ```
//! use layered_bayes::{build_bayes_net, prior_from_map, AggregationPolicy,
//!                     LayeredGraph, NodeKey, StreamEdge};
//! use std::collections::HashMap;
//!
//! let layers = vec!["B".to_string(), "C".to_string()];
//! let edges = vec![
//!     StreamEdge::new("BC", "B", "b1", "C", "c1", 1.0).unwrap(),
//!     StreamEdge::new("BC", "B", "b1", "C", "c2", 1.0).unwrap(),
//! ];
//! let graph = LayeredGraph::from_edges(layers, edges).unwrap();
//!
//! let priors = HashMap::from([
//!     (NodeKey::new("C", "c1").unwrap(), 3.0),
//!     (NodeKey::new("C", "c2").unwrap(), 1.0),
//! ]);
//! let weights = graph.group_weights(
//!     prior_from_map(&priors), 1.0, &AggregationPolicy::SUM_CHILDREN);
//!
//! let net = build_bayes_net(graph.layers(), graph.fanout(), &weights);
//! let row = net.get("BC").unwrap()
//!     .row_probabilities(&NodeKey::new("B", "b1").unwrap());
//! assert_eq!(row[0].1, 2.0 / 3.0); // W(c1)=4, W(c2)=2
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cpt;
pub mod graph;
pub mod types;
pub mod weights;

// Re-exports
pub use cpt::{build_bayes_net, BayesNet, Cpt, CptEntry};
pub use graph::{ChildLink, FanoutIndex, GraphError, LayeredGraph};
pub use types::{EdgeError, IdentityError, NodeKey, StreamEdge};
pub use weights::{
    accumulate_layer_partials, combine, compute_group_weights, finalize_layer, prior_from_map,
    AggregationPolicy, WeightTable,
};
