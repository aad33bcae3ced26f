//! Weighted edge records between adjacent layers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::{IdentityError, NodeKey};

/// Error type for edge construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EdgeError {
    /// One of the edge's endpoints is not a valid identity.
    #[error("Invalid edge endpoint: {0}")]
    Identity(#[from] IdentityError),
    /// Edge weight is non-finite or negative.
    #[error("Edge weight must be finite and >= 0, got {0}")]
    InvalidWeight(f64),
}

/// One directed edge between two adjacent layers of the join graph.
///
/// Edges arrive from independent side-streams describing parent->child
/// relationships between consecutive join keys. Each carries a logical
/// stream label (e.g. "AB"), the two endpoint identities, and a
/// non-negative finite weight (`1.0` for uniform edges, or a tuple
/// weight/selectivity when available).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEdge {
    stream: String,
    parent: NodeKey,
    child: NodeKey,
    weight: f64,
}

impl StreamEdge {
    /// Create an edge from the flat record form
    /// (stream label, left layer, left value, right layer, right value, weight).
    pub fn new(
        stream: impl Into<String>,
        left_layer: &str,
        left_value: &str,
        right_layer: &str,
        right_value: &str,
        weight: f64,
    ) -> Result<Self, EdgeError> {
        let parent = NodeKey::new(left_layer, left_value)?;
        let child = NodeKey::new(right_layer, right_value)?;
        Self::from_keys(stream, parent, child, weight)
    }

    /// Create an edge from endpoint identities, deriving the stream label by
    /// concatenating the two layer names (e.g. "B" + "C" -> "BC").
    pub fn between(parent: NodeKey, child: NodeKey, weight: f64) -> Result<Self, EdgeError> {
        let stream = format!("{}{}", parent.layer(), child.layer());
        Self::from_keys(stream, parent, child, weight)
    }

    /// Create an edge from endpoint identities under an explicit stream label.
    pub fn from_keys(
        stream: impl Into<String>,
        parent: NodeKey,
        child: NodeKey,
        weight: f64,
    ) -> Result<Self, EdgeError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EdgeError::InvalidWeight(weight));
        }
        Ok(Self {
            stream: stream.into(),
            parent,
            child,
            weight,
        })
    }

    /// Logical stream/relation label.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Source endpoint (left layer).
    pub fn parent(&self) -> &NodeKey {
        &self.parent
    }

    /// Destination endpoint (right layer).
    pub fn child(&self) -> &NodeKey {
        &self.child
    }

    /// Edge weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Decompose into (parent, child, weight), dropping the stream label.
    pub fn into_link(self) -> (NodeKey, NodeKey, f64) {
        (self.parent, self.child, self.weight)
    }
}

impl fmt::Display for StreamEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{} -> {}, w={}]",
            self.stream, self.parent, self.child, self.weight
        )
    }
}
