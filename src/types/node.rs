//! Node identity for the layered graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when encoding composite values. U+001F (unit separator)
/// is vanishingly rare in real key data.
const PART_SEP: char = '\u{1F}';

/// Error type for node identity construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Layer name is empty after trimming.
    #[error("Layer name must be non-empty")]
    EmptyLayer,
    /// Value is empty after trimming.
    #[error("Value must be non-empty for layer '{0}'")]
    EmptyValue(String),
}

/// Canonical identity of a node: a (layer, value) pair.
///
/// The universal key type for every map in the crate. Both fields are
/// trimmed at construction and must be non-empty; equality and hashing
/// depend on both. Implements `Ord` so BTree collections iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    layer: String,
    value: String,
}

impl NodeKey {
    /// Create a node identity from a layer name and a value.
    pub fn new(layer: impl Into<String>, value: impl Into<String>) -> Result<Self, IdentityError> {
        let layer = layer.into().trim().to_string();
        let value = value.into().trim().to_string();
        if layer.is_empty() {
            return Err(IdentityError::EmptyLayer);
        }
        if value.is_empty() {
            return Err(IdentityError::EmptyValue(layer));
        }
        Ok(Self { layer, value })
    }

    /// Build an identity whose value is a composite of several parts.
    ///
    /// Parts are length-prefixed and joined with U+001F, so a delimiter
    /// character occurring inside a part can never produce the same encoded
    /// value as a different split of parts.
    pub fn from_parts(layer: impl Into<String>, parts: &[&str]) -> Result<Self, IdentityError> {
        let mut value = String::with_capacity(parts.len() * 8);
        for (i, part) in parts.iter().enumerate() {
            let part = part.trim();
            value.push_str(&part.len().to_string());
            value.push(':');
            value.push_str(part);
            if i + 1 < parts.len() {
                value.push(PART_SEP);
            }
        }
        Self::new(layer, value)
    }

    /// Layer name this node belongs to.
    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Concrete value at that layer.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer, self.value)
    }
}
