//! Thread-safe node weight table with direct and partial write modes.
//!
//! Supports the two execution strategies of the bottom-up pass:
//!
//! 1. Finalize-locally (partitioned by parent): the single owner of a node
//!    computes the full weight in one step and calls [`WeightTable::set`]
//!    exactly once.
//! 2. Partial-then-reduce (hot-key salting, not partitioned by parent):
//!    workers fold partial sums with [`WeightTable::accumulate`], a reducer
//!    merges the shard tables with [`WeightTable::merge_from`], and a final
//!    pass adds prior and leaf terms and calls `set` once per node.
//!
//! Per-key updates are atomic; cross-key operations are not transactional.

use dashmap::DashMap;
use std::collections::BTreeMap;

use crate::types::NodeKey;

/// Prebuilt combiners for [`WeightTable::accumulate`] and
/// [`WeightTable::merge_from`].
pub mod combine {
    /// Sum the existing value and the incoming one.
    pub fn sum(existing: f64, incoming: f64) -> f64 {
        existing + incoming
    }

    /// Keep the larger of the two values.
    pub fn max(existing: f64, incoming: f64) -> f64 {
        existing.max(incoming)
    }

    /// Keep the incoming value unconditionally.
    pub fn overwrite(_existing: f64, incoming: f64) -> f64 {
        incoming
    }
}

/// Concurrency-safe mapping from node identity to its group weight W(u).
#[derive(Debug, Default)]
pub struct WeightTable {
    weights: DashMap<NodeKey, f64>,
}

impl WeightTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the final weight for a node, overwriting any previous value.
    pub fn set(&self, key: NodeKey, weight: f64) {
        self.weights.insert(key, weight);
    }

    /// Atomically fold a contribution into the weight for the given node.
    /// Inserts `delta` if the node is new; otherwise combines the existing
    /// value with `delta` via `op` (usually [`combine::sum`]).
    pub fn accumulate(&self, key: NodeKey, delta: f64, op: impl Fn(f64, f64) -> f64) {
        self.weights
            .entry(key)
            .and_modify(|w| *w = op(*w, delta))
            .or_insert(delta);
    }

    /// Read a node's weight. A node absent from the table has weight 0.0;
    /// this silent default is part of the contract, not an error.
    pub fn get(&self, key: &NodeKey) -> f64 {
        self.weights.get(key).map(|w| *w).unwrap_or(0.0)
    }

    /// True if the node has an explicit entry (distinguishes a stored 0.0
    /// from the absent-node default).
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.weights.contains_key(key)
    }

    /// Merge all entries of `other` into this table, combining values under
    /// the same key via `op` (sum, max, or overwrite).
    pub fn merge_from(&self, other: &WeightTable, op: impl Fn(f64, f64) -> f64) {
        for entry in other.weights.iter() {
            self.accumulate(entry.key().clone(), *entry.value(), &op);
        }
    }

    /// Deterministically ordered copy of the table, for iteration and
    /// serialization.
    pub fn snapshot(&self) -> BTreeMap<NodeKey, f64> {
        self.weights
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Number of nodes with an explicit weight.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if no weights have been written.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
