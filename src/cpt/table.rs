//! Conditional probability table for one adjacent layer pair.
//!
//! For each left-layer node x the table stores a row of (right node y,
//! numerator) where `numerator(x->y) = edge_weight(x,y) * W(y)`, plus the
//! row's running total. Rows stay raw and appendable during construction;
//! probabilities are normalized per row at read time and never cached, so
//! appending a numerator never forces re-normalizing the rest of the row.

use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::NodeKey;

/// One row entry: a child node and its raw (unnormalized) numerator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CptEntry {
    /// Right-layer node.
    pub child: NodeKey,
    /// Raw numerator, `edge_weight * W(child)`.
    pub numerator: f64,
}

/// Conditional probability table for one adjacent pair (e.g. B->C).
#[derive(Debug)]
pub struct Cpt {
    stream: String,
    left_layer: String,
    right_layer: String,
    rows: DashMap<NodeKey, Vec<CptEntry>>,
    totals: DashMap<NodeKey, f64>,
}

impl Cpt {
    /// Create an empty table for the pair `left_layer -> right_layer`,
    /// registered under the joined `stream` label (e.g. "BC").
    pub fn new(
        stream: impl Into<String>,
        left_layer: impl Into<String>,
        right_layer: impl Into<String>,
    ) -> Self {
        Self {
            stream: stream.into(),
            left_layer: left_layer.into(),
            right_layer: right_layer.into(),
            rows: DashMap::new(),
            totals: DashMap::new(),
        }
    }

    /// Append (child, numerator) to the parent's row and fold the numerator
    /// into the row total. Non-positive numerators are silently dropped and
    /// never appear in a row. Safe from concurrent writers; per-key updates
    /// are atomic.
    pub fn add(&self, parent: NodeKey, child: NodeKey, numerator: f64) {
        if !(numerator > 0.0) {
            return;
        }
        self.rows
            .entry(parent.clone())
            .or_default()
            .push(CptEntry { child, numerator });
        self.totals
            .entry(parent)
            .and_modify(|t| *t += numerator)
            .or_insert(numerator);
    }

    /// Normalized probabilities for a parent's row, in entry insertion
    /// order. A row with total <= 0 (including an absent row) yields an
    /// empty vec: "no informative distribution for this parent" is not an
    /// error. Division happens here, at query time.
    pub fn row_probabilities(&self, parent: &NodeKey) -> Vec<(NodeKey, f64)> {
        let total = self.row_total(parent);
        if !(total > 0.0) {
            return Vec::new();
        }
        self.rows
            .get(parent)
            .map(|row| {
                row.iter()
                    .map(|e| (e.child.clone(), e.numerator / total))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Draw a child y ~ P(y | parent) by weight. Returns `None` when the
    /// row is absent or its total is not positive.
    ///
    /// Walks the row accumulating numerators against a uniform draw in
    /// `[0, total)`; if floating-point rounding leaves the cumulative sum
    /// short after the full scan, the last entry is returned rather than
    /// failing.
    pub fn sample<R: Rng>(&self, parent: &NodeKey, rng: &mut R) -> Option<NodeKey> {
        let total = self.row_total(parent);
        if !(total > 0.0) {
            return None;
        }
        let row = self.rows.get(parent)?;
        let draw = rng.random_range(0.0..total);
        let mut acc = 0.0;
        for entry in row.iter() {
            acc += entry.numerator;
            if draw < acc {
                return Some(entry.child.clone());
            }
        }
        row.last().map(|e| e.child.clone())
    }

    /// Sum of numerators stored for a parent (0.0 for an absent row).
    pub fn row_total(&self, parent: &NodeKey) -> f64 {
        self.totals.get(parent).map(|t| *t).unwrap_or(0.0)
    }

    /// Number of parents with at least one stored entry.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Joined stream label this table is registered under.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Left (parent) layer name.
    pub fn left_layer(&self) -> &str {
        &self.left_layer
    }

    /// Right (child) layer name.
    pub fn right_layer(&self) -> &str {
        &self.right_layer
    }
}
