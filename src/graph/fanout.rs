//! Concurrency-safe fanout index: parent -> children with edge weights.
//!
//! This is the adjacency structure both the weight aggregation pass and the
//! CPT builder consume. Insertion is safe from multiple concurrent
//! producers; per-key updates are atomic, cross-key operations are not
//! transactional. Entries are never removed.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::types::NodeKey;

/// A child link: the child node plus the stored edge weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildLink {
    /// Destination node.
    pub child: NodeKey,
    /// Weight of the edge leading to it.
    pub edge_weight: f64,
}

impl ChildLink {
    /// Create a child link.
    pub fn new(child: NodeKey, edge_weight: f64) -> Self {
        Self { child, edge_weight }
    }
}

/// Thread-safe mapping from a parent node to its list of outgoing edges.
#[derive(Debug, Default)]
pub struct FanoutIndex {
    fanout: DashMap<NodeKey, Vec<ChildLink>>,
}

impl FanoutIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge parent -> child. Appends to the parent's row,
    /// creating the row if needed. Safe to call from many writers.
    pub fn add_edge(&self, parent: NodeKey, child: NodeKey, edge_weight: f64) {
        self.fanout
            .entry(parent)
            .or_default()
            .push(ChildLink::new(child, edge_weight));
    }

    /// All children of a parent, in insertion order (empty if none).
    pub fn children(&self, parent: &NodeKey) -> Vec<ChildLink> {
        self.fanout
            .get(parent)
            .map(|row| row.value().clone())
            .unwrap_or_default()
    }

    /// Number of outgoing edges from a parent, without cloning the row.
    pub fn children_count(&self, parent: &NodeKey) -> usize {
        self.fanout.get(parent).map(|row| row.len()).unwrap_or(0)
    }

    /// Visit every (parent, children) row. Iteration order is unspecified;
    /// callers needing determinism should sort what they collect.
    pub fn for_each_parent<F>(&self, mut f: F)
    where
        F: FnMut(&NodeKey, &[ChildLink]),
    {
        for entry in self.fanout.iter() {
            f(entry.key(), entry.value());
        }
    }

    /// Every node observed by this index (parents and children), grouped by
    /// layer. BTreeSets give deterministic per-layer iteration.
    pub fn nodes_by_layer(&self) -> HashMap<String, BTreeSet<NodeKey>> {
        let mut out: HashMap<String, BTreeSet<NodeKey>> = HashMap::new();
        for entry in self.fanout.iter() {
            out.entry(entry.key().layer().to_string())
                .or_default()
                .insert(entry.key().clone());
            for link in entry.value() {
                out.entry(link.child.layer().to_string())
                    .or_default()
                    .insert(link.child.clone());
            }
        }
        out
    }

    /// Union-merge: replay every edge of `other` into this index.
    pub fn merge_from(&self, other: &FanoutIndex) {
        other.for_each_parent(|parent, links| {
            for link in links {
                self.add_edge(parent.clone(), link.child.clone(), link.edge_weight);
            }
        });
    }

    /// Number of distinct parents.
    pub fn num_parents(&self) -> usize {
        self.fanout.len()
    }

    /// Total number of stored edges.
    pub fn num_edges(&self) -> usize {
        self.fanout.iter().map(|entry| entry.value().len()).sum()
    }

    /// True if no edges have been recorded.
    pub fn is_empty(&self) -> bool {
        self.fanout.is_empty()
    }
}
