//! Registry of CPTs for every adjacent pair in the chain.

use std::collections::HashMap;

use super::table::Cpt;

/// Named collection of CPTs, one per adjacent layer pair ("AB", "BC", ...).
///
/// Enumeration preserves first-insertion order; re-registering a label
/// replaces the table without moving its position. This is the sole
/// interface a downstream sampler uses to chain row samples across layer
/// pairs.
#[derive(Debug, Default)]
pub struct BayesNet {
    order: Vec<String>,
    by_stream: HashMap<String, Cpt>,
}

impl BayesNet {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a CPT under its stream label, replacing any previous table
    /// for that label.
    pub fn put(&mut self, cpt: Cpt) {
        let label = cpt.stream().to_string();
        if !self.by_stream.contains_key(&label) {
            self.order.push(label.clone());
        }
        self.by_stream.insert(label, cpt);
    }

    /// Look up the CPT for a stream label ("BC"), if registered.
    pub fn get(&self, stream: &str) -> Option<&Cpt> {
        self.by_stream.get(stream)
    }

    /// All CPTs in insertion order.
    pub fn cpts(&self) -> impl Iterator<Item = &Cpt> {
        self.order
            .iter()
            .filter_map(move |label| self.by_stream.get(label))
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.by_stream.len()
    }

    /// True if no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.by_stream.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut net = BayesNet::new();
        net.put(Cpt::new("AB", "A", "B"));
        net.put(Cpt::new("BC", "B", "C"));
        net.put(Cpt::new("CD", "C", "D"));

        let labels: Vec<&str> = net.cpts().map(|c| c.stream()).collect();
        assert_eq!(labels, vec!["AB", "BC", "CD"]);
    }

    #[test]
    fn test_put_replaces_in_place() {
        let mut net = BayesNet::new();
        net.put(Cpt::new("AB", "A", "B"));
        net.put(Cpt::new("BC", "B", "C"));

        let replacement = Cpt::new("AB", "A", "B");
        replacement.add(
            crate::types::NodeKey::new("A", "a1").unwrap(),
            crate::types::NodeKey::new("B", "b1").unwrap(),
            1.0,
        );
        net.put(replacement);

        assert_eq!(net.len(), 2);
        let labels: Vec<&str> = net.cpts().map(|c| c.stream()).collect();
        assert_eq!(labels, vec!["AB", "BC"]);
        assert_eq!(net.get("AB").unwrap().num_rows(), 1);
    }

    #[test]
    fn test_get_absent_is_none() {
        let net = BayesNet::new();
        assert!(net.get("XY").is_none());
        assert!(net.is_empty());
    }
}
