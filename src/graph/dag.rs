//! Layered DAG built from side-stream edges.
//!
//! Validates that every edge connects ADJACENT layers according to the
//! declared left-to-right order, then stores the order, the fanout
//! adjacency, and a per-layer set of observed nodes. The graph is built
//! once from a batch of edges and is read-only afterwards; rebuilding is
//! the only supported mutation path.

use std::collections::{BTreeSet, HashMap};

use crate::graph::fanout::FanoutIndex;
use crate::types::{NodeKey, StreamEdge};
use crate::weights::{compute_group_weights, AggregationPolicy, WeightTable};

/// Error type for layered graph construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// The declared order lists the same layer twice.
    #[error("Duplicate layer in declared order: {0}")]
    DuplicateLayer(String),
    /// An edge references a layer missing from the declared order.
    #[error("Unknown layer(s) in edge: {edge}")]
    UnknownLayer {
        /// Rendered offending edge.
        edge: String,
    },
    /// An edge connects layers that are not consecutive in the declared order.
    #[error("Non-adjacent edge {parent_layer}->{child_layer} for declared order {declared:?} (edge: {edge})")]
    NonAdjacentEdge {
        /// Layer of the edge's parent endpoint.
        parent_layer: String,
        /// Layer of the edge's child endpoint.
        child_layer: String,
        /// The declared left-to-right layer order.
        declared: Vec<String>,
        /// Rendered offending edge.
        edge: String,
    },
}

/// Immutable multipartite graph over a declared chain of layers.
#[derive(Debug)]
pub struct LayeredGraph {
    layers: Vec<String>,
    fanout: FanoutIndex,
    nodes_by_layer: HashMap<String, BTreeSet<NodeKey>>,
}

impl LayeredGraph {
    /// Build a layered graph from a declared layer order and a batch of edges.
    ///
    /// Fails if the order contains a duplicate layer, if an edge references
    /// an undeclared layer, or if an edge's child layer is not immediately
    /// to the right of its parent layer.
    pub fn from_edges(
        layers_left_to_right: Vec<String>,
        edges: impl IntoIterator<Item = StreamEdge>,
    ) -> Result<Self, GraphError> {
        // Position index for adjacency checks.
        let mut pos: HashMap<&str, usize> = HashMap::new();
        for (i, layer) in layers_left_to_right.iter().enumerate() {
            if pos.insert(layer.as_str(), i).is_some() {
                return Err(GraphError::DuplicateLayer(layer.clone()));
            }
        }

        let fanout = FanoutIndex::new();
        let mut nodes_by_layer: HashMap<String, BTreeSet<NodeKey>> = HashMap::new();
        let mut num_edges = 0usize;

        for edge in edges {
            let left = pos.get(edge.parent().layer()).copied();
            let right = pos.get(edge.child().layer()).copied();
            let (left, right) = match (left, right) {
                (Some(l), Some(r)) => (l, r),
                _ => {
                    return Err(GraphError::UnknownLayer {
                        edge: edge.to_string(),
                    })
                }
            };
            if right != left + 1 {
                return Err(GraphError::NonAdjacentEdge {
                    parent_layer: edge.parent().layer().to_string(),
                    child_layer: edge.child().layer().to_string(),
                    declared: layers_left_to_right.clone(),
                    edge: edge.to_string(),
                });
            }

            let (parent, child, weight) = edge.into_link();
            nodes_by_layer
                .entry(parent.layer().to_string())
                .or_default()
                .insert(parent.clone());
            nodes_by_layer
                .entry(child.layer().to_string())
                .or_default()
                .insert(child.clone());
            fanout.add_edge(parent, child, weight);
            num_edges += 1;
        }

        tracing::debug!(
            layers = layers_left_to_right.len(),
            edges = num_edges,
            "layered graph built"
        );

        Ok(Self {
            layers: layers_left_to_right,
            fanout,
            nodes_by_layer,
        })
    }

    /// Declared layer order, left to right.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// The fanout adjacency index.
    pub fn fanout(&self) -> &FanoutIndex {
        &self.fanout
    }

    /// Nodes observed at a layer (None for a layer with no edges touching it).
    pub fn nodes_in_layer(&self, layer: &str) -> Option<&BTreeSet<NodeKey>> {
        self.nodes_by_layer.get(layer)
    }

    /// Adjacent (left, right) layer pairs in declared order.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.layers
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Total number of edges recorded.
    pub fn num_edges(&self) -> usize {
        self.fanout.num_edges()
    }

    /// Run the bottom-up weight aggregation pass over this graph in direct
    /// mode (single owner per node).
    pub fn group_weights<P>(
        &self,
        prior: P,
        leaf_bonus: f64,
        policy: &AggregationPolicy,
    ) -> WeightTable
    where
        P: Fn(&NodeKey) -> f64,
    {
        compute_group_weights(&self.layers, &self.fanout, prior, leaf_bonus, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(l: &str, lv: &str, r: &str, rv: &str, w: f64) -> StreamEdge {
        StreamEdge::new(format!("{l}{r}"), l, lv, r, rv, w).unwrap()
    }

    fn layers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builds_adjacency_and_node_sets() {
        let g = LayeredGraph::from_edges(
            layers(&["A", "B", "C"]),
            vec![
                edge("A", "a1", "B", "b1", 1.0),
                edge("B", "b1", "C", "c1", 1.0),
                edge("B", "b1", "C", "c2", 1.0),
            ],
        )
        .unwrap();

        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.nodes_in_layer("C").unwrap().len(), 2);
        let b1 = NodeKey::new("B", "b1").unwrap();
        assert_eq!(g.fanout().children_count(&b1), 2);
        let pairs: Vec<_> = g.adjacent_pairs().collect();
        assert_eq!(pairs, vec![("A", "B"), ("B", "C")]);
    }

    #[test]
    fn test_rejects_duplicate_layer() {
        let err = LayeredGraph::from_edges(layers(&["A", "B", "A"]), vec![]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateLayer("A".to_string()));
    }

    #[test]
    fn test_rejects_unknown_layer() {
        let err = LayeredGraph::from_edges(
            layers(&["A", "B"]),
            vec![edge("A", "a1", "X", "x1", 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::UnknownLayer { .. }));
    }

    #[test]
    fn test_rejects_non_adjacent_edge() {
        // Declared A,B,C but a direct A->C edge.
        let err = LayeredGraph::from_edges(
            layers(&["A", "B", "C"]),
            vec![edge("A", "a1", "C", "c1", 1.0)],
        )
        .unwrap_err();
        match err {
            GraphError::NonAdjacentEdge {
                parent_layer,
                child_layer,
                declared,
                ..
            } => {
                assert_eq!(parent_layer, "A");
                assert_eq!(child_layer, "C");
                assert_eq!(declared, layers(&["A", "B", "C"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_backward_edge() {
        let err = LayeredGraph::from_edges(
            layers(&["A", "B"]),
            vec![edge("B", "b1", "A", "a1", 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::NonAdjacentEdge { .. }));
    }
}
