//! Bottom-up computation of group weights.
//!
//! For every node u:
//!
//! ```text
//! W(u) = prior(u) + fold(contribution(edge, W(child)) for edge in fanout(u))
//!        + leaf_bonus if fanout(u) is empty
//! ```
//!
//! The pass runs right-to-left over the declared layer order, so a node's
//! weight only ever reads children weights that are already finalized.
//! That ordering is the correctness-critical invariant. The engine does not
//! enforce a barrier between layers itself; single-threaded right-to-left
//! iteration, or a synchronization point between layer-parallel phases, is
//! a contract on the caller.

use std::collections::HashMap;

use crate::graph::{ChildLink, FanoutIndex};
use crate::types::NodeKey;
use crate::weights::table::{combine, WeightTable};

fn child_weight(_link: &ChildLink, child_weight: f64) -> f64 {
    child_weight
}

/// How a parent combines its children's contributions, expressed as a pair
/// of plain function values rather than a trait object.
///
/// `contribution` maps one outgoing edge plus the child's already-computed
/// weight to a term; `accumulate` folds terms into a running total that
/// starts at 0.0.
#[derive(Debug, Clone, Copy)]
pub struct AggregationPolicy {
    /// Term contributed by one edge, given the child's finalized weight.
    pub contribution: fn(&ChildLink, f64) -> f64,
    /// Fold of the running total with the next term.
    pub accumulate: fn(f64, f64) -> f64,
}

impl AggregationPolicy {
    /// Default policy: each child contributes its own weight, terms are
    /// summed, edge weights are ignored.
    pub const SUM_CHILDREN: Self = Self {
        contribution: child_weight,
        accumulate: combine::sum,
    };
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self::SUM_CHILDREN
    }
}

/// Adapt a map of priors into a prior function. Nodes absent from the map
/// get 0.0.
pub fn prior_from_map(priors: &HashMap<NodeKey, f64>) -> impl Fn(&NodeKey) -> f64 + '_ {
    move |key| priors.get(key).copied().unwrap_or(0.0)
}

/// Direct-mode bottom-up pass: a single owner per node computes the full
/// weight in one step and finalizes it with one write.
///
/// Layers are given left-to-right (the same order the graph declares) and
/// processed in reverse. Nodes per layer are derived from the fanout
/// index's parent and child sets; a node with no outgoing edges receives
/// `leaf_bonus` on top of its prior.
pub fn compute_group_weights<P>(
    layers_left_to_right: &[String],
    fanout: &FanoutIndex,
    prior: P,
    leaf_bonus: f64,
    policy: &AggregationPolicy,
) -> WeightTable
where
    P: Fn(&NodeKey) -> f64,
{
    let table = WeightTable::new();
    let nodes_by_layer = fanout.nodes_by_layer();

    for layer in layers_left_to_right.iter().rev() {
        let Some(nodes) = nodes_by_layer.get(layer) else {
            continue;
        };
        tracing::trace!(layer = %layer, nodes = nodes.len(), "aggregating layer");
        for u in nodes {
            let fan = fanout.children(u);
            let mut total = 0.0;
            for link in &fan {
                let term = (policy.contribution)(link, table.get(&link.child));
                total = (policy.accumulate)(total, term);
            }
            let leaf = if fan.is_empty() { leaf_bonus } else { 0.0 };
            table.set(u.clone(), prior(u) + total + leaf);
        }
    }
    table
}

/// Partial-mode worker step: fold contributions for every parent at `layer`
/// visible in this worker's fanout `shard` into its `partials` table.
///
/// `finalized` must already hold the weights of the layer to the right;
/// contributions are accumulated with the policy's own fold so that partial
/// tables from any number of workers can later be reduced with the same
/// commutative combiner. This path exists for high-fan-in parents whose
/// children are sharded across workers instead of serialized through one
/// owner.
pub fn accumulate_layer_partials(
    layer: &str,
    shard: &FanoutIndex,
    finalized: &WeightTable,
    partials: &WeightTable,
    policy: &AggregationPolicy,
) {
    shard.for_each_parent(|parent, links| {
        if parent.layer() != layer {
            return;
        }
        let mut total = 0.0;
        for link in links {
            let term = (policy.contribution)(link, finalized.get(&link.child));
            total = (policy.accumulate)(total, term);
        }
        partials.accumulate(parent.clone(), total, policy.accumulate);
    });
}

/// Partial-mode finalization: after all shard tables have been reduced into
/// `partials` (via [`WeightTable::merge_from`]), add prior and leaf terms
/// and perform the single finalizing write per node.
///
/// The leaf test runs against the *global* fanout; a node can look childless
/// in every individual shard while having children overall.
pub fn finalize_layer<'a, P>(
    nodes: impl IntoIterator<Item = &'a NodeKey>,
    fanout: &FanoutIndex,
    partials: &WeightTable,
    prior: P,
    leaf_bonus: f64,
    finalized: &WeightTable,
) where
    P: Fn(&NodeKey) -> f64,
{
    for u in nodes {
        let leaf = if fanout.children_count(u) == 0 {
            leaf_bonus
        } else {
            0.0
        };
        finalized.set(u.clone(), prior(u) + partials.get(u) + leaf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(layer: &str, value: &str) -> NodeKey {
        NodeKey::new(layer, value).unwrap()
    }

    fn layers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Two-layer chain: a1 -> {b1, b2}, priors b1=3, b2=5, leaf bonus 1.
    fn small_fanout() -> FanoutIndex {
        let fanout = FanoutIndex::new();
        fanout.add_edge(key("A", "a1"), key("B", "b1"), 1.0);
        fanout.add_edge(key("A", "a1"), key("B", "b2"), 1.0);
        fanout
    }

    fn small_priors() -> HashMap<NodeKey, f64> {
        HashMap::from([
            (key("A", "a1"), 1.0),
            (key("B", "b1"), 3.0),
            (key("B", "b2"), 5.0),
        ])
    }

    #[test]
    fn test_leaf_gets_prior_plus_bonus() {
        let fanout = small_fanout();
        let priors = small_priors();
        let w = compute_group_weights(
            &layers(&["A", "B"]),
            &fanout,
            prior_from_map(&priors),
            1.0,
            &AggregationPolicy::SUM_CHILDREN,
        );
        assert_eq!(w.get(&key("B", "b1")), 4.0);
        assert_eq!(w.get(&key("B", "b2")), 6.0);
    }

    #[test]
    fn test_parent_sums_children_under_default_policy() {
        let fanout = small_fanout();
        let priors = small_priors();
        let w = compute_group_weights(
            &layers(&["A", "B"]),
            &fanout,
            prior_from_map(&priors),
            1.0,
            &AggregationPolicy::SUM_CHILDREN,
        );
        // W(a1) = prior 1 + W(b1) 4 + W(b2) 6
        assert_eq!(w.get(&key("A", "a1")), 11.0);
    }

    #[test]
    fn test_missing_prior_defaults_to_zero() {
        let fanout = small_fanout();
        let w = compute_group_weights(
            &layers(&["A", "B"]),
            &fanout,
            |_| 0.0,
            0.0,
            &AggregationPolicy::SUM_CHILDREN,
        );
        assert_eq!(w.get(&key("B", "b1")), 0.0);
        assert_eq!(w.get(&key("A", "a1")), 0.0);
    }

    #[test]
    fn test_custom_policy_uses_edge_weight() {
        let fanout = FanoutIndex::new();
        fanout.add_edge(key("A", "a1"), key("B", "b1"), 2.0);
        fanout.add_edge(key("A", "a1"), key("B", "b2"), 3.0);

        let weighted = AggregationPolicy {
            contribution: |link, w| link.edge_weight * w,
            accumulate: combine::sum,
        };
        let priors = HashMap::from([(key("B", "b1"), 10.0), (key("B", "b2"), 100.0)]);
        let w = compute_group_weights(
            &layers(&["A", "B"]),
            &fanout,
            prior_from_map(&priors),
            0.0,
            &weighted,
        );
        // 2*10 + 3*100
        assert_eq!(w.get(&key("A", "a1")), 320.0);
    }

    #[test]
    fn test_partial_reduce_matches_direct_mode() {
        let fanout = small_fanout();
        let priors = small_priors();
        let policy = AggregationPolicy::SUM_CHILDREN;
        let order = layers(&["A", "B"]);

        let direct = compute_group_weights(
            &order,
            &fanout,
            prior_from_map(&priors),
            1.0,
            &policy,
        );

        // Shard a1's children across two workers.
        let shard1 = FanoutIndex::new();
        shard1.add_edge(key("A", "a1"), key("B", "b1"), 1.0);
        let shard2 = FanoutIndex::new();
        shard2.add_edge(key("A", "a1"), key("B", "b2"), 1.0);

        let finalized = WeightTable::new();
        let nodes_by_layer = fanout.nodes_by_layer();

        // Layer B first: leaves, no partials needed.
        finalize_layer(
            nodes_by_layer["B"].iter(),
            &fanout,
            &WeightTable::new(),
            prior_from_map(&priors),
            1.0,
            &finalized,
        );

        // Layer A: per-worker partials, reduce, then finalize.
        let p1 = WeightTable::new();
        let p2 = WeightTable::new();
        accumulate_layer_partials("A", &shard1, &finalized, &p1, &policy);
        accumulate_layer_partials("A", &shard2, &finalized, &p2, &policy);

        let reduced = WeightTable::new();
        reduced.merge_from(&p1, combine::sum);
        reduced.merge_from(&p2, combine::sum);

        finalize_layer(
            nodes_by_layer["A"].iter(),
            &fanout,
            &reduced,
            prior_from_map(&priors),
            1.0,
            &finalized,
        );

        assert_eq!(direct.snapshot(), finalized.snapshot());
    }
}
