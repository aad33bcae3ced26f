//! Builds the CPT registry from the fanout index and computed group weights.

use crate::graph::FanoutIndex;
use crate::weights::WeightTable;

use super::registry::BayesNet;
use super::table::Cpt;

/// Assemble one CPT per adjacent pair in `layers_left_to_right`.
///
/// For every pair (left, right) the builder scans the fanout index once,
/// keeps only edges from a `left`-layer parent to a `right`-layer child
/// (the index may hold edges for other pairs in the same structure), and
/// inserts `numerator = edge_weight * W(child)` for each. Entries with a
/// non-positive numerator are dropped by the table itself.
///
/// `weights` must be fully finalized before this runs; no weight writes are
/// permitted while tables are being built.
pub fn build_bayes_net(
    layers_left_to_right: &[String],
    fanout: &FanoutIndex,
    weights: &WeightTable,
) -> BayesNet {
    let mut net = BayesNet::new();

    for pair in layers_left_to_right.windows(2) {
        let (left, right) = (pair[0].as_str(), pair[1].as_str());
        let cpt = Cpt::new(format!("{left}{right}"), left, right);

        fanout.for_each_parent(|parent, links| {
            if parent.layer() != left {
                return;
            }
            for link in links {
                if link.child.layer() != right {
                    continue;
                }
                let numerator = link.edge_weight * weights.get(&link.child);
                cpt.add(parent.clone(), link.child.clone(), numerator);
            }
        });

        tracing::debug!(stream = %cpt.stream(), rows = cpt.num_rows(), "built CPT");
        net.put(cpt);
    }

    net
}
