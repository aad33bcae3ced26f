//! Bottom-up weight aggregation: the weight table and the layer pass.

pub mod aggregate;
pub mod table;

pub use aggregate::{
    accumulate_layer_partials, compute_group_weights, finalize_layer, prior_from_map,
    AggregationPolicy,
};
pub use table::{combine, WeightTable};
