pub mod graph;
pub mod propagation;

pub use graph::{downstream_neighbors, owners_of, upstream_neighbors, CHAIN_EDGES, ID_OWNERS};
pub use propagation::{
    compute_propagation_order, compute_propagation_order_with, PropagationOptions,
};
