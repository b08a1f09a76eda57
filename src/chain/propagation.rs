//! Propagation planning: which documents must be revisited after a change,
//! and in what order.

use super::graph::CHAIN_EDGES;
use crate::models::{DocType, PropagationStep, StepDirection};
use std::collections::{HashSet, VecDeque};

/// Optional limits on the planned traversal.
#[derive(Debug, Clone, Default)]
pub struct PropagationOptions {
    /// Maximum hops from the origin; `None` traverses the full chain.
    pub max_depth: Option<usize>,
    /// Document types to leave out of the resulting steps.
    pub skip_docs: Vec<DocType>,
}

/// Breadth-first reachability in one direction over the fixed edge list.
///
/// The visited set is seeded with the origin, so the traversal terminates
/// and never reports the origin even on a (hypothetically) cyclic graph.
fn bfs(origin: DocType, direction: StepDirection, max_depth: Option<usize>) -> Vec<DocType> {
    let mut visited: HashSet<DocType> = HashSet::new();
    visited.insert(origin);
    let mut queue: VecDeque<(DocType, usize)> = VecDeque::new();
    queue.push_back((origin, 0));
    let mut result = Vec::new();

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.map_or(false, |max| depth >= max) {
            continue;
        }
        for &(upstream, downstream) in CHAIN_EDGES {
            let (match_side, neighbor) = match direction {
                StepDirection::Downstream => (upstream, downstream),
                StepDirection::Upstream => (downstream, upstream),
            };
            if match_side == current && !visited.contains(&neighbor) {
                visited.insert(neighbor);
                result.push(neighbor);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    result
}

/// Ordered propagation steps for a change originating at `origin`.
///
/// Upstream steps come first, furthest document first and nearest last;
/// downstream steps follow in nearest-first discovery order. The origin is
/// never a step, and no document type appears twice.
pub fn compute_propagation_order(origin: DocType) -> Vec<PropagationStep> {
    compute_propagation_order_with(origin, &PropagationOptions::default())
}

/// [`compute_propagation_order`] with depth and skip limits applied.
pub fn compute_propagation_order_with(
    origin: DocType,
    options: &PropagationOptions,
) -> Vec<PropagationStep> {
    let mut upstream = bfs(origin, StepDirection::Upstream, options.max_depth);
    upstream.reverse();
    let downstream = bfs(origin, StepDirection::Downstream, options.max_depth);

    let mut steps = Vec::with_capacity(upstream.len() + downstream.len());
    for doc in upstream {
        if !options.skip_docs.contains(&doc) {
            steps.push(PropagationStep::pending(doc, StepDirection::Upstream));
        }
    }
    for doc in downstream {
        if !options.skip_docs.contains(&doc) {
            steps.push(PropagationStep::pending(doc, StepDirection::Downstream));
        }
    }
    steps
}
