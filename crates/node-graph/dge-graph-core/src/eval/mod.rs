//! Evaluation pipeline for the reference host graph.
//!
//! [`evaluate_all`] walks a [`GraphSpec`](crate::types::GraphSpec) in topological order and
//! computes every node, storing leaf values in a [`GraphRuntime`] so callers can read any
//! plug back after the pass.
//!
//! - [`graph_runtime`] owns the per-node value tables and plug reads.
//! - [`numeric`] provides channel-wise math shared by node evaluators.
//! - [`eval_node`] dispatches on [`NodeKind`](dge_api_core::NodeKind).

use crate::types::GraphSpec;

pub mod eval_node;
mod graph_runtime;
mod numeric;

pub use eval_node::eval_node;
pub use graph_runtime::{GraphRuntime, NodeValues};


/// Evaluate every node in `spec`, updating `rt` in-place.
///
/// The runtime is cleared before evaluation and is repopulated as nodes are visited in topological
/// order. Any error propagated from an individual node halts evaluation.
pub fn evaluate_all(rt: &mut GraphRuntime, spec: &GraphSpec) -> Result<(), String> {
    rt.values.clear();

    let order = crate::topo::topo_order(&spec.nodes)?;
    for id in order {
        if let Some(node) = spec.node(&id) {
            eval_node::eval_node(rt, node)?;
        }
    }
    Ok(())
}
