use crate::types::*;
use std::collections::{HashMap, VecDeque};

/// Order nodes so every node follows the nodes driving its inputs.
pub fn topo_order(nodes: &[NodeSpec]) -> Result<Vec<NodeId>, String> {
    let mut indeg: HashMap<NodeId, usize> = HashMap::new();
    let mut adj: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

    for n in nodes {
        indeg.entry(n.id.clone()).or_insert(0);
        for conn in n.inputs.values() {
            adj.entry(conn.node_id.clone()).or_default().push(n.id.clone());
            *indeg.entry(n.id.clone()).or_default() += 1;
        }
    }

    // Seed in declaration order so evaluation order is deterministic.
    let mut q: VecDeque<NodeId> = nodes
        .iter()
        .filter(|n| indeg.get(&n.id) == Some(&0))
        .map(|n| n.id.clone())
        .collect();

    let mut order = Vec::new();
    while let Some(u) = q.pop_front() {
        order.push(u.clone());
        if let Some(vs) = adj.get(&u) {
            for v in vs {
                if let Some(d) = indeg.get_mut(v) {
                    *d -= 1;
                    if *d == 0 {
                        q.push_back(v.clone());
                    }
                }
            }
        }
    }

    if order.len() != indeg.len() {
        return Err("cycle detected in graph".into());
    }
    Ok(order)
}
