//! Values computed by the last evaluation pass.

use crate::types::NodeId;
use dge_api_core::schema::signature;
use dge_api_core::{HostError, NodeKind, PlugPath, Value};
use hashbrown::HashMap;

/// Leaf values of one node after evaluation.
#[derive(Debug, Clone)]
pub struct NodeValues {
    pub kind: NodeKind,
    pub leaves: HashMap<String, f64>,
}

/// Runtime data shared by all node evaluations.
#[derive(Debug, Default)]
pub struct GraphRuntime {
    pub values: HashMap<NodeId, NodeValues>,
}

impl GraphRuntime {
    /// Read a plug. Leaves read as `Value::Float`, compounds as `Value::Vec3`,
    /// and a bare node path reads the node's primary plug.
    pub fn read(&self, plug: &PlugPath) -> Result<Value, HostError> {
        let node = self
            .values
            .get(&plug.node)
            .ok_or_else(|| HostError::UnknownNode(plug.node.clone()))?;
        let sig = signature(node.kind);
        let name = plug.attribute_name().unwrap_or(sig.primary);
        let attr = sig.find(name).ok_or_else(|| HostError::UnknownAttribute {
            node: plug.node.clone(),
            attribute: name.to_string(),
        })?;
        let leaf = |n: &str| node.leaves.get(n).copied().unwrap_or(f64::NAN);
        Ok(if attr.is_compound() {
            Value::Vec3([
                leaf(attr.channel(0)),
                leaf(attr.channel(1)),
                leaf(attr.channel(2)),
            ])
        } else {
            Value::Float(leaf(attr.name))
        })
    }

    /// Convenience wrapper around [`GraphRuntime::read`] for scalar plugs given as strings.
    pub fn read_float(&self, plug: &str) -> Result<f64, HostError> {
        let path = PlugPath::parse(plug).map_err(|reason| HostError::InvalidPlug {
            path: plug.to_string(),
            reason,
        })?;
        Ok(self.read(&path)?.channel(0))
    }
}
