//! Serialisable graph documents: nodes, their inputs and containers.

use dge_api_core::{NodeKind, Operation, PlugPath};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub use dge_api_core::NodeId;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeParams {
    /// Literal values bound to leaf input attributes, keyed by long name.
    #[serde(default)]
    pub statics: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Source of a connection: a leaf attribute on another node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputConnection {
    pub node_id: NodeId,
    pub attribute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(default)]
    pub params: NodeParams,
    /// Connections keyed by destination leaf attribute.
    #[serde(default)]
    pub inputs: HashMap<String, InputConnection>,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, operation: Option<Operation>) -> Self {
        NodeSpec {
            id: id.into(),
            kind,
            operation,
            params: NodeParams::default(),
            inputs: HashMap::new(),
        }
    }

    /// Operation in effect, falling back to the kind's default.
    pub fn effective_operation(&self) -> Option<Operation> {
        self.operation.or_else(|| self.kind.default_operation())
    }
}

/// An outside plug exposed on a container boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedAttribute {
    pub name: String,
    pub plug: PlugPath,
}

/// A named group of nodes. Grouping does not change evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ContainerSpec {
    pub id: NodeId,
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub published: Vec<PublishedAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContainerSpec {
    pub fn new(id: impl Into<NodeId>) -> Self {
        ContainerSpec {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    pub fn published(&self, name: &str) -> Option<&PlugPath> {
        self.published
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.plug)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GraphSpec {
    pub nodes: Vec<NodeSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerSpec>,
}

impl GraphSpec {
    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeSpec> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Number of nodes of `kind` in the graph.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn container(&self, id: &str) -> Option<&ContainerSpec> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut ContainerSpec> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    /// Notes attached to a node or container, if any.
    pub fn notes(&self, id: &str) -> Option<&str> {
        match self.node(id) {
            Some(n) => n.params.notes.as_deref(),
            None => self.container(id).and_then(|c| c.notes.as_deref()),
        }
    }
}
