//! The capability a host graph exposes to the compiler.
//!
//! The compiler only ever creates nodes and wires them. It never reads values
//! back and never mutates nodes it did not create, apart from connecting into
//! plugs the caller handed it. Hosts that group nodes may also accept
//! containers; the default methods refuse them.

use thiserror::Error;

use crate::{Arity, NodeKind, Operation, PlugPath, Value};

pub type NodeId = String;

/// Errors raised by a host graph while creating or wiring nodes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("no node named '{0}'")]
    UnknownNode(String),
    #[error("node '{node}' has no attribute '{attribute}'")]
    UnknownAttribute { node: String, attribute: String },
    #[error("plug '{0}' does not name an attribute")]
    MissingAttribute(PlugPath),
    #[error("{kind} nodes do not support the '{operation}' operation")]
    InvalidOperation { kind: NodeKind, operation: Operation },
    #[error("cannot drive {destination} ({expected:?}) from {source_desc} ({actual:?})")]
    ArityMismatch {
        source_desc: String,
        destination: PlugPath,
        expected: Arity,
        actual: Arity,
    },
    #[error("plug '{0}' is not writable")]
    NotWritable(PlugPath),
    #[error("plug '{0}' is driven by a connection")]
    Connected(PlugPath),
    #[error("invalid plug path '{path}': {reason}")]
    InvalidPlug { path: String, reason: String },
    #[error("node name '{0}' is already taken")]
    DuplicateNode(String),
    #[error("no container named '{0}'")]
    UnknownContainer(String),
    #[error("container '{container}' already publishes '{name}'")]
    AlreadyPublished { container: String, name: String },
    #[error("host does not support {0}")]
    Unsupported(&'static str),
}

/// Narrow host-graph interface consumed by the evaluator.
pub trait HostGraph {
    /// Allocate a node of `kind` configured for `operation`.
    fn create_node(
        &mut self,
        kind: NodeKind,
        operation: Option<Operation>,
    ) -> Result<NodeId, HostError>;

    /// Bind a literal to an unconnected input plug. A scalar plug takes a
    /// `Value::Float`; a compound plug takes a `Value::Vec3`.
    fn set_static_input(&mut self, plug: &PlugPath, value: &Value) -> Result<(), HostError>;

    /// Wire `source` into `destination`, replacing any existing driver.
    fn connect(&mut self, source: &PlugPath, destination: &PlugPath) -> Result<(), HostError>;

    /// Whether `plug` carries one or three components.
    fn arity(&self, plug: &PlugPath) -> Result<Arity, HostError>;

    /// Attach a descriptive note to a node.
    fn annotate(&mut self, node: &NodeId, text: &str) -> Result<(), HostError>;

    /// Resolve short names and bare node paths to the host's canonical plug.
    fn canonicalize(&self, plug: &PlugPath) -> Result<PlugPath, HostError> {
        Ok(plug.clone())
    }

    /// Create a container named after `name`. The host may pick a different
    /// id if the name is taken.
    fn create_container(&mut self, _name: &str) -> Result<NodeId, HostError> {
        Err(HostError::Unsupported("containers"))
    }

    /// Move `node` into `container`.
    fn add_to_container(&mut self, _container: &NodeId, _node: &NodeId) -> Result<(), HostError> {
        Err(HostError::Unsupported("containers"))
    }

    /// Expose `plug` on the boundary of `container` as `name`, so connections
    /// between `plug` and the container's nodes pass through it.
    fn publish(
        &mut self,
        _container: &NodeId,
        _name: &str,
        _plug: &PlugPath,
    ) -> Result<(), HostError> {
        Err(HostError::Unsupported("containers"))
    }
}

impl<G: HostGraph + ?Sized> HostGraph for &mut G {
    fn create_node(
        &mut self,
        kind: NodeKind,
        operation: Option<Operation>,
    ) -> Result<NodeId, HostError> {
        (**self).create_node(kind, operation)
    }

    fn set_static_input(&mut self, plug: &PlugPath, value: &Value) -> Result<(), HostError> {
        (**self).set_static_input(plug, value)
    }

    fn connect(&mut self, source: &PlugPath, destination: &PlugPath) -> Result<(), HostError> {
        (**self).connect(source, destination)
    }

    fn arity(&self, plug: &PlugPath) -> Result<Arity, HostError> {
        (**self).arity(plug)
    }

    fn annotate(&mut self, node: &NodeId, text: &str) -> Result<(), HostError> {
        (**self).annotate(node, text)
    }

    fn canonicalize(&self, plug: &PlugPath) -> Result<PlugPath, HostError> {
        (**self).canonicalize(plug)
    }

    fn create_container(&mut self, name: &str) -> Result<NodeId, HostError> {
        (**self).create_container(name)
    }

    fn add_to_container(&mut self, container: &NodeId, node: &NodeId) -> Result<(), HostError> {
        (**self).add_to_container(container, node)
    }

    fn publish(&mut self, container: &NodeId, name: &str, plug: &PlugPath) -> Result<(), HostError> {
        (**self).publish(container, name, plug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat;

    impl HostGraph for Flat {
        fn create_node(&mut self, kind: NodeKind, _: Option<Operation>) -> Result<NodeId, HostError> {
            Ok(kind.type_name().to_string())
        }
        fn set_static_input(&mut self, _: &PlugPath, _: &Value) -> Result<(), HostError> {
            Ok(())
        }
        fn connect(&mut self, _: &PlugPath, _: &PlugPath) -> Result<(), HostError> {
            Ok(())
        }
        fn arity(&self, _: &PlugPath) -> Result<Arity, HostError> {
            Ok(Arity::Scalar)
        }
        fn annotate(&mut self, _: &NodeId, _: &str) -> Result<(), HostError> {
            Ok(())
        }
    }

    fn package<H: HostGraph>(mut host: H) -> Result<NodeId, HostError> {
        host.create_container("rig")
    }

    #[test]
    fn containers_are_refused_by_default() {
        let mut host = Flat;
        assert_eq!(package(&mut host), Err(HostError::Unsupported("containers")));
        let plug = PlugPath::new("loc", "translateX");
        assert!(matches!(
            host.publish(&"rig".to_string(), "x", &plug),
            Err(HostError::Unsupported(_))
        ));
        assert_eq!(host.canonicalize(&plug), Ok(plug));
    }
}
