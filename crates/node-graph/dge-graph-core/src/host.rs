//! [`HostGraph`] implementation over a [`GraphSpec`].

use dge_api_core::schema::{signature, AttributeSpec};
use dge_api_core::{
    Direction, HostError, HostGraph, NodeId, NodeKind, Operation, PlugPath, Value,
};
use log::trace;

use crate::types::{ContainerSpec, GraphSpec, InputConnection, NodeSpec, PublishedAttribute};

impl GraphSpec {
    /// Add a node with a caller-chosen name, e.g. a transform acting as an input.
    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> Result<NodeId, HostError> {
        if self.is_taken(name) {
            return Err(HostError::DuplicateNode(name.to_string()));
        }
        self.nodes
            .push(NodeSpec::new(name, kind, kind.default_operation()));
        Ok(name.to_string())
    }

    /// Smallest unused `<typeName><n>` name.
    fn next_name(&self, kind: NodeKind) -> NodeId {
        let mut n = self.count(kind) + 1;
        loop {
            let candidate = format!("{}{}", kind.type_name(), n);
            if !self.is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Node and container ids share one namespace.
    fn is_taken(&self, name: &str) -> bool {
        self.node(name).is_some() || self.container(name).is_some()
    }

    /// Inputs of nodes inside `container` fed from the plug published as
    /// `name`, i.e. the connections that cross the boundary through it.
    pub fn bound_inputs(&self, container: &str, name: &str) -> Result<Vec<PlugPath>, HostError> {
        let spec = self
            .container(container)
            .ok_or_else(|| HostError::UnknownContainer(container.to_string()))?;
        let Some(published) = spec.published(name) else {
            return Ok(Vec::new());
        };
        let (_, attr) = self.resolve(published)?;
        let mut bound: Vec<PlugPath> = self
            .nodes
            .iter()
            .filter(|n| spec.contains(&n.id))
            .flat_map(|n| {
                n.inputs
                    .iter()
                    .filter(move |(_, conn)| {
                        conn.node_id == published.node
                            && attr.leaves().iter().any(|l| l.name == conn.attribute)
                    })
                    .map(move |(leaf, _)| PlugPath::new(n.id.clone(), leaf.clone()))
            })
            .collect();
        bound.sort();
        Ok(bound)
    }

    /// Resolve a plug to its node and attribute spec. Bare node paths resolve
    /// to the node's primary plug.
    pub fn resolve(&self, plug: &PlugPath) -> Result<(&NodeSpec, &'static AttributeSpec), HostError> {
        let node = self
            .node(&plug.node)
            .ok_or_else(|| HostError::UnknownNode(plug.node.clone()))?;
        let sig = signature(node.kind);
        let name = plug.attribute_name().unwrap_or(sig.primary);
        let attr = sig.find(name).ok_or_else(|| HostError::UnknownAttribute {
            node: plug.node.clone(),
            attribute: name.to_string(),
        })?;
        Ok((node, attr))
    }

    fn writable(&self, plug: &PlugPath) -> Result<&'static AttributeSpec, HostError> {
        let (_, attr) = self.resolve(plug)?;
        if attr.direction != Direction::Input {
            return Err(HostError::NotWritable(plug.clone()));
        }
        Ok(attr)
    }
}

impl HostGraph for GraphSpec {
    fn create_node(
        &mut self,
        kind: NodeKind,
        operation: Option<Operation>,
    ) -> Result<NodeId, HostError> {
        if let Some(op) = operation {
            if !kind.accepts(op) {
                return Err(HostError::InvalidOperation { kind, operation: op });
            }
        }
        let id = self.next_name(kind);
        trace!("create {kind} '{id}' ({operation:?})");
        self.nodes
            .push(NodeSpec::new(id.clone(), kind, operation.or(kind.default_operation())));
        Ok(id)
    }

    fn set_static_input(&mut self, plug: &PlugPath, value: &Value) -> Result<(), HostError> {
        let attr = self.writable(plug)?;
        if attr.arity() != value.arity() {
            return Err(HostError::ArityMismatch {
                source_desc: value.to_string(),
                destination: plug.clone(),
                expected: attr.arity(),
                actual: value.arity(),
            });
        }
        let node = self
            .node_mut(&plug.node)
            .ok_or_else(|| HostError::UnknownNode(plug.node.clone()))?;
        if let Some(leaf) = attr.leaves().iter().find(|l| node.inputs.contains_key(l.name)) {
            return Err(HostError::Connected(plug.with_attribute(leaf.name)));
        }
        for (i, leaf) in attr.leaves().iter().enumerate() {
            node.params.statics.insert(leaf.name.to_string(), value.channel(i));
        }
        trace!("set {plug} = {value}");
        Ok(())
    }

    fn connect(&mut self, source: &PlugPath, destination: &PlugPath) -> Result<(), HostError> {
        let (src_node, src_attr) = self.resolve(source)?;
        let src_id = src_node.id.clone();
        let dst_attr = self.writable(destination)?;
        if src_attr.arity() != dst_attr.arity() {
            return Err(HostError::ArityMismatch {
                source_desc: source.to_string(),
                destination: destination.clone(),
                expected: dst_attr.arity(),
                actual: src_attr.arity(),
            });
        }
        let node = self
            .node_mut(&destination.node)
            .ok_or_else(|| HostError::UnknownNode(destination.node.clone()))?;
        for (src_leaf, dst_leaf) in src_attr.leaves().iter().zip(dst_attr.leaves()) {
            node.params.statics.remove(dst_leaf.name);
            node.inputs.insert(
                dst_leaf.name.to_string(),
                InputConnection {
                    node_id: src_id.clone(),
                    attribute: src_leaf.name.to_string(),
                },
            );
        }
        trace!("connect {source} -> {destination}");
        Ok(())
    }

    fn arity(&self, plug: &PlugPath) -> Result<dge_api_core::Arity, HostError> {
        self.resolve(plug).map(|(_, attr)| attr.arity())
    }

    fn annotate(&mut self, node: &NodeId, text: &str) -> Result<(), HostError> {
        if let Some(spec) = self.node_mut(node) {
            spec.params.notes = Some(text.to_string());
            return Ok(());
        }
        let container = self
            .container_mut(node)
            .ok_or_else(|| HostError::UnknownNode(node.clone()))?;
        container.notes = Some(text.to_string());
        Ok(())
    }

    fn canonicalize(&self, plug: &PlugPath) -> Result<PlugPath, HostError> {
        let (node, attr) = self.resolve(plug)?;
        Ok(PlugPath::new(node.id.clone(), attr.name))
    }

    fn create_container(&mut self, name: &str) -> Result<NodeId, HostError> {
        let mut id = name.to_string();
        let mut n = 1;
        while self.is_taken(&id) {
            id = format!("{name}{n}");
            n += 1;
        }
        trace!("create container '{id}'");
        self.containers.push(ContainerSpec::new(id.clone()));
        Ok(id)
    }

    fn add_to_container(&mut self, container: &NodeId, node: &NodeId) -> Result<(), HostError> {
        if self.node(node).is_none() {
            return Err(HostError::UnknownNode(node.clone()));
        }
        let spec = self
            .container_mut(container)
            .ok_or_else(|| HostError::UnknownContainer(container.clone()))?;
        if !spec.contains(node) {
            spec.nodes.push(node.clone());
        }
        Ok(())
    }

    fn publish(&mut self, container: &NodeId, name: &str, plug: &PlugPath) -> Result<(), HostError> {
        let plug = self.canonicalize(plug)?;
        let spec = self
            .container_mut(container)
            .ok_or_else(|| HostError::UnknownContainer(container.clone()))?;
        if spec.published(name).is_some() {
            return Err(HostError::AlreadyPublished {
                container: container.clone(),
                name: name.to_string(),
            });
        }
        trace!("publish {plug} as '{container}.{name}'");
        spec.published.push(PublishedAttribute {
            name: name.to_string(),
            plug,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dge_api_core::Arity;

    fn plug(s: &str) -> PlugPath {
        PlugPath::parse(s).expect("valid plug")
    }

    #[test]
    fn generated_names_count_per_kind() {
        let mut g = GraphSpec::default();
        let a = g.create_node(NodeKind::PlusMinusAverage, None).unwrap();
        let b = g.create_node(NodeKind::PlusMinusAverage, Some(Operation::Subtract)).unwrap();
        let c = g.create_node(NodeKind::Condition, None).unwrap();
        assert_eq!(a, "plusMinusAverage1");
        assert_eq!(b, "plusMinusAverage2");
        assert_eq!(c, "condition1");
        assert_eq!(g.node(&b).unwrap().operation, Some(Operation::Subtract));
        assert_eq!(g.node(&a).unwrap().operation, Some(Operation::Sum));
    }

    #[test]
    fn invalid_operation_is_rejected() {
        let mut g = GraphSpec::default();
        let err = g
            .create_node(NodeKind::Clamp, Some(Operation::Power))
            .unwrap_err();
        assert!(matches!(err, HostError::InvalidOperation { .. }));
        assert!(g.nodes.is_empty());
    }

    #[test]
    fn canonicalize_resolves_short_and_bare_names() {
        let mut g = GraphSpec::default();
        g.add_node("loc", NodeKind::Transform).unwrap();
        assert_eq!(g.canonicalize(&plug("loc.tx")).unwrap(), plug("loc.translateX"));
        assert_eq!(g.canonicalize(&plug("loc")).unwrap(), plug("loc.translate"));
        assert_eq!(g.arity(&plug("loc.t")).unwrap(), Arity::Vec3);
        assert_eq!(g.arity(&plug("loc.ry")).unwrap(), Arity::Scalar);
        assert!(matches!(
            g.arity(&plug("loc.visibility")),
            Err(HostError::UnknownAttribute { .. })
        ));
        assert!(matches!(g.arity(&plug("nope.tx")), Err(HostError::UnknownNode(_))));
    }

    #[test]
    fn connect_checks_arity_and_direction() {
        let mut g = GraphSpec::default();
        g.add_node("loc", NodeKind::Transform).unwrap();
        let md = g.create_node(NodeKind::MultiplyDivide, None).unwrap();
        let out = PlugPath::new(md.clone(), "output");
        assert!(matches!(
            g.connect(&plug("loc.tx"), &out),
            Err(HostError::NotWritable(_))
        ));
        assert!(matches!(
            g.connect(&plug("loc.t"), &PlugPath::new(md.clone(), "input1X")),
            Err(HostError::ArityMismatch { .. })
        ));
        g.connect(&plug("loc.t"), &PlugPath::new(md.clone(), "input1"))
            .unwrap();
        let node = g.node(&md).unwrap();
        assert_eq!(node.inputs.len(), 3);
        assert_eq!(node.inputs["input1Z"].attribute, "translateZ");
    }

    #[test]
    fn static_values_respect_connections() {
        let mut g = GraphSpec::default();
        g.add_node("loc", NodeKind::Transform).unwrap();
        let pma = g.create_node(NodeKind::PlusMinusAverage, None).unwrap();
        let input = PlugPath::new(pma.clone(), "input1X");
        g.set_static_input(&input, &Value::Float(2.0)).unwrap();
        assert!(matches!(
            g.set_static_input(&PlugPath::new(pma.clone(), "input1"), &Value::Float(2.0)),
            Err(HostError::ArityMismatch { .. })
        ));
        g.connect(&plug("loc.tx"), &input).unwrap();
        assert!(!g.node(&pma).unwrap().params.statics.contains_key("input1X"));
        assert!(matches!(
            g.set_static_input(&input, &Value::Float(1.0)),
            Err(HostError::Connected(_))
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut g = GraphSpec::default();
        g.add_node("loc", NodeKind::Transform).unwrap();
        assert_eq!(
            g.add_node("loc", NodeKind::Transform),
            Err(HostError::DuplicateNode("loc".into()))
        );
    }

    #[test]
    fn containers_group_nodes_and_publish_plugs() {
        let mut g = GraphSpec::default();
        g.add_node("loc", NodeKind::Transform).unwrap();
        let md = g.create_node(NodeKind::MultiplyDivide, None).unwrap();
        g.connect(&plug("loc.tx"), &PlugPath::new(md.clone(), "input1X"))
            .unwrap();
        g.connect(&plug("loc.ty"), &PlugPath::new(md.clone(), "input2X"))
            .unwrap();

        let rig = g.create_container("rig").unwrap();
        assert_eq!(rig, "rig");
        g.add_to_container(&rig, &md).unwrap();
        g.add_to_container(&rig, &md).unwrap();
        g.publish(&rig, "x", &plug("loc.tx")).unwrap();
        g.annotate(&rig, "rig notes").unwrap();

        let spec = g.container(&rig).unwrap();
        assert_eq!(spec.nodes, vec![md.clone()]);
        assert_eq!(spec.published("x"), Some(&plug("loc.translateX")));
        assert_eq!(g.notes(&rig), Some("rig notes"));
        assert_eq!(
            g.bound_inputs(&rig, "x").unwrap(),
            vec![PlugPath::new(md.clone(), "input1X")]
        );
        assert!(g.bound_inputs(&rig, "y").unwrap().is_empty());

        assert_eq!(
            g.publish(&rig, "x", &plug("loc.ty")),
            Err(HostError::AlreadyPublished {
                container: rig.clone(),
                name: "x".into()
            })
        );
        assert!(matches!(
            g.add_to_container(&"nope".to_string(), &md),
            Err(HostError::UnknownContainer(_))
        ));
        assert!(matches!(
            g.add_to_container(&rig, &"ghost".to_string()),
            Err(HostError::UnknownNode(_))
        ));
    }

    #[test]
    fn container_names_are_made_unique() {
        let mut g = GraphSpec::default();
        g.add_node("rig", NodeKind::Transform).unwrap();
        assert_eq!(g.create_container("rig").unwrap(), "rig1");
        assert_eq!(g.create_container("rig").unwrap(), "rig2");
        assert_eq!(
            g.add_node("rig1", NodeKind::Transform),
            Err(HostError::DuplicateNode("rig1".into()))
        );
    }

    #[test]
    fn containers_survive_serde() {
        let mut g = GraphSpec::default();
        g.add_node("loc", NodeKind::Transform).unwrap();
        let rig = g.create_container("rig").unwrap();
        g.publish(&rig, "x", &plug("loc.tx")).unwrap();
        let json = serde_json::to_string(&g).unwrap();
        let back: GraphSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);

        let bare: GraphSpec = serde_json::from_str(r#"{"nodes": []}"#).unwrap();
        assert!(bare.containers.is_empty());
    }
}
