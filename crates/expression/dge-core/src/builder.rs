//! Stack-machine evaluator that folds constants or wires host nodes.
//!
//! The program is reduced in a single loop over its instructions; nothing
//! recurses, so expression length never threatens the call stack.

use std::f64::consts;

use dge_api_core::coercion;
use dge_api_core::schema::{signature, NodeSignature};
use dge_api_core::{Arity, HostError, HostGraph, NodeId, NodeKind, Operation, PlugPath, Value};
use hashbrown::HashMap;
use log::{trace, warn};

use crate::env::{Binding, Environment};
use crate::error::{DgeError, DgeResult};
use crate::function::Function;
use crate::notes::Note;
use crate::operand::{Operand, Predicate, Slot};
use crate::options::CompileOptions;
use crate::parser::{BinaryOp, Instruction};

/// How an operand reaches a node input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    /// Channel-wise input. Scalars broadcast when the node runs on vectors.
    Broadcast,
    /// A single-channel input.
    Scalar,
    /// A point. Scalars drive the X channel only.
    Point,
}

type Input<'o> = (&'static str, &'o Operand, Feed);

pub(crate) struct Builder<'a, H: HostGraph + ?Sized> {
    host: &'a mut H,
    options: &'a CompileOptions,
    env: &'a Environment,
    source: &'a str,
    /// Identifier lookups, resolved once per call.
    resolved: HashMap<String, Operand>,
    /// Variable name for each resolved plug, for notes.
    names: HashMap<PlugPath, String>,
    /// Sub-operations already built in this call.
    memo: HashMap<String, Operand>,
    created: Vec<NodeId>,
}

impl<'a, H: HostGraph + ?Sized> Builder<'a, H> {
    pub fn new(
        host: &'a mut H,
        options: &'a CompileOptions,
        env: &'a Environment,
        source: &'a str,
    ) -> Self {
        Self {
            host,
            options,
            env,
            source,
            resolved: HashMap::new(),
            names: HashMap::new(),
            memo: HashMap::new(),
            created: Vec::new(),
        }
    }

    /// Nodes created so far, in creation order.
    pub fn into_created(self) -> Vec<NodeId> {
        self.created
    }

    pub fn run(&mut self, instructions: &[Instruction]) -> DgeResult<Operand> {
        let mut stack: Vec<Slot> = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            let slot = match instruction {
                Instruction::Number(n) => Slot::Operand(Operand::Literal(Value::Float(*n))),
                Instruction::Constant(c) => Slot::Operand(Operand::Literal(Value::Float(c.value()))),
                Instruction::Identifier(name) => Slot::Operand(self.resolve(name)?),
                Instruction::Negate => {
                    let x = self.pop(&mut stack)?;
                    Slot::Operand(self.negate(x)?)
                }
                Instruction::Binary(op) => {
                    let rhs = self.pop(&mut stack)?;
                    let lhs = self.pop(&mut stack)?;
                    Slot::Operand(self.binary(*op, lhs, rhs)?)
                }
                Instruction::Compare(op) => {
                    let rhs = self.pop(&mut stack)?;
                    let lhs = self.pop(&mut stack)?;
                    self.require_scalar("comparison", &lhs)?;
                    self.require_scalar("comparison", &rhs)?;
                    Slot::Predicate(Predicate { lhs, op: *op, rhs })
                }
                Instruction::Select => {
                    let otherwise = self.pop(&mut stack)?;
                    let then = self.pop(&mut stack)?;
                    let condition = stack.pop().ok_or_else(|| self.underflow())?;
                    Slot::Operand(self.select(condition, then, otherwise)?)
                }
                Instruction::Call(function) => {
                    let mut args = Vec::with_capacity(function.arity());
                    for _ in 0..function.arity() {
                        args.push(self.pop(&mut stack)?);
                    }
                    args.reverse();
                    Slot::Operand(self.call(*function, &args)?)
                }
            };
            stack.push(slot);
        }

        let result = self.pop(&mut stack)?;
        if !stack.is_empty() {
            return Err(self.underflow());
        }
        Ok(result)
    }

    /// Drive the plug bound to `target` with `result`.
    pub fn assign(&mut self, target: &str, result: &Operand) -> DgeResult<PlugPath> {
        let binding = self
            .env
            .get(target)
            .ok_or_else(|| DgeError::UnknownIdentifier {
                name: target.to_string(),
            })?;
        let plug = match binding {
            Binding::Plug(p) => p,
            Binding::Literal(_) => {
                return Err(DgeError::InvalidAssignment {
                    name: target.to_string(),
                    reason: "bound to a literal value, not a plug".to_string(),
                })
            }
        };
        let dest = self.host.canonicalize(plug)?;
        let dest_arity = self.host.arity(&dest)?;

        match result {
            Operand::Literal(v) => {
                let value = match (dest_arity, v) {
                    (Arity::Vec3, _) => Value::Vec3(v.to_vec3()),
                    (Arity::Scalar, Value::Float(_)) => *v,
                    (Arity::Scalar, Value::Vec3(_)) => {
                        return Err(DgeError::InvalidAssignment {
                            name: target.to_string(),
                            reason: format!("scalar plug {dest} cannot hold vector {v}"),
                        })
                    }
                };
                self.host.set_static_input(&dest, &value)?;
            }
            Operand::Plug { path, arity } => {
                if *arity != dest_arity {
                    return Err(DgeError::InvalidAssignment {
                        name: target.to_string(),
                        reason: format!("{dest} is {dest_arity:?} but {path} is {arity:?}"),
                    });
                }
                self.host.connect(path, &dest)?;
            }
        }
        trace!("assign {result:?} -> {dest}");
        Ok(dest)
    }

    // --- Stack helpers ---

    fn underflow(&self) -> DgeError {
        DgeError::parse_at(self.source, self.source.len(), "incomplete expression")
    }

    /// Pop a value, turning a pending comparison into `1`/`0`.
    fn pop(&mut self, stack: &mut Vec<Slot>) -> DgeResult<Operand> {
        match stack.pop() {
            Some(Slot::Operand(op)) => Ok(op),
            Some(Slot::Predicate(p)) => self.predicate_value(p),
            None => Err(self.underflow()),
        }
    }

    fn resolve(&mut self, name: &str) -> DgeResult<Operand> {
        if let Some(known) = self.resolved.get(name) {
            return Ok(known.clone());
        }
        let binding = self
            .env
            .get(name)
            .ok_or_else(|| DgeError::UnknownIdentifier {
                name: name.to_string(),
            })?;
        let operand = match binding {
            Binding::Literal(v) => Operand::Literal(*v),
            Binding::Plug(plug) => {
                let path = self.host.canonicalize(plug)?;
                let arity = self.host.arity(&path)?;
                self.names
                    .entry(path.clone())
                    .or_insert_with(|| name.to_string());
                Operand::Plug { path, arity }
            }
        };
        self.resolved.insert(name.to_string(), operand.clone());
        Ok(operand)
    }

    fn foldable(&self, operands: &[&Operand]) -> bool {
        self.options.fold_constants && operands.iter().all(|o| o.literal().is_some())
    }

    fn require_scalar(&self, context: &str, operand: &Operand) -> DgeResult<()> {
        if operand.arity() == Arity::Vec3 {
            return Err(DgeError::TypeMismatch {
                context: context.to_string(),
                operand: self.describe(operand),
            });
        }
        Ok(())
    }

    fn describe(&self, operand: &Operand) -> String {
        match operand {
            Operand::Literal(v) => v.to_string(),
            Operand::Plug { path, .. } => self
                .names
                .get(path)
                .cloned()
                .unwrap_or_else(|| path.to_string()),
        }
    }

    // --- Operators ---

    fn negate(&mut self, x: Operand) -> DgeResult<Operand> {
        if let (true, Some(v)) = (self.foldable(&[&x]), x.literal()) {
            return Ok(Operand::Literal(coercion::unary(&v, |c| -c)));
        }
        let label = format!("-{}", self.describe(&x));
        let minus_one = Operand::Literal(Value::Float(-1.0));
        self.node(
            NodeKind::MultiplyDivide,
            Some(Operation::Multiply),
            &[("input1", &minus_one, Feed::Broadcast), ("input2", &x, Feed::Broadcast)],
            label,
        )
    }

    fn binary(&mut self, op: BinaryOp, lhs: Operand, rhs: Operand) -> DgeResult<Operand> {
        if self.foldable(&[&lhs, &rhs]) {
            if let (Some(a), Some(b)) = (lhs.literal(), rhs.literal()) {
                return Ok(Operand::Literal(coercion::binary(&a, &b, |x, y| op.apply(x, y))));
            }
        }
        let kind = match op {
            BinaryOp::Add | BinaryOp::Subtract => NodeKind::PlusMinusAverage,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Power => NodeKind::MultiplyDivide,
        };
        let label = format!(
            "{} {} {}",
            self.describe(&lhs),
            op.symbol(),
            self.describe(&rhs)
        );
        self.node(
            kind,
            Some(op.operation()),
            &[("input1", &lhs, Feed::Broadcast), ("input2", &rhs, Feed::Broadcast)],
            label,
        )
    }

    fn predicate_label(&self, p: &Predicate) -> String {
        format!(
            "{} {} {}",
            self.describe(&p.lhs),
            p.op.symbol(),
            self.describe(&p.rhs)
        )
    }

    /// A comparison used as a number.
    fn predicate_value(&mut self, p: Predicate) -> DgeResult<Operand> {
        if self.foldable(&[&p.lhs, &p.rhs]) {
            if let Some(outcome) = p.constant() {
                return Ok(Operand::Literal(Value::Float(if outcome { 1.0 } else { 0.0 })));
            }
        }
        let label = self.predicate_label(&p);
        let (yes, no) = (
            Operand::Literal(Value::Float(1.0)),
            Operand::Literal(Value::Float(0.0)),
        );
        self.node(
            NodeKind::Condition,
            Some(p.op),
            &[
                ("firstTerm", &p.lhs, Feed::Scalar),
                ("secondTerm", &p.rhs, Feed::Scalar),
                ("colorIfTrue", &yes, Feed::Broadcast),
                ("colorIfFalse", &no, Feed::Broadcast),
            ],
            label,
        )
    }

    fn select(&mut self, condition: Slot, then: Operand, otherwise: Operand) -> DgeResult<Operand> {
        let p = match condition {
            Slot::Predicate(p) => p,
            Slot::Operand(value) => {
                self.require_scalar("condition", &value)?;
                Predicate {
                    lhs: value,
                    op: Operation::NotEqual,
                    rhs: Operand::Literal(Value::Float(0.0)),
                }
            }
        };
        if self.foldable(&[&p.lhs, &p.rhs]) {
            if let Some(outcome) = p.constant() {
                return Ok(if outcome { then } else { otherwise });
            }
        }
        let label = format!(
            "{} ? {} : {}",
            self.predicate_label(&p),
            self.describe(&then),
            self.describe(&otherwise)
        );
        self.node(
            NodeKind::Condition,
            Some(p.op),
            &[
                ("firstTerm", &p.lhs, Feed::Scalar),
                ("secondTerm", &p.rhs, Feed::Scalar),
                ("colorIfTrue", &then, Feed::Broadcast),
                ("colorIfFalse", &otherwise, Feed::Broadcast),
            ],
            label,
        )
    }

    fn call(&mut self, function: Function, args: &[Operand]) -> DgeResult<Operand> {
        if function.scalar_only() {
            for arg in args {
                self.require_scalar(function.name(), arg)?;
            }
        }
        if function == Function::Lerp {
            self.require_scalar("lerp blend factor", &args[2])?;
        }

        let refs: Vec<&Operand> = args.iter().collect();
        if self.foldable(&refs) {
            let values: Vec<Value> = args.iter().filter_map(Operand::literal).collect();
            return Ok(Operand::Literal(function.evaluate(&values)));
        }

        let label = format!(
            "{}({})",
            function.name(),
            args.iter()
                .map(|a| self.describe(a))
                .collect::<Vec<_>>()
                .join(", ")
        );

        match function {
            Function::Exp => {
                let e = Operand::Literal(Value::Float(consts::E));
                self.node(
                    NodeKind::MultiplyDivide,
                    Some(Operation::Power),
                    &[("input1", &e, Feed::Broadcast), ("input2", &args[0], Feed::Broadcast)],
                    label,
                )
            }
            Function::Sqrt => {
                let half = Operand::Literal(Value::Float(0.5));
                self.node(
                    NodeKind::MultiplyDivide,
                    Some(Operation::Power),
                    &[("input1", &args[0], Feed::Broadcast), ("input2", &half, Feed::Broadcast)],
                    label,
                )
            }
            Function::Clamp => self.node(
                NodeKind::Clamp,
                None,
                &[
                    ("input", &args[0], Feed::Broadcast),
                    ("min", &args[1], Feed::Broadcast),
                    ("max", &args[2], Feed::Broadcast),
                ],
                label,
            ),
            Function::Lerp => self.node(
                NodeKind::Blend,
                None,
                &[
                    ("input1", &args[0], Feed::Broadcast),
                    ("input2", &args[1], Feed::Broadcast),
                    ("blender", &args[2], Feed::Scalar),
                ],
                label,
            ),
            Function::Min | Function::Max => {
                let op = if function == Function::Min {
                    Operation::LessOrEqual
                } else {
                    Operation::GreaterOrEqual
                };
                self.node(
                    NodeKind::Condition,
                    Some(op),
                    &[
                        ("firstTerm", &args[0], Feed::Scalar),
                        ("secondTerm", &args[1], Feed::Scalar),
                        ("colorIfTrue", &args[0], Feed::Broadcast),
                        ("colorIfFalse", &args[1], Feed::Broadcast),
                    ],
                    label,
                )
            }
            Function::Distance => self.node(
                NodeKind::Distance,
                None,
                &[("point1", &args[0], Feed::Point), ("point2", &args[1], Feed::Point)],
                label,
            ),
            Function::Abs
            | Function::Cos
            | Function::Sin
            | Function::Tan
            | Function::Acos
            | Function::Asin
            | Function::Atan
            | Function::Trunc
            | Function::Round
            | Function::Sgn => match function.channel_node() {
                Some((kind, op)) => {
                    self.node(kind, Some(op), &[("input", &args[0], Feed::Broadcast)], label)
                }
                None => Err(DgeError::UnsupportedOperation {
                    name: function.name().to_string(),
                }),
            },
        }
    }

    // --- Node wiring ---

    /// Create (or reuse) a node, drive its inputs and return its output.
    fn node(
        &mut self,
        kind: NodeKind,
        operation: Option<Operation>,
        inputs: &[Input<'_>],
        label: String,
    ) -> DgeResult<Operand> {
        let vector = inputs
            .iter()
            .any(|(_, operand, feed)| *feed == Feed::Broadcast && operand.arity() == Arity::Vec3);

        let key = inputs.iter().fold(
            format!("{}:{:?}", kind.type_name(), operation),
            |mut key, (attr, operand, _)| {
                key.push('|');
                key.push_str(attr);
                key.push('=');
                key.push_str(&operand.key());
                key
            },
        );
        if self.options.reuse_nodes {
            if let Some(existing) = self.memo.get(&key) {
                trace!("reuse {existing:?} for {label}");
                return Ok(existing.clone());
            }
        }

        let sig = signature(kind);
        let id = self.host.create_node(kind, operation)?;
        trace!("created {kind} '{id}' for {label}");
        self.created.push(id.clone());

        for (attr, operand, feed) in inputs {
            self.feed(sig, &id, attr, operand, *feed, vector)?;
        }

        let primary = sig.find(sig.primary).ok_or_else(|| HostError::UnknownAttribute {
            node: id.clone(),
            attribute: sig.primary.to_string(),
        })?;
        let output = if vector && primary.is_compound() {
            Operand::Plug {
                path: PlugPath::new(id.clone(), primary.name),
                arity: Arity::Vec3,
            }
        } else {
            Operand::Plug {
                path: PlugPath::new(id.clone(), primary.channel(0)),
                arity: Arity::Scalar,
            }
        };

        self.annotate(&id, &label);
        if self.options.reuse_nodes {
            self.memo.insert(key, output.clone());
        }
        Ok(output)
    }

    fn feed(
        &mut self,
        sig: &'static NodeSignature,
        node: &NodeId,
        attr: &str,
        operand: &Operand,
        feed: Feed,
        vector: bool,
    ) -> DgeResult<()> {
        let spec = sig.find(attr).ok_or_else(|| HostError::UnknownAttribute {
            node: node.clone(),
            attribute: attr.to_string(),
        })?;
        let plug = |name: &str| PlugPath::new(node.clone(), name);

        if feed == Feed::Scalar || (feed == Feed::Broadcast && !vector) {
            self.require_scalar(attr, operand)?;
            return self.drive_leaf(operand, &plug(spec.channel(0)));
        }

        match (feed, operand) {
            (Feed::Point, Operand::Literal(v)) => {
                self.host
                    .set_static_input(&plug(spec.name), &Value::Vec3(coercion::to_point(v)))?;
            }
            (_, Operand::Literal(v)) => {
                self.host
                    .set_static_input(&plug(spec.name), &Value::Vec3(v.to_vec3()))?;
            }
            (_, Operand::Plug { path, arity: Arity::Vec3 }) => {
                self.host.connect(path, &plug(spec.name))?;
            }
            (Feed::Point, Operand::Plug { path, arity: Arity::Scalar }) => {
                self.host.connect(path, &plug(spec.channel(0)))?;
            }
            (_, Operand::Plug { path, arity: Arity::Scalar }) => {
                for i in 0..3 {
                    self.host.connect(path, &plug(spec.channel(i)))?;
                }
            }
        }
        Ok(())
    }

    fn drive_leaf(&mut self, operand: &Operand, plug: &PlugPath) -> DgeResult<()> {
        match operand {
            Operand::Literal(v) => self.host.set_static_input(plug, &Value::Float(v.channel(0)))?,
            Operand::Plug { path, .. } => self.host.connect(path, plug)?,
        }
        Ok(())
    }

    fn annotate(&mut self, node: &NodeId, operation: &str) {
        if !self.options.annotate {
            return;
        }
        let text = Note {
            header: &self.options.note_header,
            expression: self.source,
            operation,
            bindings: self.env,
        }
        .to_string();
        if let Err(err) = self.host.annotate(node, &text) {
            warn!("could not annotate '{node}': {err}");
        }
    }
}
