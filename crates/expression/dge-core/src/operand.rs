//! Values on the evaluator's stack.

use dge_api_core::{Arity, Operation, PlugPath, Value};

/// A partial result: known now, or produced by a plug on the host graph.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Literal(Value),
    Plug { path: PlugPath, arity: Arity },
}

impl Operand {
    pub fn arity(&self) -> Arity {
        match self {
            Operand::Literal(v) => v.arity(),
            Operand::Plug { arity, .. } => *arity,
        }
    }

    pub fn literal(&self) -> Option<Value> {
        match self {
            Operand::Literal(v) => Some(*v),
            Operand::Plug { .. } => None,
        }
    }

    /// Identity used to recognise repeated sub-operations.
    pub fn key(&self) -> String {
        match self {
            Operand::Literal(v) => format!("{v:?}"),
            Operand::Plug { path, .. } => path.to_string(),
        }
    }
}

/// A comparison awaiting its consumer. A ternary turns it into a selecting
/// condition node; anything else turns it into `1`/`0`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Predicate {
    pub lhs: Operand,
    pub op: Operation,
    pub rhs: Operand,
}

impl Predicate {
    /// Outcome when both sides are literal.
    pub fn constant(&self) -> Option<bool> {
        let (a, b) = (self.lhs.literal()?, self.rhs.literal()?);
        self.op.compare(a.channel(0), b.channel(0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Operand(Operand),
    Predicate(Predicate),
}
