//! Node kinds the compiler creates and the operations they accept.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node types a host graph must be able to create.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    // Arithmetic
    PlusMinusAverage,
    MultiplyDivide,

    // Selection
    Condition,
    Clamp,
    Blend,

    // Per-channel math
    Trigonometry,
    Unary,

    // Geometry
    Distance,

    // Host-owned sources/sinks; never created by the compiler
    Transform,
}

/// Operation-mode flag selecting the sub-operation of a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    // PlusMinusAverage
    Sum,
    Subtract,
    Average,

    // MultiplyDivide
    Multiply,
    Divide,
    Power,

    // Condition
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,

    // Trigonometry
    Sin,
    Cos,
    Tan,
    Acos,
    Asin,
    Atan,

    // Unary
    Absolute,
    Sign,
    Truncate,
    Round,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::PlusMinusAverage,
        NodeKind::MultiplyDivide,
        NodeKind::Condition,
        NodeKind::Clamp,
        NodeKind::Blend,
        NodeKind::Trigonometry,
        NodeKind::Unary,
        NodeKind::Distance,
        NodeKind::Transform,
    ];

    /// Host type name, also used as the prefix of generated node names.
    pub fn type_name(self) -> &'static str {
        match self {
            NodeKind::PlusMinusAverage => "plusMinusAverage",
            NodeKind::MultiplyDivide => "multiplyDivide",
            NodeKind::Condition => "condition",
            NodeKind::Clamp => "clamp",
            NodeKind::Blend => "blend",
            NodeKind::Trigonometry => "trigonometry",
            NodeKind::Unary => "unary",
            NodeKind::Distance => "distance",
            NodeKind::Transform => "transform",
        }
    }

    /// Operation used when none is requested. Kinds without modes return `None`.
    pub fn default_operation(self) -> Option<Operation> {
        match self {
            NodeKind::PlusMinusAverage => Some(Operation::Sum),
            NodeKind::MultiplyDivide => Some(Operation::Multiply),
            NodeKind::Condition => Some(Operation::Equal),
            NodeKind::Trigonometry => Some(Operation::Sin),
            NodeKind::Unary => Some(Operation::Absolute),
            NodeKind::Clamp | NodeKind::Blend | NodeKind::Distance | NodeKind::Transform => None,
        }
    }

    /// Whether `op` is a valid operation mode for this kind.
    pub fn accepts(self, op: Operation) -> bool {
        use Operation::*;
        match self {
            NodeKind::PlusMinusAverage => matches!(op, Sum | Subtract | Average),
            NodeKind::MultiplyDivide => matches!(op, Multiply | Divide | Power),
            NodeKind::Condition => matches!(
                op,
                Equal | NotEqual | Greater | GreaterOrEqual | Less | LessOrEqual
            ),
            NodeKind::Trigonometry => matches!(op, Sin | Cos | Tan | Acos | Asin | Atan),
            NodeKind::Unary => matches!(op, Absolute | Sign | Truncate | Round),
            NodeKind::Clamp | NodeKind::Blend | NodeKind::Distance | NodeKind::Transform => false,
        }
    }
}

impl Operation {
    /// Symbol used for comparison operations in expressions and notes.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Sum => "+",
            Operation::Subtract => "-",
            Operation::Average => "avg",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Power => "^",
            Operation::Equal => "==",
            Operation::NotEqual => "!=",
            Operation::Greater => ">",
            Operation::GreaterOrEqual => ">=",
            Operation::Less => "<",
            Operation::LessOrEqual => "<=",
            Operation::Sin => "sin",
            Operation::Cos => "cos",
            Operation::Tan => "tan",
            Operation::Acos => "acos",
            Operation::Asin => "asin",
            Operation::Atan => "atan",
            Operation::Absolute => "abs",
            Operation::Sign => "sgn",
            Operation::Truncate => "trunc",
            Operation::Round => "round",
        }
    }

    /// Evaluate a comparison operation. Non-comparison operations return `None`.
    pub fn compare(self, a: f64, b: f64) -> Option<bool> {
        match self {
            Operation::Equal => Some(a == b),
            Operation::NotEqual => Some(a != b),
            Operation::Greater => Some(a > b),
            Operation::GreaterOrEqual => Some(a >= b),
            Operation::Less => Some(a < b),
            Operation::LessOrEqual => Some(a <= b),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
