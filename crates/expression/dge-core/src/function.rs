//! Built-in function table.

use std::f64::consts;

use dge_api_core::coercion;
use dge_api_core::{NodeKind, Operation, Value};

/// A built-in callable from expressions. Names are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Abs,
    Exp,
    Clamp,
    Lerp,
    Min,
    Max,
    Sqrt,
    Cos,
    Sin,
    Tan,
    Acos,
    Asin,
    Atan,
    Trunc,
    Round,
    Sgn,
    Distance,
}

impl Function {
    pub const ALL: [Function; 17] = [
        Function::Abs,
        Function::Exp,
        Function::Clamp,
        Function::Lerp,
        Function::Min,
        Function::Max,
        Function::Sqrt,
        Function::Cos,
        Function::Sin,
        Function::Tan,
        Function::Acos,
        Function::Asin,
        Function::Atan,
        Function::Trunc,
        Function::Round,
        Function::Sgn,
        Function::Distance,
    ];

    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Exp => "exp",
            Function::Clamp => "clamp",
            Function::Lerp => "lerp",
            Function::Min => "min",
            Function::Max => "max",
            Function::Sqrt => "sqrt",
            Function::Cos => "cos",
            Function::Sin => "sin",
            Function::Tan => "tan",
            Function::Acos => "acos",
            Function::Asin => "asin",
            Function::Atan => "atan",
            Function::Trunc => "trunc",
            Function::Round => "round",
            Function::Sgn => "sgn",
            Function::Distance => "distance",
        }
    }

    /// Number of arguments.
    pub fn arity(self) -> usize {
        match self {
            Function::Clamp | Function::Lerp => 3,
            Function::Min | Function::Max | Function::Distance => 2,
            _ => 1,
        }
    }

    /// Host node and operation mode for single-node, per-channel functions.
    pub fn channel_node(self) -> Option<(NodeKind, Operation)> {
        let pair = match self {
            Function::Sin => (NodeKind::Trigonometry, Operation::Sin),
            Function::Cos => (NodeKind::Trigonometry, Operation::Cos),
            Function::Tan => (NodeKind::Trigonometry, Operation::Tan),
            Function::Acos => (NodeKind::Trigonometry, Operation::Acos),
            Function::Asin => (NodeKind::Trigonometry, Operation::Asin),
            Function::Atan => (NodeKind::Trigonometry, Operation::Atan),
            Function::Abs => (NodeKind::Unary, Operation::Absolute),
            Function::Sgn => (NodeKind::Unary, Operation::Sign),
            Function::Trunc => (NodeKind::Unary, Operation::Truncate),
            Function::Round => (NodeKind::Unary, Operation::Round),
            _ => return None,
        };
        Some(pair)
    }

    /// Whether every argument must be scalar.
    pub fn scalar_only(self) -> bool {
        matches!(self, Function::Min | Function::Max)
    }

    /// Evaluate on literal arguments. `args.len()` equals [`Function::arity`].
    ///
    /// Angles going in are radians; `acos`, `asin` and `atan` return degrees.
    pub fn evaluate(self, args: &[Value]) -> Value {
        let arg = |i: usize| args.get(i).copied().unwrap_or_default();
        match self {
            Function::Abs => coercion::unary(&arg(0), f64::abs),
            Function::Exp => coercion::unary(&arg(0), |x| consts::E.powf(x)),
            Function::Sqrt => coercion::unary(&arg(0), |x| x.powf(0.5)),
            Function::Cos => coercion::unary(&arg(0), f64::cos),
            Function::Sin => coercion::unary(&arg(0), f64::sin),
            Function::Tan => coercion::unary(&arg(0), f64::tan),
            Function::Acos => coercion::unary(&arg(0), |x| x.acos().to_degrees()),
            Function::Asin => coercion::unary(&arg(0), |x| x.asin().to_degrees()),
            Function::Atan => coercion::unary(&arg(0), |x| x.atan().to_degrees()),
            Function::Trunc => coercion::unary(&arg(0), f64::trunc),
            Function::Round => coercion::unary(&arg(0), f64::round),
            Function::Sgn => coercion::unary(&arg(0), coercion::sign),
            Function::Clamp => {
                coercion::ternary(&arg(0), &arg(1), &arg(2), |x, lo, hi| x.max(lo).min(hi))
            }
            Function::Lerp => coercion::ternary(&arg(0), &arg(1), &arg(2), |a, b, t| a + (b - a) * t),
            Function::Min => coercion::binary(&arg(0), &arg(1), |a, b| if a <= b { a } else { b }),
            Function::Max => coercion::binary(&arg(0), &arg(1), |a, b| if a >= b { a } else { b }),
            Function::Distance => Value::Float(coercion::distance(
                coercion::to_point(&arg(0)),
                coercion::to_point(&arg(1)),
            )),
        }
    }
}
