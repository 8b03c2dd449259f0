//! Channel-wise helpers shared across node evaluators.

use dge_api_core::coercion::sign;
use dge_api_core::Operation;

pub type Channels = [f64; 3];

/// Apply `op` to each channel pair.
pub fn zip(a: Channels, b: Channels, op: fn(f64, f64) -> f64) -> Channels {
    [op(a[0], b[0]), op(a[1], b[1]), op(a[2], b[2])]
}

/// Apply `op` to each channel.
pub fn map(a: Channels, op: fn(f64) -> f64) -> Channels {
    [op(a[0]), op(a[1]), op(a[2])]
}

/// Per-channel function for a trigonometry or unary operation.
/// Inverse trig functions report degrees.
pub fn unary_fn(op: Operation) -> Option<fn(f64) -> f64> {
    let f: fn(f64) -> f64 = match op {
        Operation::Sin => f64::sin,
        Operation::Cos => f64::cos,
        Operation::Tan => f64::tan,
        Operation::Acos => |x| x.acos().to_degrees(),
        Operation::Asin => |x| x.asin().to_degrees(),
        Operation::Atan => |x| x.atan().to_degrees(),
        Operation::Absolute => f64::abs,
        Operation::Sign => sign,
        Operation::Truncate => f64::trunc,
        Operation::Round => f64::round,
        _ => return None,
    };
    Some(f)
}

/// Per-channel function for arithmetic operations.
pub fn binary_fn(op: Operation) -> Option<fn(f64, f64) -> f64> {
    let f: fn(f64, f64) -> f64 = match op {
        Operation::Sum => |a, b| a + b,
        Operation::Subtract => |a, b| a - b,
        Operation::Average => |a, b| (a + b) * 0.5,
        Operation::Multiply => |a, b| a * b,
        Operation::Divide => |a, b| a / b,
        Operation::Power => f64::powf,
        _ => return None,
    };
    Some(f)
}
