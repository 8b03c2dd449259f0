//! Channel-wise arithmetic over [`Value`]s with scalar broadcasting.

use crate::{Arity, Value};

/// Apply `op` pairwise to two values. A scalar meeting a vector is broadcast
/// across all three channels; two scalars stay scalar.
pub fn binary<F>(lhs: &Value, rhs: &Value, op: F) -> Value
where
    F: Fn(f64, f64) -> f64,
{
    match (lhs, rhs) {
        (Value::Float(a), Value::Float(b)) => Value::Float(op(*a, *b)),
        _ => {
            let (a, b) = (lhs.to_vec3(), rhs.to_vec3());
            Value::Vec3([op(a[0], b[0]), op(a[1], b[1]), op(a[2], b[2])])
        }
    }
}

/// Apply `op` to every channel of `input`.
pub fn unary<F>(input: &Value, op: F) -> Value
where
    F: Fn(f64) -> f64,
{
    match input {
        Value::Float(f) => Value::Float(op(*f)),
        Value::Vec3(v) => Value::Vec3([op(v[0]), op(v[1]), op(v[2])]),
    }
}

/// Apply `op` channel-wise across three values, broadcasting scalars.
pub fn ternary<F>(a: &Value, b: &Value, c: &Value, op: F) -> Value
where
    F: Fn(f64, f64, f64) -> f64,
{
    let arity = a.arity().widen(b.arity()).widen(c.arity());
    match arity {
        Arity::Scalar => Value::Float(op(a.channel(0), b.channel(0), c.channel(0))),
        Arity::Vec3 => Value::Vec3(std::array::from_fn(|i| {
            op(a.channel(i), b.channel(i), c.channel(i))
        })),
    }
}

/// Sign with zero mapping to zero, unlike [`f64::signum`].
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Treat a value as a point. Scalars lie on the X axis.
pub fn to_point(v: &Value) -> [f64; 3] {
    match v {
        Value::Float(f) => [*f, 0.0, 0.0],
        Value::Vec3(p) => *p,
    }
}

/// Euclidean distance between two points.
pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
