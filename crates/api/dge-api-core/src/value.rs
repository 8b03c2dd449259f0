//! Value: literal scalars and 3-vectors flowing through expressions and plugs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Component count of a value or plug.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    Scalar,
    Vec3,
}

impl Arity {
    /// Number of channels carried by this arity.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            Arity::Scalar => 1,
            Arity::Vec3 => 3,
        }
    }

    /// The wider of two arities; a single vector operand widens the whole operation.
    #[inline]
    pub fn widen(self, other: Arity) -> Arity {
        if self == Arity::Vec3 || other == Arity::Vec3 {
            Arity::Vec3
        } else {
            Arity::Scalar
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Scalar float
    Float(f64),

    /// 3D vector
    Vec3([f64; 3]),
}

impl Default for Value {
    fn default() -> Self {
        Value::Float(0.0)
    }
}

impl Value {
    #[inline]
    pub fn arity(&self) -> Arity {
        match self {
            Value::Float(_) => Arity::Scalar,
            Value::Vec3(_) => Arity::Vec3,
        }
    }

    /// Read channel `index`; scalars broadcast to every channel.
    #[inline]
    pub fn channel(&self, index: usize) -> f64 {
        match self {
            Value::Float(f) => *f,
            Value::Vec3(v) => v[index.min(2)],
        }
    }

    /// Broadcast to three channels.
    #[inline]
    pub fn to_vec3(&self) -> [f64; 3] {
        match self {
            Value::Float(f) => [*f; 3],
            Value::Vec3(v) => *v,
        }
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Value::Vec3([x, y, z])
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vec3(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Vec3([x, y, z]) => write!(f, "[{x}, {y}, {z}]"),
        }
    }
}
