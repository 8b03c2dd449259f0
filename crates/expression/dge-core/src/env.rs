//! Variable bindings supplied by the caller.

use std::fmt;

use dge_api_core::{PlugPath, Value};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DgeError, DgeResult};

/// What an identifier stands for: a literal or a plug on the host graph.
///
/// In JSON a binding is a number, a three-element array, or a plug string:
/// `{"x": 5, "offset": [0, 1, 0], "loc": "locator1.translate"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
    Literal(Value),
    Plug(PlugPath),
}

impl From<f64> for Binding {
    fn from(v: f64) -> Self {
        Binding::Literal(Value::Float(v))
    }
}

impl From<[f64; 3]> for Binding {
    fn from(v: [f64; 3]) -> Self {
        Binding::Literal(Value::Vec3(v))
    }
}

impl From<Value> for Binding {
    fn from(v: Value) -> Self {
        Binding::Literal(v)
    }
}

impl From<PlugPath> for Binding {
    fn from(p: PlugPath) -> Self {
        Binding::Plug(p)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Literal(v) => write!(f, "{v}"),
            Binding::Plug(p) => write!(f, "{p}"),
        }
    }
}

/// Immutable-during-compile mapping from identifier to [`Binding`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    bindings: HashMap<String, Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, binding: impl Into<Binding>) -> Self {
        self.bindings.insert(name.into(), binding.into());
        self
    }

    /// Bind `name` to the plug written as `path`.
    pub fn with_plug(self, name: impl Into<String>, path: &str) -> DgeResult<Self> {
        let name = name.into();
        let plug = PlugPath::parse(path).map_err(|reason| DgeError::InvalidPlug {
            name: name.clone(),
            path: path.to_string(),
            reason,
        })?;
        Ok(self.with(name, plug))
    }

    pub fn insert(&mut self, name: impl Into<String>, binding: impl Into<Binding>) -> Option<Binding> {
        self.bindings.insert(name.into(), binding.into())
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings ordered by name.
    pub fn sorted(&self) -> Vec<(&str, &Binding)> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<K: Into<String>, B: Into<Binding>> FromIterator<(K, B)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, B)>>(iter: I) -> Self {
        Environment {
            bindings: iter
                .into_iter()
                .map(|(k, b)| (k.into(), b.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_mixed_bindings() {
        let env = Environment::new()
            .with("x", 5.0)
            .with("offset", [0.0, 1.0, 0.0])
            .with_plug("loc", "locator1.t")
            .unwrap();
        assert_eq!(env.len(), 3);
        assert_eq!(env.get("x"), Some(&Binding::Literal(Value::Float(5.0))));
        assert_eq!(
            env.get("loc"),
            Some(&Binding::Plug(PlugPath::new("locator1", "t")))
        );
        assert!(env.get("y").is_none());
    }

    #[test]
    fn bad_plug_strings_name_the_variable() {
        let err = Environment::new().with_plug("loc", "a..b").unwrap_err();
        assert!(matches!(err, DgeError::InvalidPlug { ref name, .. } if name == "loc"));
    }

    #[test]
    fn deserializes_from_json() {
        let env: Environment =
            serde_json::from_str(r#"{"x": 5, "v": [1, 2, 3], "loc": "locator1.translate"}"#).unwrap();
        assert_eq!(env.get("x"), Some(&Binding::from(5.0)));
        assert_eq!(env.get("v"), Some(&Binding::from([1.0, 2.0, 3.0])));
        assert_eq!(
            env.get("loc"),
            Some(&Binding::Plug(PlugPath::new("locator1", "translate")))
        );
    }

    #[test]
    fn sorted_is_alphabetical() {
        let env: Environment = [("b", 1.0), ("a", 2.0), ("c", 3.0)].into_iter().collect();
        let names: Vec<&str> = env.sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
