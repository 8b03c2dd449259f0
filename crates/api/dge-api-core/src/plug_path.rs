//! PlugPath parsing and formatting.
//!
//! Grammar:
//!   node[.parent...].attribute
//! - The first `.`-separated segment names the node.
//! - The last segment names the attribute. Attribute names are unique on a
//!   node, so intermediate compound segments are accepted and dropped:
//!   "pma1.output.outputX" addresses the same plug as "pma1.outputX".
//! - A bare node name ("loc") carries no attribute; hosts resolve it to the
//!   node's default plug through [`HostGraph::canonicalize`](crate::HostGraph::canonicalize).

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlugPath {
    /// Node name.
    pub node: String,
    /// Attribute on the node, if any.
    pub attribute: Option<String>,
}

impl PlugPath {
    pub fn new(node: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attribute: Some(attribute.into()),
        }
    }

    /// A path naming only a node.
    pub fn node(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attribute: None,
        }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("empty plug path".to_string());
        }
        if s.chars().any(char::is_whitespace) {
            return Err(format!("invalid plug path '{s}': contains whitespace"));
        }
        let segments: Vec<&str> = s.split('.').collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(format!("invalid plug path '{s}': empty segment"));
        }
        let node = segments[0].to_string();
        let attribute = if segments.len() > 1 {
            segments.last().map(|a| a.to_string())
        } else {
            None
        };
        Ok(PlugPath { node, attribute })
    }

    /// Return the attribute name, or `None` for a bare node path.
    pub fn attribute_name(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// A sibling plug on the same node.
    pub fn with_attribute(&self, attribute: impl Into<String>) -> Self {
        PlugPath::new(self.node.clone(), attribute)
    }
}

impl fmt::Display for PlugPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attr) => write!(f, "{}.{}", self.node, attr),
            None => f.write_str(&self.node),
        }
    }
}

impl FromStr for PlugPath {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlugPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for PlugPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PlugPath {
    fn deserialize<D>(deserializer: D) -> Result<PlugPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PlugPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let p = PlugPath::parse("locator1.translateX").unwrap();
        assert_eq!(p.node, "locator1");
        assert_eq!(p.attribute_name(), Some("translateX"));
        assert_eq!(p.to_string(), "locator1.translateX");
    }

    #[test]
    fn parse_keeps_last_segment() {
        let p = PlugPath::parse("pma1.output.outputX").unwrap();
        assert_eq!(p, PlugPath::new("pma1", "outputX"));
    }

    #[test]
    fn parse_only_node() {
        let p = PlugPath::parse("loc").unwrap();
        assert_eq!(p.attribute, None);
        assert_eq!(p.to_string(), "loc");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(PlugPath::parse("").is_err());
        assert!(PlugPath::parse("loc .tx").is_err());
        assert!(PlugPath::parse("loc..tx").is_err());
        assert!(PlugPath::parse("loc.").is_err());
    }

    #[test]
    fn serde_as_string() {
        let p: PlugPath = serde_json::from_str("\"loc.tx\"").unwrap();
        assert_eq!(p, PlugPath::new("loc", "tx"));
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"loc.tx\"");
        assert!(serde_json::from_str::<PlugPath>("\"bad path\"").is_err());
    }
}
