//! Shared JSON fixtures for expression and graph tests.
//!
//! Fixture files live under the workspace `fixtures/` directory and are
//! listed in `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    expressions: HashMap<String, String>,
    graphs: HashMap<String, GraphEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphEntry {
    Path(String),
    Detailed { spec: String },
}

impl GraphEntry {
    fn as_path(&self) -> &str {
        match self {
            GraphEntry::Path(path) => path,
            GraphEntry::Detailed { spec } => spec,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Expression case files: lists of expressions with bindings and expected results.
pub mod expressions {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.expressions)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.expressions, "expression", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.expressions, "expression", name)?;
        Ok(resolve_path(rel))
    }
}

/// Serialised host graphs.
pub mod graphs {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.graphs)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.graphs, "graph", name)?;
        super::load_json(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.graphs, "graph", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}
