//! Compiler configuration.

use serde::{Deserialize, Serialize};

/// Knobs controlling how expressions become nodes. Defaults suit rigging use:
/// fold what can be folded, share repeated sub-operations and leave a note on
/// every generated node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Compute operators whose operands are all literal instead of creating nodes.
    pub fold_constants: bool,
    /// Share one node between identical sub-operations of a single call.
    pub reuse_nodes: bool,
    /// Attach a descriptive note to every created node.
    pub annotate: bool,
    /// First line of each note.
    pub note_header: String,
    /// Group every node a call creates into a container of this name and
    /// publish the call's plug bindings on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            fold_constants: true,
            reuse_nodes: true,
            annotate: true,
            note_header: "Node generated by dge".to_string(),
            container: None,
        }
    }
}

impl CompileOptions {
    /// Defaults without annotations.
    pub fn quiet() -> Self {
        Self {
            annotate: false,
            ..Self::default()
        }
    }

    /// Every operator becomes a node, even on literal operands.
    pub fn unfolded() -> Self {
        Self {
            fold_constants: false,
            ..Self::default()
        }
    }

    pub fn in_container(mut self, name: impl Into<String>) -> Self {
        self.container = Some(name.into());
        self
    }
}
