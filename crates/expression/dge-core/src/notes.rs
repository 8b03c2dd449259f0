//! Text attached to generated nodes.

use std::fmt;

use crate::env::Environment;

/// Note body for one node: the full expression, the sub-operation the node
/// performs and the bindings in effect.
pub struct Note<'a> {
    pub header: &'a str,
    pub expression: &'a str,
    pub operation: &'a str,
    pub bindings: &'a Environment,
}

impl fmt::Display for Note<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        writeln!(f)?;
        writeln!(f, "Expression:")?;
        writeln!(f, "  {}", self.expression.trim())?;
        writeln!(f)?;
        writeln!(f, "Operation:")?;
        write!(f, "  {}", self.operation)?;
        if !self.bindings.is_empty() {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "Bindings:")?;
            for (name, binding) in self.bindings.sorted() {
                write!(f, "\n  {name}: {binding}")?;
            }
        }
        Ok(())
    }
}
