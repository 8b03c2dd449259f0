//! dge: compile arithmetic expressions into networks of host graph nodes.
//!
//! ```text
//! expression ──tokenize──▶ tokens ──parse──▶ postfix program ──evaluate──▶ Output
//!                                                                 │
//!                                                     HostGraph::create_node / connect
//! ```
//!
//! Operators whose operands are all literal are folded. Anything touching a
//! plug becomes a node on the host, with scalars broadcast across vector
//! operands.

mod builder;
pub mod compiler;
pub mod env;
pub mod error;
pub mod function;
pub mod notes;
mod operand;
pub mod options;
pub mod parser;
pub mod token;

pub use compiler::{dge, Compiled, Compiler, Output};
pub use env::{Binding, Environment};
pub use error::{DgeError, DgeResult};
pub use function::Function;
pub use options::CompileOptions;
pub use parser::{parse, Instruction, Program};

pub use dge_api_core::{Arity, HostError, HostGraph, PlugPath, Value};
