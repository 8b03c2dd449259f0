pub mod eval;
pub mod host;
pub mod topo;
pub mod types;

pub use eval::{eval_node, evaluate_all, GraphRuntime};
pub use topo::topo_order;
pub use types::*;
