//! dge-api-core: values, plugs and the host-graph capability shared by the
//! expression compiler and any graph that hosts its nodes.

pub mod coercion;
pub mod host;
pub mod kind;
pub mod plug_path;
pub mod schema;
pub mod value;

pub use host::{HostError, HostGraph, NodeId};
pub use kind::{NodeKind, Operation};
pub use plug_path::PlugPath;
pub use schema::{AttributeSpec, Direction, NodeSignature};
pub use value::{Arity, Value};
