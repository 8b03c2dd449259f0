#![allow(dead_code)]

use dge::{Compiled, Output, PlugPath, Value};
use dge_api_core::{HostGraph, NodeKind};
use dge_graph_core::{evaluate_all, GraphRuntime, GraphSpec};

pub fn plug(s: &str) -> PlugPath {
    PlugPath::parse(s).expect("valid plug")
}

/// A host graph holding one transform per name.
pub fn host_with(transforms: &[&str]) -> GraphSpec {
    let mut g = GraphSpec::default();
    for name in transforms {
        g.add_node(name, NodeKind::Transform).expect("add transform");
    }
    g
}

pub fn set(g: &mut GraphSpec, path: &str, value: impl Into<Value>) {
    g.set_static_input(&plug(path), &value.into())
        .expect("set input");
}

/// Evaluate the host and read `output` back.
pub fn read(g: &GraphSpec, output: &Output) -> Value {
    match output {
        Output::Constant(v) => *v,
        Output::Plug(p) => {
            let mut rt = GraphRuntime::default();
            evaluate_all(&mut rt, g).expect("graph should evaluate");
            rt.read(p).expect("readable output")
        }
    }
}

pub fn read_compiled(g: &GraphSpec, compiled: &Compiled) -> Value {
    read(g, &compiled.output)
}

/// Nodes the compiler created, i.e. everything but user transforms.
pub fn generated(g: &GraphSpec) -> usize {
    g.nodes
        .iter()
        .filter(|n| n.kind != NodeKind::Transform)
        .count()
}
