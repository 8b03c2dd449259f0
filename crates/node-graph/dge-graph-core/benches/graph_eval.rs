use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dge_api_core::{HostGraph, NodeKind, Operation, PlugPath, Value};
use dge_graph_core::{evaluate_all, topo_order, GraphRuntime, GraphSpec};

/// `len` add nodes in series, each adding 1 to a vector.
fn vector_chain(len: usize) -> GraphSpec {
    let mut g = GraphSpec::default();
    g.add_node("loc", NodeKind::Transform).unwrap();
    g.set_static_input(&PlugPath::new("loc", "translate"), &Value::vec3(1.0, 2.0, 3.0))
        .unwrap();
    let mut source = PlugPath::new("loc", "translate");
    for _ in 0..len {
        let id = g
            .create_node(NodeKind::PlusMinusAverage, Some(Operation::Sum))
            .unwrap();
        g.connect(&source, &PlugPath::new(id.clone(), "input1")).unwrap();
        g.set_static_input(&PlugPath::new(id.clone(), "input2"), &Value::Vec3([1.0; 3]))
            .unwrap();
        source = PlugPath::new(id, "output");
    }
    g
}

fn bench_graph(c: &mut Criterion) {
    let g = vector_chain(256);
    c.bench_function("topo_order_256", |b| b.iter(|| topo_order(black_box(&g.nodes)).unwrap()));

    let mut rt = GraphRuntime::default();
    c.bench_function("evaluate_chain_256", |b| {
        b.iter(|| evaluate_all(&mut rt, black_box(&g)).unwrap())
    });

    c.bench_function("build_chain_64", |b| b.iter(|| vector_chain(black_box(64))));
}

criterion_group!(benches, bench_graph);
criterion_main!(benches);
