//! Per-node evaluation logic for the reference host graph.

use crate::eval::graph_runtime::{GraphRuntime, NodeValues};
use crate::types::NodeSpec;
use dge_api_core::coercion::distance;
use dge_api_core::schema::{signature, NodeSignature};
use dge_api_core::{NodeKind, Operation};
use hashbrown::HashMap;

use super::numeric::{binary_fn, map, unary_fn, zip, Channels};

/// Leaf table of the node being evaluated, addressed through its signature.
struct Leaves<'a> {
    sig: &'static NodeSignature,
    values: &'a mut HashMap<String, f64>,
}

impl Leaves<'_> {
    fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    fn get3(&self, name: &str) -> Channels {
        match self.sig.find(name) {
            Some(attr) => std::array::from_fn(|i| self.get(attr.channel(i))),
            None => [f64::NAN; 3],
        }
    }

    fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    fn set3(&mut self, name: &str, value: Channels) {
        if let Some(attr) = self.sig.find(name) {
            for (i, v) in value.into_iter().enumerate() {
                self.values.insert(attr.channel(i).to_string(), v);
            }
        }
    }
}

/// Evaluate a single node: seed leaves from defaults and statics, pull connected
/// values, compute outputs and store the result in `rt`.
pub fn eval_node(rt: &mut GraphRuntime, spec: &NodeSpec) -> Result<(), String> {
    let sig = signature(spec.kind);
    let mut values: HashMap<String, f64> = sig
        .leaves()
        .map(|leaf| {
            let v = spec
                .params
                .statics
                .get(leaf.name)
                .copied()
                .unwrap_or(leaf.default);
            (leaf.name.to_string(), v)
        })
        .collect();

    for (dest, conn) in &spec.inputs {
        let v = rt
            .values
            .get(&conn.node_id)
            .and_then(|node| node.leaves.get(&conn.attribute))
            .copied()
            .ok_or_else(|| {
                format!(
                    "{}.{} reads unknown plug {}.{}",
                    spec.id, dest, conn.node_id, conn.attribute
                )
            })?;
        values.insert(dest.clone(), v);
    }

    let mut leaves = Leaves {
        sig,
        values: &mut values,
    };
    evaluate_kind(spec, &mut leaves)?;

    rt.values.insert(
        spec.id.clone(),
        NodeValues {
            kind: spec.kind,
            leaves: values,
        },
    );
    Ok(())
}

fn unsupported(spec: &NodeSpec, op: Option<Operation>) -> String {
    format!("{} '{}' cannot evaluate operation {:?}", spec.kind, spec.id, op)
}

fn evaluate_kind(spec: &NodeSpec, leaves: &mut Leaves<'_>) -> Result<(), String> {
    let op = spec.effective_operation();
    match spec.kind {
        NodeKind::PlusMinusAverage | NodeKind::MultiplyDivide => {
            let f = op
                .filter(|o| spec.kind.accepts(*o))
                .and_then(binary_fn)
                .ok_or_else(|| unsupported(spec, op))?;
            let out = zip(leaves.get3("input1"), leaves.get3("input2"), f);
            leaves.set3("output", out);
        }
        NodeKind::Condition => {
            let first = leaves.get("firstTerm");
            let second = leaves.get("secondTerm");
            let pass = op
                .and_then(|o| o.compare(first, second))
                .ok_or_else(|| unsupported(spec, op))?;
            let chosen = if pass {
                leaves.get3("colorIfTrue")
            } else {
                leaves.get3("colorIfFalse")
            };
            leaves.set3("outColor", chosen);
        }
        NodeKind::Clamp => {
            let input = leaves.get3("input");
            let lo = leaves.get3("min");
            let hi = leaves.get3("max");
            let out: Channels = std::array::from_fn(|i| input[i].max(lo[i]).min(hi[i]));
            leaves.set3("output", out);
        }
        NodeKind::Blend => {
            let a = leaves.get3("input1");
            let b = leaves.get3("input2");
            let t = leaves.get("blender");
            let out: Channels = std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t);
            leaves.set3("output", out);
        }
        NodeKind::Trigonometry | NodeKind::Unary => {
            let f = op
                .filter(|o| spec.kind.accepts(*o))
                .and_then(unary_fn)
                .ok_or_else(|| unsupported(spec, op))?;
            let out = map(leaves.get3("input"), f);
            leaves.set3("output", out);
        }
        NodeKind::Distance => {
            let d = distance(leaves.get3("point1"), leaves.get3("point2"));
            leaves.set("distance", d);
        }
        NodeKind::Transform => {}
    }
    Ok(())
}
