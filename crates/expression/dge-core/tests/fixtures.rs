//! Table-driven expression cases loaded from `fixtures/expressions`.

mod common;

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use dge::{CompileOptions, Compiler, DgeError, Environment, Value};
use serde::Deserialize;

use common::{host_with, plug, read};
use dge_api_core::HostGraph;

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    expression: String,
    #[serde(default)]
    env: Environment,
    #[serde(default)]
    transforms: Vec<String>,
    #[serde(default)]
    inputs: BTreeMap<String, Value>,
    #[serde(default)]
    expect: Option<Value>,
    #[serde(default)]
    nodes: Option<usize>,
    #[serde(default)]
    error: Option<String>,
}

fn error_kind(err: &DgeError) -> &'static str {
    match err {
        DgeError::Parse { .. } => "Parse",
        DgeError::UnknownIdentifier { .. } => "UnknownIdentifier",
        DgeError::UnsupportedOperation { .. } => "UnsupportedOperation",
        DgeError::ArityMismatch { .. } => "ArityMismatch",
        DgeError::TypeMismatch { .. } => "TypeMismatch",
        DgeError::InvalidAssignment { .. } => "InvalidAssignment",
        DgeError::InvalidPlug { .. } => "InvalidPlug",
        DgeError::Host(_) => "Host",
    }
}

fn run_case(file: &str, case: &Case, options: &CompileOptions) {
    let label = format!("{file}/{} ({:?})", case.name, case.expression);
    let names: Vec<&str> = case.transforms.iter().map(String::as_str).collect();
    let mut g = host_with(&names);
    for (path, value) in &case.inputs {
        g.set_static_input(&plug(path), value)
            .unwrap_or_else(|e| panic!("{label}: bad input {path}: {e}"));
    }

    let result = Compiler::new(options.clone()).compile_and_evaluate(&case.expression, &case.env, &mut g);

    match (&case.error, result) {
        (Some(kind), Err(err)) => assert_eq!(error_kind(&err), kind, "{label}: {err}"),
        (Some(kind), Ok(compiled)) => {
            panic!("{label}: expected {kind} error, got {}", compiled.output)
        }
        (None, Err(err)) => panic!("{label}: unexpected error {err}"),
        (None, Ok(compiled)) => {
            if options.fold_constants {
                if let Some(n) = case.nodes {
                    assert_eq!(compiled.nodes.len(), n, "{label}: node count");
                }
            }
            assert_eq!(
                compiled.nodes.len(),
                common::generated(&g),
                "{label}: reported nodes match the host"
            );
            let expected = case
                .expect
                .unwrap_or_else(|| panic!("{label}: case has neither expect nor error"));
            let actual = read(&g, &compiled.output);
            assert_eq!(actual.arity(), expected.arity(), "{label}: arity");
            for i in 0..3 {
                assert_relative_eq!(
                    actual.channel(i),
                    expected.channel(i),
                    epsilon = 1e-9,
                    max_relative = 1e-9
                );
            }
        }
    }
}

fn run_file(name: &str) {
    let file: CaseFile = dge_test_fixtures::expressions::load(name).expect("fixture loads");
    assert!(!file.cases.is_empty(), "{name} has no cases");
    for case in &file.cases {
        run_case(name, case, &CompileOptions::default());
    }
}

#[test]
fn arithmetic_cases() {
    run_file("arithmetic");
}

#[test]
fn conditional_cases() {
    run_file("conditionals");
}

#[test]
fn function_cases() {
    run_file("functions");
}

#[test]
fn vector_cases() {
    run_file("vectors");
}

#[test]
fn error_cases() {
    run_file("errors");
}

/// Wiring every operator must agree with folding it.
#[test]
fn unfolded_graphs_match_folded_results() {
    for name in dge_test_fixtures::expressions::keys() {
        let file: CaseFile = dge_test_fixtures::expressions::load(&name).expect("fixture loads");
        for case in file.cases.iter().filter(|c| c.error.is_none()) {
            run_case(&name, case, &CompileOptions::unfolded());
        }
    }
}
