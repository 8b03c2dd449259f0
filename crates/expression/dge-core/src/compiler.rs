//! Entry points: parse, then fold or wire.

use std::fmt;

use dge_api_core::{HostGraph, NodeId, PlugPath, Value};
use log::{debug, warn};

use crate::builder::Builder;
use crate::env::{Binding, Environment};
use crate::error::DgeResult;
use crate::notes::Note;
use crate::operand::Operand;
use crate::options::CompileOptions;
use crate::parser::parse;

/// Where the result of an expression lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Every operand was literal; nothing was created.
    Constant(Value),
    /// A plug on the host graph carrying the result.
    Plug(PlugPath),
}

impl Output {
    pub fn constant(&self) -> Option<Value> {
        match self {
            Output::Constant(v) => Some(*v),
            Output::Plug(_) => None,
        }
    }

    pub fn plug(&self) -> Option<&PlugPath> {
        match self {
            Output::Plug(p) => Some(p),
            Output::Constant(_) => None,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Constant(v) => write!(f, "{v}"),
            Output::Plug(p) => write!(f, "{p}"),
        }
    }
}

/// Result of one compile call.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub output: Output,
    /// Nodes created by this call, in creation order. Reused nodes appear once.
    pub nodes: Vec<NodeId>,
    /// Container holding `nodes`, when one was requested.
    pub container: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile `expression` against `env`, creating nodes on `host` as needed.
    ///
    /// Each call parses from scratch and shares nothing with earlier calls.
    /// On error, nodes created before the failure stay on the host. With
    /// [`CompileOptions::container`] set, the created nodes are grouped once
    /// the expression has compiled.
    pub fn compile_and_evaluate<H: HostGraph + ?Sized>(
        &self,
        expression: &str,
        env: &Environment,
        host: &mut H,
    ) -> DgeResult<Compiled> {
        let program = parse(expression)?;
        debug!(
            "compiling '{}' ({} instructions, {} bindings)",
            expression.trim(),
            program.instructions.len(),
            env.len()
        );

        let mut builder = Builder::new(host, &self.options, env, expression);
        let result = builder.run(&program.instructions)?;
        let output = match &program.assignment {
            Some(target) => Output::Plug(builder.assign(target, &result)?),
            None => match result {
                Operand::Literal(v) => Output::Constant(v),
                Operand::Plug { path, .. } => Output::Plug(path),
            },
        };
        let nodes = builder.into_created();
        let container = match &self.options.container {
            Some(name) => Some(self.package(name, expression, env, &nodes, host)?),
            None => None,
        };

        debug!(
            "compiled '{}' -> {output} ({} nodes)",
            expression.trim(),
            nodes.len()
        );
        Ok(Compiled {
            output,
            nodes,
            container,
        })
    }

    /// Group `nodes` into a new container, note the expression on it and
    /// publish every plug binding under its variable name.
    fn package<H: HostGraph + ?Sized>(
        &self,
        name: &str,
        expression: &str,
        env: &Environment,
        nodes: &[NodeId],
        host: &mut H,
    ) -> DgeResult<NodeId> {
        let container = host.create_container(name)?;
        for node in nodes {
            host.add_to_container(&container, node)?;
        }
        if self.options.annotate {
            let text = Note {
                header: &self.options.note_header,
                expression,
                operation: expression.trim(),
                bindings: env,
            }
            .to_string();
            if let Err(err) = host.annotate(&container, &text) {
                warn!("could not annotate '{container}': {err}");
            }
        }
        for (var, binding) in env.sorted() {
            if let Binding::Plug(plug) = binding {
                let plug = host.canonicalize(plug)?;
                host.publish(&container, var, &plug)?;
            }
        }
        debug!("grouped {} nodes into '{container}'", nodes.len());
        Ok(container)
    }
}

/// Compile with default options and return only the output.
pub fn dge<H: HostGraph + ?Sized>(
    expression: &str,
    env: &Environment,
    host: &mut H,
) -> DgeResult<Output> {
    Compiler::default()
        .compile_and_evaluate(expression, env, host)
        .map(|compiled| compiled.output)
}
