//! Error type shared by the tokenizer, parser and evaluator.

use dge_api_core::HostError;
use thiserror::Error;

pub type DgeResult<T> = Result<T, DgeError>;

/// Every way compiling an expression can fail. All failures are fatal and
/// surface synchronously; nothing is retried and no partial result is kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DgeError {
    /// Malformed expression syntax.
    #[error("parse error at position {position}: {message} (near '{fragment}')")]
    Parse {
        message: String,
        position: usize,
        fragment: String,
    },

    /// An identifier has no binding in the environment.
    #[error("invalid identifier '{name}'")]
    UnknownIdentifier { name: String },

    /// A function name outside the built-in table.
    #[error("unsupported function '{name}'")]
    UnsupportedOperation { name: String },

    /// A built-in called with the wrong number of arguments.
    #[error("{function}() takes {expected} argument(s) but {actual} were given")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// A vector operand where only scalars are meaningful.
    #[error("{context} requires scalar operands, got vector '{operand}'")]
    TypeMismatch { context: String, operand: String },

    /// The left-hand side of `name = ...` cannot receive the result.
    #[error("cannot assign to '{name}': {reason}")]
    InvalidAssignment { name: String, reason: String },

    /// An environment plug string that does not parse.
    #[error("invalid plug '{path}' for '{name}': {reason}")]
    InvalidPlug {
        name: String,
        path: String,
        reason: String,
    },

    /// The host graph refused a node or connection.
    #[error("host graph error: {0}")]
    Host(#[from] HostError),
}

impl DgeError {
    /// Build a parse error pointing at `position` in `source`.
    pub(crate) fn parse_at(source: &str, position: usize, message: impl Into<String>) -> Self {
        let safe = position.min(source.len());
        let fragment: String = source[safe..].chars().take(12).collect();
        DgeError::Parse {
            message: message.into(),
            position: safe,
            fragment: if fragment.is_empty() {
                "end of input".to_string()
            } else {
                fragment
            },
        }
    }
}
