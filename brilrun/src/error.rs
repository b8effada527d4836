//! Errors raised while loading or executing a Bril program.
//!
//! Every variant is fatal. Errors are created where the problem is detected
//! and travel up the call stack unchanged until the run is aborted.

use crate::program::Arity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpError {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("{context} expects {expected} argument(s), but found {found}")]
    ArityMismatch {
        context: String,
        expected: Arity,
        found: usize,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),

    #[error("malformed instruction: {0}")]
    Malformed(String),

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("label `{0}` not found")]
    LabelNotFound(String),

    #[error("function `{0}` not found")]
    FunctionNotFound(String),

    #[error("function `{0}` is defined more than once")]
    DuplicateFunction(String),

    #[error("program has no `main` function")]
    MissingEntryPoint,

    #[error("call to `{0}` expects a result, but the function returned none")]
    MissingReturn(String),

    #[error("`{0}` produces a value but has no destination")]
    MissingDestination(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid argument `{0}`: expected an integer or `true`/`false`")]
    InvalidExternalArgument(String),

    #[error("stack overflow: call depth exceeded the limit of {0}")]
    StackOverflow(usize),

    #[error("failed to write program output")]
    Io(#[from] std::io::Error),
}

impl InterpError {
    pub(crate) fn arity(context: impl Into<String>, expected: Arity, found: usize) -> Self {
        InterpError::ArityMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}
