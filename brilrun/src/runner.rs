//! Program entry: global table, `main` lookup and argument binding.

use crate::env::Environment;
use crate::error::InterpError;
use crate::interpreter::{Context, function_table, invoke_fn};
use crate::program::{Arity, Program};
use crate::value::Value;
use num_bigint::BigInt;
use std::io::Write;
use tracing::info;

/// Default limit on nested calls, `main` included.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 100_000;

/// Knobs for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub max_call_depth: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// What a successful run measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Constants and operations executed, across every activation.
    pub dynamic_instructions: u64,
}

/// Runs `main` of `program` once with `args` bound to its parameters.
///
/// Duplicate top-level names, a missing `main` and an argument count that
/// differs from `main`'s parameter count are all reported before any
/// instruction executes. Program output is written to `out`, which is
/// flushed whether or not the run succeeds.
pub fn run_program(
    program: &Program,
    args: Vec<Value>,
    config: &RunConfig,
    out: &mut dyn Write,
) -> Result<RunStats, InterpError> {
    let globals = function_table(&program.functions)?;
    let main = globals
        .get("main")
        .copied()
        .ok_or(InterpError::MissingEntryPoint)?;
    if main.params.len() != args.len() {
        return Err(InterpError::arity(
            "entry function `main`",
            Arity::Fixed(main.params.len()),
            args.len(),
        ));
    }

    let mut env = Environment::new();
    for (param, value) in main.params.iter().zip(args) {
        env.set(param.name.as_str(), value);
    }

    info!("Running `main` with {} argument(s)", main.params.len());
    let mut ctx = Context::new(&globals, out, config.max_call_depth);
    let result = ctx.nested(|ctx| invoke_fn(ctx, main, env));
    // Output printed before a failure is still delivered; the run error wins.
    let flushed = ctx.flush();
    result?;
    flushed?;

    let stats = RunStats {
        dynamic_instructions: ctx.executed(),
    };
    info!("Run finished after {} instruction(s)", stats.dynamic_instructions);
    Ok(stats)
}

/// Converts one command-line token into a value.
///
/// Tokens made only of ASCII digits are integers; `true` and `false` are
/// booleans. Anything else is rejected.
pub fn parse_arg(token: &str) -> Result<Value, InterpError> {
    match token {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
            .parse::<BigInt>()
            .map(Value::Int)
            .map_err(|_| InterpError::InvalidExternalArgument(token.to_string())),
        _ => Err(InterpError::InvalidExternalArgument(token.to_string())),
    }
}

pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Value>, InterpError> {
    tokens.iter().map(|token| parse_arg(token.as_ref())).collect()
}
