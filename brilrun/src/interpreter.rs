//! This module provides the execution engine.
//!
//! A run is a depth-first walk over function activations. Every activation
//! owns its [`Environment`](crate::env::Environment) and its table of nested
//! functions. The table of top-level functions and the output sink live in a
//! [`Context`] that is threaded through every call.

mod function;
mod instruction;
mod ops;

pub(crate) use function::invoke_fn;

use crate::error::InterpError;
use crate::program::Function;
use std::collections::HashMap;
use std::io::Write;

/// Minimum stack space to keep available before entering a call.
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate each time the host stack has to grow.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Functions visible by name.
pub type FunctionTable<'p> = HashMap<&'p str, &'p Function>;

/// Builds a function table, rejecting two functions with the same name.
pub(crate) fn function_table<'p>(
    functions: impl IntoIterator<Item = &'p Function>,
) -> Result<FunctionTable<'p>, InterpError> {
    let mut table = FunctionTable::new();
    for function in functions {
        if table.insert(function.name.as_str(), function).is_some() {
            return Err(InterpError::DuplicateFunction(function.name.clone()));
        }
    }
    Ok(table)
}

/// The result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action<'p> {
    Next,
    Jump(&'p str),
    End,
}

/// State shared by every activation of a run.
pub(crate) struct Context<'p, 'o> {
    globals: &'p FunctionTable<'p>,
    out: &'o mut dyn Write,
    depth: usize,
    max_depth: usize,
    executed: u64,
}

impl<'p, 'o> Context<'p, 'o> {
    pub(crate) fn new(
        globals: &'p FunctionTable<'p>,
        out: &'o mut dyn Write,
        max_depth: usize,
    ) -> Self {
        Self {
            globals,
            out,
            depth: 0,
            max_depth,
            executed: 0,
        }
    }

    /// Runs `f` one call level deeper.
    ///
    /// Fails with [`InterpError::StackOverflow`] once the configured depth is
    /// reached. The host stack is grown on demand so the limit, not the
    /// platform stack size, decides how deep a program may recurse.
    pub(crate) fn nested<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, InterpError>,
    ) -> Result<R, InterpError> {
        if self.depth >= self.max_depth {
            return Err(InterpError::StackOverflow(self.max_depth));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || f(self));
        self.depth -= 1;
        result
    }

    /// Number of constants and operations executed so far.
    pub(crate) fn executed(&self) -> u64 {
        self.executed
    }

    pub(crate) fn flush(&mut self) -> Result<(), InterpError> {
        Ok(self.out.flush()?)
    }
}
