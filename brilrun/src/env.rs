//! Per-call variable storage.
//!
//! An [`Environment`] is created for every function activation and dropped
//! when the activation finishes. There is no parent scope: a callee never
//! sees its caller's variables.

use crate::error::InterpError;
use crate::value::Value;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default)]
pub struct Environment {
    vars: HashMap<String, Value>,
    /// Reserved slot written by `ret` and read by the caller.
    ret: Option<Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the value bound to `name` in this activation.
    pub fn get(&self, name: &str) -> Result<&Value, InterpError> {
        self.vars
            .get(name)
            .ok_or_else(|| InterpError::UndefinedVariable(name.to_string()))
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        trace!("{} <- {}", name, value);
        self.vars.insert(name, value);
    }

    pub fn set_return(&mut self, value: Value) {
        self.ret = Some(value);
    }

    pub fn take_return(&mut self) -> Option<Value> {
        self.ret.take()
    }
}
