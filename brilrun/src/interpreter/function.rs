use super::instruction::execute;
use super::{Action, Context, FunctionTable, function_table};
use crate::env::Environment;
use crate::error::InterpError;
use crate::program::{Function, Instruction};
use crate::value::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// One activation of a function.
#[derive(Debug)]
pub struct FnInterpreter<'p> {
    func: &'p Function,
    env: Environment,
    locals: FunctionTable<'p>,
    labels: HashMap<&'p str, usize>,
}

impl<'p> FnInterpreter<'p> {
    /// Prepares an activation of `func` with its parameters already bound in `env`.
    ///
    /// Labels and nested functions are collected up front. When a label is
    /// repeated, jumps go to its first occurrence.
    pub fn new(func: &'p Function, env: Environment) -> Result<Self, InterpError> {
        let mut labels = HashMap::new();
        for (pos, instr) in func.instrs.iter().enumerate() {
            if let Instruction::Label(label) = instr {
                labels.entry(label.as_str()).or_insert(pos);
            }
        }
        let locals = function_table(func.instrs.iter().filter_map(|instr| match instr {
            Instruction::Function(nested) => Some(nested),
            _ => None,
        }))?;
        Ok(Self {
            func,
            env,
            locals,
            labels,
        })
    }

    /// Runs the body until it returns or falls off the end.
    pub fn run(mut self, ctx: &mut Context<'p, '_>) -> Result<Option<Value>, InterpError> {
        info!("Starting interpretation of `{}`", self.func.name);
        let func = self.func;
        let mut pc = 0;
        while let Some(instr) = func.instrs.get(pc) {
            match execute(instr, &mut self.env, ctx, &self.locals)? {
                Action::Next => pc += 1,
                Action::Jump(label) => pc = self.target(label)?,
                Action::End => break,
            }
        }
        let result = self.env.take_return();
        debug!("`{}` returned {:?}", func.name, result);
        Ok(result)
    }

    fn target(&self, label: &str) -> Result<usize, InterpError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| InterpError::LabelNotFound(label.to_string()))
    }
}

/// Runs `func` in a fresh activation over `env`.
pub(crate) fn invoke_fn<'p>(
    ctx: &mut Context<'p, '_>,
    func: &'p Function,
    env: Environment,
) -> Result<Option<Value>, InterpError> {
    FnInterpreter::new(func, env)?.run(ctx)
}
