//! Single-instruction evaluation.

use super::ops::{BinaryEval, UnaryEval};
use super::{Action, Context, FunctionTable, invoke_fn};
use crate::env::Environment;
use crate::error::InterpError;
use crate::program::{Arity, Function, Instruction, Opcode, Operation};
use crate::value::Value;
use tracing::debug;

/// Executes one instruction of the current activation.
///
/// # Arguments
/// * `instr` - The instruction to execute
/// * `env` - Variables of the current activation
/// * `ctx` - Global function table, output sink and call depth
/// * `locals` - Functions defined inside the current function's body
///
/// # Returns
/// * `Ok(Action)` - Where execution continues
/// * `Err(InterpError)` - If the instruction is ill-formed or fails at runtime
pub(super) fn execute<'p>(
    instr: &'p Instruction,
    env: &mut Environment,
    ctx: &mut Context<'p, '_>,
    locals: &FunctionTable<'p>,
) -> Result<Action<'p>, InterpError> {
    match instr {
        Instruction::Label(_) | Instruction::Function(_) => Ok(Action::Next),
        Instruction::Const { dest, value, .. } => {
            debug!("Executing constant: {} = {:?}", dest, value);
            ctx.executed += 1;
            env.set(dest.as_str(), Value::from(value));
            Ok(Action::Next)
        }
        Instruction::Operation(operation) => {
            debug!("Executing operation: {:?}", operation);
            ctx.executed += 1;
            execute_operation(operation, env, ctx, locals)
        }
    }
}

fn execute_operation<'p>(
    operation: &'p Operation,
    env: &mut Environment,
    ctx: &mut Context<'p, '_>,
    locals: &FunctionTable<'p>,
) -> Result<Action<'p>, InterpError> {
    let Operation { op, args, .. } = operation;
    let arity = op.arity();
    if !arity.accepts(args.len()) {
        return Err(InterpError::arity(format!("`{op}`"), arity, args.len()));
    }

    match op {
        Opcode::Unary(unop) => {
            let dest = destination(operation)?;
            let result = unop.eval(env.get(&args[0])?)?;
            env.set(dest, result);
            Ok(Action::Next)
        }
        Opcode::Binary(binop) => {
            let dest = destination(operation)?;
            let result = binop.eval(env.get(&args[0])?, env.get(&args[1])?)?;
            env.set(dest, result);
            Ok(Action::Next)
        }
        Opcode::Print => {
            let values = args
                .iter()
                .map(|arg| env.get(arg).map(Value::to_string))
                .collect::<Result<Vec<_>, _>>()?;
            writeln!(ctx.out, "{}", values.join(" "))?;
            Ok(Action::Next)
        }
        Opcode::Jmp => Ok(Action::Jump(&args[0])),
        Opcode::Br => {
            let target = if env.get(&args[0])?.as_bool()? {
                &args[1]
            } else {
                &args[2]
            };
            debug!("Branch taken to `{}`", target);
            Ok(Action::Jump(target))
        }
        Opcode::Call => {
            call(operation, env, ctx, locals)?;
            Ok(Action::Next)
        }
        Opcode::Ret => {
            if let Some(arg) = args.first() {
                let value = env.get(arg)?.clone();
                env.set_return(value);
            }
            Ok(Action::End)
        }
        Opcode::Nop => Ok(Action::Next),
    }
}

fn destination(operation: &Operation) -> Result<&str, InterpError> {
    operation
        .dest
        .as_deref()
        .ok_or_else(|| InterpError::MissingDestination(operation.op.to_string()))
}

/// Calls the function named by the first argument with the remaining ones.
fn call<'p>(
    operation: &'p Operation,
    env: &mut Environment,
    ctx: &mut Context<'p, '_>,
    locals: &FunctionTable<'p>,
) -> Result<(), InterpError> {
    let Some((name, actuals)) = operation.args.split_first() else {
        return Err(InterpError::arity("`call`", Arity::AtLeast(1), 0));
    };
    let callee = lookup(name, locals, ctx.globals)?;
    if actuals.len() != callee.params.len() {
        return Err(InterpError::arity(
            format!("function `{name}`"),
            Arity::Fixed(callee.params.len()),
            actuals.len(),
        ));
    }

    let mut callee_env = Environment::new();
    for (param, actual) in callee.params.iter().zip(actuals) {
        callee_env.set(param.name.as_str(), env.get(actual)?.clone());
    }

    debug!("Calling `{}`", name);
    let result = ctx.nested(|ctx| invoke_fn(ctx, callee, callee_env))?;

    match (&operation.dest, callee.return_type) {
        (Some(dest), Some(_)) => {
            let value = result.ok_or_else(|| InterpError::MissingReturn(name.clone()))?;
            env.set(dest.as_str(), value);
        }
        (Some(_), None) => return Err(InterpError::MissingReturn(name.clone())),
        (None, _) => {}
    }
    Ok(())
}

/// Nested functions of the running function shadow top-level ones.
fn lookup<'p>(
    name: &str,
    locals: &FunctionTable<'p>,
    globals: &FunctionTable<'p>,
) -> Result<&'p Function, InterpError> {
    locals
        .get(name)
        .or_else(|| globals.get(name))
        .copied()
        .ok_or_else(|| InterpError::FunctionNotFound(name.to_string()))
}
