//! Serialized shape of a Bril program.
//!
//! These structures mirror the canonical JSON form one to one. The text
//! parser builds the same structures, so validation into the program model
//! happens in a single place.

use super::{Function, Instruction, Literal, Opcode, Operation, Param, Program, Type};
use crate::error::InterpError;
use num_bigint::BigInt;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Deserialize)]
pub struct RawProgram {
    pub functions: Vec<RawFunction>,
    #[serde(default)]
    pub imports: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawFunction {
    pub name: String,
    #[serde(default)]
    pub args: Vec<RawArg>,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub instrs: Vec<RawInstr>,
}

#[derive(Debug, Deserialize)]
pub struct RawArg {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
}

#[derive(Debug)]
pub enum RawInstr {
    Label(String),
    Function(RawFunction),
    Op(RawOp),
}

/// A constant or an operation.
///
/// Canonical Bril keeps call targets in `funcs` and jump targets in `labels`.
/// They are folded into the positional argument list (`funcs`, then `args`,
/// then `labels`) when the instruction is validated.
#[derive(Debug, Default, Deserialize)]
pub struct RawOp {
    pub op: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub funcs: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub value: Option<Literal>,
}

impl<'de> Deserialize<'de> for RawInstr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let object = value
            .as_object()
            .ok_or_else(|| D::Error::custom("instruction must be an object"))?;
        if let Some(label) = object.get("label") {
            let label = label
                .as_str()
                .ok_or_else(|| D::Error::custom("label must be a string"))?;
            return Ok(RawInstr::Label(label.to_string()));
        }
        if object.contains_key("instrs") {
            return serde_json::from_value(value)
                .map(RawInstr::Function)
                .map_err(D::Error::custom);
        }
        serde_json::from_value(value)
            .map(RawInstr::Op)
            .map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Literal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Bool(b) => Ok(Literal::Bool(b)),
            // With `arbitrary_precision` the number keeps its source digits.
            serde_json::Value::Number(n) => n
                .to_string()
                .parse::<BigInt>()
                .map(Literal::Int)
                .map_err(|_| D::Error::custom(format!("`{n}` is not an integer literal"))),
            other => Err(D::Error::custom(format!("invalid literal `{other}`"))),
        }
    }
}

impl RawProgram {
    /// Validates the raw form into a [`Program`].
    ///
    /// Opcode and type names are resolved here, so an unknown opcode is
    /// reported before anything executes.
    pub fn into_program(self) -> Result<Program, InterpError> {
        let functions = self
            .functions
            .into_iter()
            .map(RawFunction::into_function)
            .collect::<Result<_, _>>()?;
        Ok(Program { functions })
    }
}

impl RawFunction {
    fn into_function(self) -> Result<Function, InterpError> {
        let params = self
            .args
            .into_iter()
            .map(|arg| -> Result<Param, InterpError> {
                Ok(Param {
                    name: arg.name,
                    ty: arg.ty.as_deref().map(str::parse::<Type>).transpose()?,
                })
            })
            .collect::<Result<_, InterpError>>()?;
        let instrs = self
            .instrs
            .into_iter()
            .map(RawInstr::into_instruction)
            .collect::<Result<_, _>>()?;
        Ok(Function {
            name: self.name,
            params,
            return_type: self.ty.as_deref().map(str::parse::<Type>).transpose()?,
            instrs,
        })
    }
}

impl RawInstr {
    fn into_instruction(self) -> Result<Instruction, InterpError> {
        match self {
            RawInstr::Label(label) => Ok(Instruction::Label(label)),
            RawInstr::Function(function) => Ok(Instruction::Function(function.into_function()?)),
            RawInstr::Op(op) => op.into_instruction(),
        }
    }
}

impl RawOp {
    fn into_instruction(self) -> Result<Instruction, InterpError> {
        let ty = self.ty.as_deref().map(str::parse::<Type>).transpose()?;
        if self.op == "const" {
            let malformed = |what: &str| InterpError::Malformed(format!("`const` is missing its {what}"));
            return Ok(Instruction::Const {
                dest: self.dest.ok_or_else(|| malformed("destination"))?,
                ty: ty.ok_or_else(|| malformed("type"))?,
                value: self.value.ok_or_else(|| malformed("value"))?,
            });
        }

        let op: Opcode = self.op.parse()?;
        let args = self
            .funcs
            .into_iter()
            .chain(self.args)
            .chain(self.labels)
            .collect();
        Ok(Instruction::Operation(Operation {
            op,
            args,
            dest: self.dest,
            ty,
        }))
    }
}
