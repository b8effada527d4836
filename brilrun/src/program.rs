//! In-memory model of a Bril program.
//!
//! Programs are loaded either from the canonical JSON form ([`raw`]) or from
//! the text form ([`text`]). Both front ends produce the same raw structures,
//! which are validated into this model by [`raw::RawProgram::into_program`].

pub mod raw;
pub mod text;

use crate::error::InterpError;
use num_bigint::BigInt;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// An ordered collection of top-level functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    /// Loads a program from its canonical JSON form.
    ///
    /// Imports can only be resolved relative to a file; see [`crate::load_file`].
    pub fn from_json(src: &str) -> anyhow::Result<Program> {
        let raw: raw::RawProgram = serde_json::from_str(src)?;
        Self::without_imports(raw)
    }

    /// Loads a program from the Bril text form.
    pub fn from_text(src: &str) -> anyhow::Result<Program> {
        Self::without_imports(text::parse(src)?)
    }

    fn without_imports(raw: raw::RawProgram) -> anyhow::Result<Program> {
        if let Some(import) = raw.imports.first() {
            anyhow::bail!("cannot resolve import `{import}` without a source file");
        }
        Ok(raw.into_program()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub instrs: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Bool,
}

impl FromStr for Type {
    type Err = InterpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Type::Int),
            "bool" => Ok(Type::Bool),
            other => Err(InterpError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
        }
    }
}

/// A constant literal. Integers are normalized to arbitrary precision when
/// the program is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(BigInt),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Jump target. Has no effect when executed.
    Label(String),
    Const {
        dest: String,
        ty: Type,
        value: Literal,
    },
    Operation(Operation),
    /// Helper function visible only inside the enclosing function's calls.
    Function(Function),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: Opcode,
    pub args: SmallVec<[String; 3]>,
    pub dest: Option<String>,
    pub ty: Option<Type>,
}

/// The closed set of operations understood by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Unary(UnOp),
    Binary(BinOp),
    Print,
    Jmp,
    Br,
    Call,
    Ret,
    Nop,
}

/// Value operations with a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Id,
    Not,
}

/// Value operations with two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Mul,
    Sub,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    And,
    Or,
}

impl Opcode {
    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Unary(UnOp::Id) => "id",
            Opcode::Unary(UnOp::Not) => "not",
            Opcode::Binary(BinOp::Add) => "add",
            Opcode::Binary(BinOp::Mul) => "mul",
            Opcode::Binary(BinOp::Sub) => "sub",
            Opcode::Binary(BinOp::Div) => "div",
            Opcode::Binary(BinOp::Lt) => "lt",
            Opcode::Binary(BinOp::Le) => "le",
            Opcode::Binary(BinOp::Gt) => "gt",
            Opcode::Binary(BinOp::Ge) => "ge",
            Opcode::Binary(BinOp::Eq) => "eq",
            Opcode::Binary(BinOp::And) => "and",
            Opcode::Binary(BinOp::Or) => "or",
            Opcode::Print => "print",
            Opcode::Jmp => "jmp",
            Opcode::Br => "br",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::Nop => "nop",
        }
    }

    /// Number of arguments the opcode accepts.
    pub fn arity(self) -> Arity {
        match self {
            Opcode::Nop => Arity::Fixed(0),
            Opcode::Unary(_) | Opcode::Jmp => Arity::Fixed(1),
            Opcode::Binary(_) => Arity::Fixed(2),
            Opcode::Br => Arity::Fixed(3),
            Opcode::Print => Arity::AtLeast(0),
            Opcode::Call => Arity::AtLeast(1),
            Opcode::Ret => Arity::AtMost(1),
        }
    }
}

impl FromStr for Opcode {
    type Err = InterpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "id" => Opcode::Unary(UnOp::Id),
            "not" => Opcode::Unary(UnOp::Not),
            "add" => Opcode::Binary(BinOp::Add),
            "mul" => Opcode::Binary(BinOp::Mul),
            "sub" => Opcode::Binary(BinOp::Sub),
            "div" => Opcode::Binary(BinOp::Div),
            "lt" => Opcode::Binary(BinOp::Lt),
            "le" => Opcode::Binary(BinOp::Le),
            "gt" => Opcode::Binary(BinOp::Gt),
            "ge" => Opcode::Binary(BinOp::Ge),
            "eq" => Opcode::Binary(BinOp::Eq),
            "and" => Opcode::Binary(BinOp::And),
            "or" => Opcode::Binary(BinOp::Or),
            "print" => Opcode::Print,
            "jmp" => Opcode::Jmp,
            "br" => Opcode::Br,
            "call" => Opcode::Call,
            "ret" => Opcode::Ret,
            "nop" => Opcode::Nop,
            other => return Err(InterpError::UnknownOpcode(other.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument count accepted by an opcode or a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::AtMost(n) => count <= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::AtMost(n) => write!(f, "at most {n}"),
        }
    }
}
