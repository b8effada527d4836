use crate::error::InterpError;
use crate::program::Literal;
use num_bigint::BigInt;
use std::fmt;

/// Runtime values that can be stored and manipulated by the interpreter.
///
/// Values are immutable. Rebinding a variable replaces its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Arbitrary-precision signed integer
    Int(BigInt),
    /// Boolean value
    Bool(bool),
}

impl Value {
    /// Name of the value's type, as written in Bril programs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }

    /// Interpret as an integer, failing with a type mismatch otherwise.
    pub fn as_int(&self) -> Result<&BigInt, InterpError> {
        match self {
            Value::Int(i) => Ok(i),
            other => Err(other.mismatch("int")),
        }
    }

    /// Interpret as a boolean, failing with a type mismatch otherwise.
    pub fn as_bool(&self) -> Result<bool, InterpError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> InterpError {
        InterpError::TypeMismatch {
            expected,
            found: format!("{} `{}`", self.type_name(), self),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Int(i) => Value::Int(i.clone()),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}
