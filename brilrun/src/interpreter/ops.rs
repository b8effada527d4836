use crate::error::InterpError;
use crate::program::{BinOp, UnOp};
use crate::value::Value;
use num_traits::Zero;

/// Trait for evaluating binary operations on values.
pub trait BinaryEval {
    /// Evaluates a binary operation on two values.
    ///
    /// Both operands are checked for the expected type, left first, before
    /// the result is computed. Boolean operations never short-circuit.
    fn eval(&self, left: &Value, right: &Value) -> Result<Value, InterpError>;
}

/// Trait for evaluating unary operations on values.
pub trait UnaryEval {
    fn eval(&self, operand: &Value) -> Result<Value, InterpError>;
}

impl BinaryEval for BinOp {
    fn eval(&self, left: &Value, right: &Value) -> Result<Value, InterpError> {
        let value = match self {
            BinOp::Add => Value::Int(left.as_int()? + right.as_int()?),
            BinOp::Sub => Value::Int(left.as_int()? - right.as_int()?),
            BinOp::Mul => Value::Int(left.as_int()? * right.as_int()?),
            BinOp::Div => {
                let dividend = left.as_int()?;
                let divisor = right.as_int()?;
                if divisor.is_zero() {
                    return Err(InterpError::DivisionByZero);
                }
                // BigInt division truncates toward zero.
                Value::Int(dividend / divisor)
            }
            BinOp::Lt => Value::Bool(left.as_int()? < right.as_int()?),
            BinOp::Le => Value::Bool(left.as_int()? <= right.as_int()?),
            BinOp::Gt => Value::Bool(left.as_int()? > right.as_int()?),
            BinOp::Ge => Value::Bool(left.as_int()? >= right.as_int()?),
            BinOp::Eq => Value::Bool(left.as_int()? == right.as_int()?),
            BinOp::And => Value::Bool(left.as_bool()? & right.as_bool()?),
            BinOp::Or => Value::Bool(left.as_bool()? | right.as_bool()?),
        };
        Ok(value)
    }
}

impl UnaryEval for UnOp {
    fn eval(&self, operand: &Value) -> Result<Value, InterpError> {
        match self {
            UnOp::Id => Ok(operand.clone()),
            UnOp::Not => Ok(Value::Bool(!operand.as_bool()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn int(i: i64) -> Value {
        Value::from(i)
    }

    #[test]
    fn test_int_binary_operations() {
        assert_eq!(BinOp::Add.eval(&int(5), &int(3)).unwrap(), int(8));
        assert_eq!(BinOp::Sub.eval(&int(5), &int(8)).unwrap(), int(-3));
        assert_eq!(BinOp::Mul.eval(&int(-4), &int(6)).unwrap(), int(-24));
    }

    #[test]
    fn test_no_overflow() {
        let max = Value::from(i64::MAX);
        let expected = BigInt::from(i64::MAX) * BigInt::from(i64::MAX);
        assert_eq!(BinOp::Mul.eval(&max, &max).unwrap(), Value::Int(expected));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(BinOp::Div.eval(&int(7), &int(2)).unwrap(), int(3));
        assert_eq!(BinOp::Div.eval(&int(-7), &int(2)).unwrap(), int(-3));
        assert_eq!(BinOp::Div.eval(&int(7), &int(-2)).unwrap(), int(-3));
        assert_eq!(BinOp::Div.eval(&int(-7), &int(-2)).unwrap(), int(3));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            BinOp::Div.eval(&int(10), &int(0)),
            Err(InterpError::DivisionByZero)
        ));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(BinOp::Lt.eval(&int(1), &int(2)).unwrap(), Value::Bool(true));
        assert_eq!(BinOp::Le.eval(&int(2), &int(2)).unwrap(), Value::Bool(true));
        assert_eq!(BinOp::Gt.eval(&int(1), &int(2)).unwrap(), Value::Bool(false));
        assert_eq!(BinOp::Ge.eval(&int(3), &int(2)).unwrap(), Value::Bool(true));
        assert_eq!(BinOp::Eq.eval(&int(3), &int(3)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_eq_requires_integers() {
        let result = BinOp::Eq.eval(&Value::Bool(true), &Value::Bool(true));
        assert!(matches!(result, Err(InterpError::TypeMismatch { expected: "int", .. })));
    }

    #[test]
    fn test_bool_binary_operations() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(BinOp::And.eval(&t, &f).unwrap(), f);
        assert_eq!(BinOp::Or.eval(&t, &f).unwrap(), t);
    }

    #[test]
    fn test_bool_operations_check_both_operands() {
        // `false and 1` is still a type error even though the left side decides.
        let result = BinOp::And.eval(&Value::Bool(false), &int(1));
        assert!(matches!(result, Err(InterpError::TypeMismatch { expected: "bool", .. })));
    }

    #[test]
    fn test_type_mismatch() {
        assert!(BinOp::Add.eval(&int(1), &Value::Bool(true)).is_err());
        assert!(UnOp::Not.eval(&int(1)).is_err());
    }

    #[test]
    fn test_unary_operations() {
        assert_eq!(UnOp::Not.eval(&Value::Bool(true)).unwrap(), Value::Bool(false));
        assert_eq!(UnOp::Id.eval(&int(9)).unwrap(), int(9));
    }
}
