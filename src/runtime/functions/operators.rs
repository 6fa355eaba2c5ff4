use std::cmp::Ordering;
use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};

use crate::error::RuntimeError;
use crate::linq::BinaryOp;
use crate::runtime::functions::{arg, Builtin};
use crate::runtime::Value;

pub(crate) fn register(routines: &mut HashMap<&'static str, Builtin>) {
    routines.insert("lt", |a| comparison(BinaryOp::LessThan, a));
    routines.insert("le", |a| comparison(BinaryOp::LessThanOrEqual, a));
    routines.insert("gt", |a| comparison(BinaryOp::GreaterThan, a));
    routines.insert("ge", |a| comparison(BinaryOp::GreaterThanOrEqual, a));
    routines.insert("eq", |a| comparison(BinaryOp::Equal, a));
    routines.insert("ne", |a| comparison(BinaryOp::NotEqual, a));
    routines.insert("ltAny", |a| comparison(BinaryOp::LessThan, a));
    routines.insert("leAny", |a| comparison(BinaryOp::LessThanOrEqual, a));
    routines.insert("gtAny", |a| comparison(BinaryOp::GreaterThan, a));
    routines.insert("geAny", |a| comparison(BinaryOp::GreaterThanOrEqual, a));
    routines.insert("eqAny", |a| comparison(BinaryOp::Equal, a));
    routines.insert("neAny", |a| comparison(BinaryOp::NotEqual, a));

    routines.insert("plus", |a| arithmetic_call(BinaryOp::Add, a));
    routines.insert("minus", |a| arithmetic_call(BinaryOp::Subtract, a));
    routines.insert("multiply", |a| arithmetic_call(BinaryOp::Multiply, a));
    routines.insert("divide", |a| arithmetic_call(BinaryOp::Divide, a));
    routines.insert("plusAny", |a| arithmetic_call(BinaryOp::Add, a));
    routines.insert("minusAny", |a| arithmetic_call(BinaryOp::Subtract, a));
    routines.insert("multiplyAny", |a| arithmetic_call(BinaryOp::Multiply, a));
    routines.insert("divideAny", |a| arithmetic_call(BinaryOp::Divide, a));

    routines.insert("not", not);
    routines.insert("lesser", |a| extreme("lesser", Ordering::Less, a));
    routines.insert("greater", |a| extreme("greater", Ordering::Greater, a));
    routines.insert("bitAnd", |a| bitwise("bitAnd", a, |x, y| x & y));
    routines.insert("bitOr", |a| bitwise("bitOr", a, |x, y| x | y));
    routines.insert("bitXor", |a| bitwise("bitXor", a, |x, y| x ^ y));
}

fn pair<'a>(routine: &str, args: &'a [Value]) -> Result<(&'a Value, &'a Value), RuntimeError> {
    Ok((arg(routine, args, 0)?, arg(routine, args, 1)?))
}

fn comparison(op: BinaryOp, args: &[Value]) -> Result<Value, RuntimeError> {
    let (a, b) = pair("comparison", args)?;
    compare(op, a, b)
}

fn arithmetic_call(op: BinaryOp, args: &[Value]) -> Result<Value, RuntimeError> {
    let (a, b) = pair("arithmetic", args)?;
    arithmetic(op, a, b)
}

/// SQL comparison of two values; null when either side is null.
pub fn compare(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    let outcome = match op {
        BinaryOp::Equal => a.sql_eq(b),
        BinaryOp::NotEqual => !a.sql_eq(b),
        _ => {
            let ord = a.compare(b).ok_or_else(|| {
                RuntimeError::type_mismatch(format!("cannot compare {} with {}", a.type_name(), b.type_name()))
            })?;
            match op {
                BinaryOp::LessThan => ord == Ordering::Less,
                BinaryOp::LessThanOrEqual => ord != Ordering::Greater,
                BinaryOp::GreaterThan => ord == Ordering::Greater,
                BinaryOp::GreaterThanOrEqual => ord != Ordering::Less,
                other => return Err(RuntimeError::type_mismatch(format!("{other:?} is not a comparison"))),
            }
        }
    };
    Ok(Value::Bool(outcome))
}

/// `+ - * / %` over numbers. The widest operand kind wins: decimal, then
/// float, then integer. Integer arithmetic is checked.
pub fn arithmetic(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    if !a.is_numeric() || !b.is_numeric() {
        return Err(RuntimeError::type_mismatch(format!(
            "{op:?} of {} and {}",
            a.type_name(),
            b.type_name()
        )));
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => integer(op, *x, *y),
        (Value::Decimal(_), _) | (_, Value::Decimal(_)) => {
            let (x, y) = (a.as_decimal(), b.as_decimal());
            match (x, y) {
                (Some(x), Some(y)) => decimal(op, x, y),
                _ => Err(RuntimeError::type_mismatch("non-finite value in decimal arithmetic")),
            }
        }
        _ => {
            let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            let r = match op {
                BinaryOp::Add => x + y,
                BinaryOp::Subtract => x - y,
                BinaryOp::Multiply => x * y,
                BinaryOp::Divide => x / y,
                BinaryOp::Modulo => x % y,
                other => return Err(RuntimeError::type_mismatch(format!("{other:?} is not arithmetic"))),
            };
            Ok(Value::float(r))
        }
    }
}

fn integer(op: BinaryOp, x: i64, y: i64) -> Result<Value, RuntimeError> {
    let overflow = || RuntimeError::Overflow(format!("{op:?}"));
    let r = match op {
        BinaryOp::Add => x.checked_add(y).ok_or_else(overflow)?,
        BinaryOp::Subtract => x.checked_sub(y).ok_or_else(overflow)?,
        BinaryOp::Multiply => x.checked_mul(y).ok_or_else(overflow)?,
        BinaryOp::Divide => {
            if y == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            x.checked_div(y).ok_or_else(overflow)?
        }
        BinaryOp::Modulo => {
            if y == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            x.checked_rem(y).ok_or_else(overflow)?
        }
        other => return Err(RuntimeError::type_mismatch(format!("{other:?} is not arithmetic"))),
    };
    Ok(Value::Int(r))
}

fn decimal(op: BinaryOp, x: BigDecimal, y: BigDecimal) -> Result<Value, RuntimeError> {
    let r = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Subtract => x - y,
        BinaryOp::Multiply => x * y,
        BinaryOp::Divide | BinaryOp::Modulo if y.is_zero() => return Err(RuntimeError::DivisionByZero),
        BinaryOp::Divide => x / y,
        BinaryOp::Modulo => x % y,
        other => return Err(RuntimeError::type_mismatch(format!("{other:?} is not arithmetic"))),
    };
    Ok(Value::Decimal(r))
}

fn not(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg("not", args, 0)? {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(RuntimeError::invalid_argument("not", format!("expected a boolean, got {}", other.type_name()))),
    }
}

/// The smaller (or larger) of two values; a null side loses to any value.
fn extreme(routine: &str, keep: Ordering, args: &[Value]) -> Result<Value, RuntimeError> {
    let (a, b) = pair(routine, args)?;
    match (a, b) {
        (Value::Null, other) | (other, Value::Null) => Ok(other.clone()),
        _ => {
            let ord = a
                .compare(b)
                .ok_or_else(|| RuntimeError::invalid_argument(routine, "operands are not comparable"))?;
            Ok(if ord == keep || ord == Ordering::Equal { a.clone() } else { b.clone() })
        }
    }
}

fn bitwise(routine: &str, args: &[Value], f: fn(i64, i64) -> i64) -> Result<Value, RuntimeError> {
    match pair(routine, args)? {
        (Value::Null, other) | (other, Value::Null) => Ok(other.clone()),
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(f(*x, *y))),
        (Value::Bytes(x), Value::Bytes(y)) if x.len() == y.len() => Ok(Value::Bytes(
            x.iter().zip(y).map(|(p, q)| f(*p as i64, *q as i64) as u8).collect(),
        )),
        _ => Err(RuntimeError::invalid_argument(routine, "expected two integers or equal-length binaries")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn call(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        crate::runtime::functions::builtin(name).unwrap()(args)
    }

    #[test]
    fn integer_arithmetic_is_checked() {
        assert_eq!(call("plus", &[Value::Int(40), Value::Int(2)]).unwrap(), Value::Int(42));
        assert_eq!(call("divide", &[Value::Int(7), Value::Int(2)]).unwrap(), Value::Int(3));
        assert_eq!(call("divide", &[Value::Int(1), Value::Int(0)]), Err(RuntimeError::DivisionByZero));
        assert!(matches!(call("plus", &[Value::Int(i64::MAX), Value::Int(1)]), Err(RuntimeError::Overflow(_))));
    }

    #[test]
    fn mixed_kinds_widen() {
        let d = Value::Decimal(BigDecimal::from_str("1.5").unwrap());
        assert_eq!(
            call("multiply", &[d, Value::Int(2)]).unwrap(),
            Value::Decimal(BigDecimal::from_str("3.0").unwrap())
        );
        assert_eq!(call("minusAny", &[Value::float(2.5), Value::Int(1)]).unwrap(), Value::float(1.5));
        assert!(matches!(call("plus", &[Value::str("a"), Value::Int(1)]), Err(RuntimeError::TypeMismatch(_))));
    }

    #[test]
    fn comparisons_and_not() {
        assert_eq!(call("lt", &[Value::str("a"), Value::str("b")]).unwrap(), Value::Bool(true));
        assert_eq!(call("eq", &[Value::Int(1), Value::float(1.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call("ge", &[Value::Null, Value::Int(1)]).unwrap(), Value::Null);
        assert_eq!(call("not", &[Value::Null]).unwrap(), Value::Null);
        assert_eq!(call("not", &[Value::Bool(true)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn lesser_and_greater_skip_nulls() {
        assert_eq!(call("lesser", &[Value::Null, Value::Int(3)]).unwrap(), Value::Int(3));
        assert_eq!(call("lesser", &[Value::Int(2), Value::Int(3)]).unwrap(), Value::Int(2));
        assert_eq!(call("greater", &[Value::Int(2), Value::Int(3)]).unwrap(), Value::Int(3));
    }

    #[test]
    fn bit_operations() {
        assert_eq!(call("bitAnd", &[Value::Int(12), Value::Int(10)]).unwrap(), Value::Int(8));
        assert_eq!(call("bitXor", &[Value::Int(12), Value::Int(10)]).unwrap(), Value::Int(6));
        assert_eq!(
            call("bitOr", &[Value::Bytes(vec![1]), Value::Bytes(vec![2])]).unwrap(),
            Value::Bytes(vec![3])
        );
    }
}
