//! The routine library emitted code binds to, looked up by name.
//!
//! Plain routines map argument values to a result. Mutators change the
//! container held by an `Invoke` target in place.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;

use crate::error::RuntimeError;
use crate::runtime::Value;

pub mod cast;
pub mod collection;
pub mod datetime;
pub mod json;
pub mod math;
pub mod operators;
pub mod string;

pub type Builtin = fn(&[Value]) -> Result<Value, RuntimeError>;
pub type Mutator = fn(&mut Value, &[Value]) -> Result<(), RuntimeError>;

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut routines = HashMap::new();
    operators::register(&mut routines);
    string::register(&mut routines);
    math::register(&mut routines);
    datetime::register(&mut routines);
    collection::register(&mut routines);
    json::register(&mut routines);
    cast::register(&mut routines);
    routines
});

static MUTATORS: Lazy<HashMap<&'static str, Mutator>> = Lazy::new(|| {
    let mut mutators = HashMap::new();
    collection::register_mutators(&mut mutators);
    json::register_mutators(&mut mutators);
    mutators
});

pub fn builtin(name: &str) -> Option<Builtin> {
    BUILTINS.get(name).copied()
}

pub fn mutator(name: &str) -> Option<Mutator> {
    MUTATORS.get(name).copied()
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(name) || MUTATORS.contains_key(name)
}

// argument accessors shared by the routine modules

pub(crate) fn arg<'a>(routine: &str, args: &'a [Value], i: usize) -> Result<&'a Value, RuntimeError> {
    args.get(i)
        .ok_or_else(|| RuntimeError::invalid_argument(routine, format!("missing argument {}", i + 1)))
}

pub(crate) fn str_arg<'a>(routine: &str, args: &'a [Value], i: usize) -> Result<&'a str, RuntimeError> {
    match arg(routine, args, i)? {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::invalid_argument(routine, format!("expected a string, got {}", other.type_name()))),
    }
}

pub(crate) fn int_arg(routine: &str, args: &[Value], i: usize) -> Result<i64, RuntimeError> {
    let v = arg(routine, args, i)?;
    match v {
        Value::Int(n) => Ok(*n),
        other => other
            .as_i64()
            .ok_or_else(|| RuntimeError::invalid_argument(routine, format!("expected an integer, got {}", other.type_name()))),
    }
}

pub(crate) fn f64_arg(routine: &str, args: &[Value], i: usize) -> Result<f64, RuntimeError> {
    let v = arg(routine, args, i)?;
    v.as_f64()
        .ok_or_else(|| RuntimeError::invalid_argument(routine, format!("expected a number, got {}", v.type_name())))
}

pub(crate) fn decimal_arg(routine: &str, args: &[Value], i: usize) -> Result<BigDecimal, RuntimeError> {
    let v = arg(routine, args, i)?;
    v.as_decimal()
        .ok_or_else(|| RuntimeError::invalid_argument(routine, format!("expected a number, got {}", v.type_name())))
}

pub(crate) fn bool_arg(routine: &str, args: &[Value], i: usize) -> Result<bool, RuntimeError> {
    match arg(routine, args, i)? {
        Value::Bool(b) => Ok(*b),
        other => Err(RuntimeError::invalid_argument(routine, format!("expected a boolean, got {}", other.type_name()))),
    }
}

pub(crate) fn list_arg<'a>(routine: &str, args: &'a [Value], i: usize) -> Result<&'a [Value], RuntimeError> {
    match arg(routine, args, i)? {
        Value::List(items) => Ok(items),
        other => Err(RuntimeError::invalid_argument(routine, format!("expected a collection, got {}", other.type_name()))),
    }
}

/// Floor division; the quotient rounds toward negative infinity.
pub(crate) fn floor_div(a: i64, b: i64) -> Result<i64, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    let q = a.checked_div(b).ok_or_else(|| RuntimeError::Overflow("floorDiv".into()))?;
    if a % b != 0 && ((a < 0) != (b < 0)) { Ok(q - 1) } else { Ok(q) }
}

/// Remainder with the sign of the divisor.
pub(crate) fn floor_mod(a: i64, b: i64) -> Result<i64, RuntimeError> {
    Ok(a - floor_div(a, b)? * b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_division_rounds_down() {
        assert_eq!(floor_div(7, 2).unwrap(), 3);
        assert_eq!(floor_div(-7, 2).unwrap(), -4);
        assert_eq!(floor_mod(-7, 2).unwrap(), 1);
        assert_eq!(floor_mod(7, -2).unwrap(), -1);
        assert_eq!(floor_div(1, 0), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn lookup_finds_routines_and_mutators() {
        assert!(builtin("upper").is_some());
        assert!(builtin("collectionAdd").is_none());
        assert!(mutator("collectionAdd").is_some());
        assert!(is_builtin("jsonValue"));
        assert!(!is_builtin("compress"));
    }

    #[test]
    fn accessors_report_the_routine() {
        let args = [Value::Int(1)];
        let err = str_arg("upper", &args, 0).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { routine, .. } if routine == "upper"));
        assert!(arg("upper", &args, 3).is_err());
    }
}
