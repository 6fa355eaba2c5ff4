use std::collections::HashMap;

use bigdecimal::{BigDecimal, RoundingMode, Signed, Zero};

use crate::error::RuntimeError;
use crate::linq::BinaryOp;
use crate::runtime::functions::operators::arithmetic;
use crate::runtime::functions::{arg, f64_arg, floor_div, floor_mod, int_arg, Builtin};
use crate::runtime::Value;

pub(crate) fn register(routines: &mut HashMap<&'static str, Builtin>) {
    routines.insert("exp", |a| unary_float("exp", a, f64::exp));
    routines.insert("ln", |a| positive_log("ln", a, f64::ln));
    routines.insert("log10", |a| positive_log("log10", a, f64::log10));
    routines.insert("acos", |a| unary_float("acos", a, f64::acos));
    routines.insert("asin", |a| unary_float("asin", a, f64::asin));
    routines.insert("atan", |a| unary_float("atan", a, f64::atan));
    routines.insert("cbrt", |a| unary_float("cbrt", a, f64::cbrt));
    routines.insert("cos", |a| unary_float("cos", a, f64::cos));
    routines.insert("cosh", |a| unary_float("cosh", a, f64::cosh));
    routines.insert("cot", |a| unary_float("cot", a, |x| 1.0 / x.tan()));
    routines.insert("degrees", |a| unary_float("degrees", a, f64::to_degrees));
    routines.insert("radians", |a| unary_float("radians", a, f64::to_radians));
    routines.insert("sin", |a| unary_float("sin", a, f64::sin));
    routines.insert("sinh", |a| unary_float("sinh", a, f64::sinh));
    routines.insert("tan", |a| unary_float("tan", a, f64::tan));
    routines.insert("tanh", |a| unary_float("tanh", a, f64::tanh));
    routines.insert("atan2", |a| Ok(Value::float(f64_arg("atan2", a, 0)?.atan2(f64_arg("atan2", a, 1)?))));
    routines.insert("power", |a| Ok(Value::float(f64_arg("power", a, 0)?.powf(f64_arg("power", a, 1)?))));
    routines.insert("mod", |a| arithmetic(BinaryOp::Modulo, arg("mod", a, 0)?, arg("mod", a, 1)?));
    routines.insert("abs", abs);
    routines.insert("sign", sign);
    routines.insert("round", |a| scale("round", a, RoundingMode::HalfUp));
    routines.insert("truncate", |a| scale("truncate", a, RoundingMode::Down));
    routines.insert("floor", |a| floor_ceil("floor", a, true));
    routines.insert("ceil", |a| floor_ceil("ceil", a, false));
    routines.insert("floorDiv", |a| Ok(Value::Int(floor_div(int_arg("floorDiv", a, 0)?, int_arg("floorDiv", a, 1)?)?)));
    routines.insert("floorMod", |a| Ok(Value::Int(floor_mod(int_arg("floorMod", a, 0)?, int_arg("floorMod", a, 1)?)?)));
}

fn unary_float(routine: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, RuntimeError> {
    Ok(Value::float(f(f64_arg(routine, args, 0)?)))
}

fn positive_log(routine: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, RuntimeError> {
    let x = f64_arg(routine, args, 0)?;
    if x <= 0.0 {
        return Err(RuntimeError::invalid_argument(routine, format!("cannot take the logarithm of {x}")));
    }
    Ok(Value::float(f(x)))
}

fn abs(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg("abs", args, 0)? {
        Value::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(|| RuntimeError::Overflow("abs".into())),
        Value::Float(f) => Ok(Value::float(f.0.abs())),
        Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
        other => Err(RuntimeError::invalid_argument("abs", format!("expected a number, got {}", other.type_name()))),
    }
}

fn sign(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg("sign", args, 0)? {
        Value::Int(i) => Ok(Value::Int(i.signum())),
        Value::Float(f) if f.0 == 0.0 => Ok(Value::float(0.0)),
        Value::Float(f) => Ok(Value::float(f.0.signum())),
        Value::Decimal(d) if d.is_zero() => Ok(Value::Decimal(BigDecimal::zero())),
        Value::Decimal(d) => Ok(Value::Decimal(BigDecimal::from(if d.is_positive() { 1 } else { -1 }))),
        other => Err(RuntimeError::invalid_argument("sign", format!("expected a number, got {}", other.type_name()))),
    }
}

/// ROUND / TRUNCATE to `digits` places after the point (default 0);
/// negative `digits` work left of the point.
fn scale(routine: &str, args: &[Value], mode: RoundingMode) -> Result<Value, RuntimeError> {
    let digits = match args.get(1) {
        Some(_) => int_arg(routine, args, 1)?,
        None => 0,
    };
    match arg(routine, args, 0)? {
        Value::Decimal(d) => Ok(Value::Decimal(d.with_scale_round(digits, mode))),
        Value::Int(i) if digits >= 0 => Ok(Value::Int(*i)),
        Value::Int(i) => {
            let factor = u32::try_from(-digits)
                .ok()
                .and_then(|d| 10i64.checked_pow(d))
                .ok_or_else(|| RuntimeError::Overflow(routine.to_string()))?;
            let down = i / factor * factor;
            let remainder = i - down;
            let away = matches!(mode, RoundingMode::HalfUp) && remainder.abs() * 2 >= factor;
            Ok(Value::Int(if away { down + remainder.signum() * factor } else { down }))
        }
        Value::Float(f) => {
            let factor = 10f64.powi(digits as i32);
            let scaled = f.0 * factor;
            let r = match mode {
                RoundingMode::Down => scaled.trunc(),
                _ => scaled.round(),
            };
            Ok(Value::float(r / factor))
        }
        other => Err(RuntimeError::invalid_argument(routine, format!("expected a number, got {}", other.type_name()))),
    }
}

/// One operand: round to an integral value. Two: round down (up) to a
/// multiple of the second operand.
fn floor_ceil(routine: &str, args: &[Value], floor: bool) -> Result<Value, RuntimeError> {
    let value = arg(routine, args, 0)?;
    let Some(unit) = args.get(1) else {
        return Ok(match value {
            Value::Float(f) => Value::float(if floor { f.0.floor() } else { f.0.ceil() }),
            Value::Decimal(d) => {
                Value::Decimal(d.with_scale_round(0, if floor { RoundingMode::Floor } else { RoundingMode::Ceiling }))
            }
            other => other.clone(),
        });
    };
    match (value, unit) {
        (Value::Int(v), Value::Int(u)) => {
            let remainder = floor_mod(*v, *u)?;
            let down = v - remainder;
            Ok(Value::Int(if floor || remainder == 0 { down } else { down + u }))
        }
        (Value::Decimal(_), _) | (_, Value::Decimal(_)) => {
            let (v, u) = (
                value.as_decimal().ok_or_else(|| RuntimeError::type_mismatch("non-finite value"))?,
                unit.as_decimal().ok_or_else(|| RuntimeError::type_mismatch("non-finite value"))?,
            );
            if u.is_zero() {
                return Err(RuntimeError::DivisionByZero);
            }
            let mode = if floor { RoundingMode::Floor } else { RoundingMode::Ceiling };
            Ok(Value::Decimal((v / &u).with_scale_round(0, mode) * u))
        }
        _ => {
            let (v, u) = (f64_arg(routine, args, 0)?, f64_arg(routine, args, 1)?);
            let q = v / u;
            Ok(Value::float(if floor { q.floor() } else { q.ceil() } * u))
        }
    }
}
