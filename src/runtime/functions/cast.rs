use std::collections::HashMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::RuntimeError;
use crate::rex::Symbol;
use crate::runtime::functions::datetime::{date_of, days_of};
use crate::runtime::functions::{arg, Builtin};
use crate::runtime::Value;
use crate::types::{SqlTypeName, MILLIS_PER_DAY};

pub(crate) fn register(routines: &mut HashMap<&'static str, Builtin>) {
    routines.insert("cast", |a| {
        let value = arg("cast", a, 0)?;
        if value.is_null() {
            return Ok(Value::Null);
        }
        cast(value, type_arg(a, 1)?, type_arg(a, 2)?)
    });
}

fn type_arg(args: &[Value], i: usize) -> Result<SqlTypeName, RuntimeError> {
    match arg("cast", args, i)? {
        Value::Symbol(Symbol::TypeName(t)) => Ok(*t),
        other => Err(RuntimeError::invalid_argument("cast", format!("expected a type name, got {}", other.type_name()))),
    }
}

fn invalid(value: &Value, target: SqlTypeName) -> RuntimeError {
    RuntimeError::invalid_argument("cast", format!("cannot cast '{value}' to {target:?}"))
}

/// Value conversion between SQL types whose runtime forms differ. Dates
/// are day numbers, times millis of the day, timestamps epoch millis.
pub fn cast(value: &Value, source: SqlTypeName, target: SqlTypeName) -> Result<Value, RuntimeError> {
    use SqlTypeName as T;
    match target {
        t if t.is_character() => to_text(value, source),
        t if t.is_exact_integer() => match value {
            Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| invalid(value, target)),
            Value::Bool(_) => Err(invalid(value, target)),
            other => other.as_i64().map(Value::Int).ok_or_else(|| invalid(value, target)),
        },
        T::Decimal => match value {
            Value::Str(s) => BigDecimal::from_str(s.trim()).map(Value::Decimal).map_err(|_| invalid(value, target)),
            other => other.as_decimal().map(Value::Decimal).ok_or_else(|| invalid(value, target)),
        },
        t if t.is_approximate() => match value {
            Value::Str(s) => s.trim().parse::<f64>().map(Value::float).map_err(|_| invalid(value, target)),
            other => other.as_f64().map(Value::float).ok_or_else(|| invalid(value, target)),
        },
        T::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Str(s) => match s.trim().to_ascii_uppercase().as_str() {
                "TRUE" => Ok(Value::Bool(true)),
                "FALSE" => Ok(Value::Bool(false)),
                _ => Err(invalid(value, target)),
            },
            other if other.is_numeric() => Ok(Value::Bool(other.as_f64() != Some(0.0))),
            _ => Err(invalid(value, target)),
        },
        T::Date => match (value, source) {
            (Value::Str(s), _) => parse_date(s.trim())
                .map(|d| Value::Int(days_of(d)))
                .ok_or_else(|| invalid(value, target)),
            (Value::Int(ms), T::Timestamp | T::TimestampWithLocalTimeZone) => Ok(Value::Int(ms.div_euclid(MILLIS_PER_DAY))),
            _ => Ok(value.clone()),
        },
        T::Time => match (value, source) {
            (Value::Str(s), _) => parse_time(s.trim())
                .map(|t| Value::Int(millis_of_day(t)))
                .ok_or_else(|| invalid(value, target)),
            (Value::Int(ms), T::Timestamp | T::TimestampWithLocalTimeZone) => Ok(Value::Int(ms.rem_euclid(MILLIS_PER_DAY))),
            _ => Ok(value.clone()),
        },
        T::Timestamp | T::TimestampWithLocalTimeZone => match (value, source) {
            (Value::Str(s), _) => parse_timestamp(s.trim())
                .map(|ts| Value::Int(ts.and_utc().timestamp_millis()))
                .ok_or_else(|| invalid(value, target)),
            (Value::Int(days), T::Date) => days
                .checked_mul(MILLIS_PER_DAY)
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::Overflow("cast".into())),
            _ => Ok(value.clone()),
        },
        t if t.is_binary() => match value {
            Value::Str(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
            _ => Ok(value.clone()),
        },
        _ => Ok(value.clone()),
    }
}

fn to_text(value: &Value, source: SqlTypeName) -> Result<Value, RuntimeError> {
    use SqlTypeName as T;
    let text = match (value, source) {
        (Value::Int(days), T::Date) => date_of(*days)?.format("%Y-%m-%d").to_string(),
        (Value::Int(ms), T::Time) => {
            let t = time_of(*ms).ok_or_else(|| invalid(value, T::Varchar))?;
            t.format("%H:%M:%S").to_string()
        }
        (Value::Int(ms), T::Timestamp | T::TimestampWithLocalTimeZone) => {
            let date = date_of(ms.div_euclid(MILLIS_PER_DAY))?;
            let t = time_of(ms.rem_euclid(MILLIS_PER_DAY)).ok_or_else(|| invalid(value, T::Varchar))?;
            date.and_time(t).format("%Y-%m-%d %H:%M:%S").to_string()
        }
        (Value::Bytes(b), _) => String::from_utf8_lossy(b).into_owned(),
        (other, _) => other.to_string(),
    };
    Ok(Value::Str(text))
}

fn time_of(millis: i64) -> Option<NaiveTime> {
    let secs = u32::try_from(millis.div_euclid(1000)).ok()?;
    let nanos = u32::try_from(millis.rem_euclid(1000) * 1_000_000).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

fn millis_of_day(t: NaiveTime) -> i64 {
    t.num_seconds_from_midnight() as i64 * 1000 + (t.nanosecond() / 1_000_000) as i64
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use SqlTypeName as T;

    #[test]
    fn strings_parse_into_numbers_and_booleans() {
        assert_eq!(cast(&Value::str(" 12 "), T::Varchar, T::Integer).unwrap(), Value::Int(12));
        assert!(cast(&Value::str("1.5"), T::Varchar, T::Integer).is_err());
        assert_eq!(cast(&Value::str("1.5"), T::Varchar, T::Double).unwrap(), Value::float(1.5));
        assert_eq!(
            cast(&Value::str("1.50"), T::Varchar, T::Decimal).unwrap(),
            Value::Decimal(BigDecimal::from_str("1.50").unwrap())
        );
        assert_eq!(cast(&Value::str(" true"), T::Varchar, T::Boolean).unwrap(), Value::Bool(true));
    }

    #[test]
    fn datetimes_render_as_text() {
        assert_eq!(cast(&Value::Int(19797), T::Date, T::Varchar).unwrap(), Value::str("2024-03-15"));
        assert_eq!(cast(&Value::Int(3_723_000), T::Time, T::Varchar).unwrap(), Value::str("01:02:03"));
        assert_eq!(
            cast(&Value::Int(1_710_505_845_000), T::Timestamp, T::Varchar).unwrap(),
            Value::str("2024-03-15 12:30:45")
        );
        assert_eq!(cast(&Value::Bool(false), T::Boolean, T::Char).unwrap(), Value::str("FALSE"));
    }

    #[test]
    fn datetimes_parse_and_convert() {
        assert_eq!(cast(&Value::str("2024-03-15"), T::Varchar, T::Date).unwrap(), Value::Int(19797));
        assert_eq!(cast(&Value::str("01:02:03"), T::Varchar, T::Time).unwrap(), Value::Int(3_723_000));
        assert_eq!(
            cast(&Value::str("2024-03-15 12:30:45"), T::Varchar, T::Timestamp).unwrap(),
            Value::Int(1_710_505_845_000)
        );
        assert_eq!(cast(&Value::Int(1_710_505_845_000), T::Timestamp, T::Date).unwrap(), Value::Int(19797));
        assert_eq!(cast(&Value::Int(1_710_505_845_000), T::Timestamp, T::Time).unwrap(), Value::Int(45_045_000));
        assert_eq!(cast(&Value::Int(1), T::Date, T::Timestamp).unwrap(), Value::Int(86_400_000));
        assert!(cast(&Value::str("2024-13-01"), T::Varchar, T::Date).is_err());
    }

    #[test]
    fn routine_passes_null_through() {
        let f = crate::runtime::functions::builtin("cast").unwrap();
        let ty = |t| Value::Symbol(Symbol::TypeName(t));
        assert_eq!(f(&[Value::Null, ty(T::Varchar), ty(T::Integer)]).unwrap(), Value::Null);
        assert_eq!(f(&[Value::str("x"), ty(T::Varchar), ty(T::VarBinary)]).unwrap(), Value::Bytes(b"x".to_vec()));
    }
}
