use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::error::RuntimeError;
use crate::rex::Symbol;
use crate::types::{Primitive, Repr};

/// A runtime datum. Integers of every width live in `Int`; the declared
/// [`Repr`] decides how narrow they are allowed to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Decimal(BigDecimal),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(IndexMap<Value, Value>),
    Symbol(Symbol),
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::List(items) => items.hash(state),
            // map equality ignores entry order, so only the size may feed the hash
            Value::Map(m) => m.len().hash(state),
            Value::Symbol(s) => s.hash(state),
        }
    }
}

impl Value {
    pub fn float(f: f64) -> Value {
        Value::Float(OrderedFloat(f))
    }

    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(f.0 as i64),
            Value::Decimal(d) => d.to_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(f.0),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            Value::Int(i) => Some(BigDecimal::from(*i)),
            Value::Float(f) => BigDecimal::from_f64(f.0),
            Value::Decimal(d) => Some(d.clone()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Decimal(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Str(_) => "VARCHAR",
            Value::Bytes(_) => "VARBINARY",
            Value::List(_) => "ARRAY",
            Value::Map(_) => "MAP",
            Value::Symbol(_) => "SYMBOL",
        }
    }

    /// SQL ordering between two non-null values; numbers compare across
    /// kinds. `None` when the kinds are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Decimal(_), _) | (_, Value::Decimal(_)) if self.is_numeric() && other.is_numeric() => {
                Some(self.as_decimal()?.cmp(&other.as_decimal()?))
            }
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64()?.partial_cmp(&b.as_f64()?),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Equality with numeric kinds unified (`1 = 1.0`).
    pub fn sql_eq(&self, other: &Value) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return self.compare(other) == Some(Ordering::Equal);
        }
        self == other
    }

    /// Coerce to the given representation the way an explicit conversion
    /// does: integers narrow with wrap-around, fractions truncate toward zero.
    pub fn convert_to(&self, repr: &Repr) -> Result<Value, RuntimeError> {
        if self.is_null() {
            return match repr {
                Repr::Prim(_) => Err(RuntimeError::NullValue(format!("{repr:?}"))),
                _ => Ok(Value::Null),
            };
        }
        match repr {
            Repr::Prim(p) | Repr::Boxed(p) => self.convert_primitive(*p),
            Repr::Decimal => self
                .as_decimal()
                .map(Value::Decimal)
                .ok_or_else(|| RuntimeError::type_mismatch(format!("cannot convert {} to DECIMAL", self.type_name()))),
            Repr::String => match self {
                Value::Str(_) => Ok(self.clone()),
                other => Ok(Value::Str(other.to_string())),
            },
            Repr::Bytes => match self {
                Value::Bytes(_) => Ok(self.clone()),
                Value::Str(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
                other => Err(RuntimeError::type_mismatch(format!("cannot convert {} to VARBINARY", other.type_name()))),
            },
            Repr::List | Repr::Map | Repr::Symbol | Repr::Object => Ok(self.clone()),
        }
    }

    fn convert_primitive(&self, p: Primitive) -> Result<Value, RuntimeError> {
        let mismatch = || RuntimeError::type_mismatch(format!("cannot convert {} to {p:?}", self.type_name()));
        match p {
            Primitive::Bool => match self {
                Value::Bool(_) => Ok(self.clone()),
                _ => Err(mismatch()),
            },
            Primitive::F32 => Ok(Value::float(self.as_f64().ok_or_else(mismatch)? as f32 as f64)),
            Primitive::F64 => Ok(Value::float(self.as_f64().ok_or_else(mismatch)?)),
            integral => {
                let wide = match self {
                    Value::Int(i) => *i,
                    Value::Float(f) => f.0 as i64,
                    Value::Decimal(d) => d.to_i64().ok_or_else(|| RuntimeError::Overflow("conversion".into()))?,
                    _ => return Err(mismatch()),
                };
                Ok(Value::Int(match integral {
                    Primitive::I8 => wide as i8 as i64,
                    Primitive::I16 => wide as i16 as i64,
                    Primitive::I32 => wide as i32 as i64,
                    _ => wide,
                }))
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(f.0).map(J::Number).unwrap_or(J::Null),
            Value::Decimal(d) => match d.to_i64() {
                Some(i) if d.is_integer() => J::from(i),
                _ => d.to_f64().and_then(serde_json::Number::from_f64).map(J::Number).unwrap_or(J::Null),
            },
            Value::Str(s) => J::String(s.clone()),
            Value::Bytes(b) => J::String(String::from_utf8_lossy(b).into_owned()),
            Value::List(items) => J::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(m) => J::Object(
                m.iter()
                    .map(|(k, v)| (k.as_str().map(str::to_string).unwrap_or_else(|| k.to_string()), v.to_json()))
                    .collect(),
            ),
            Value::Symbol(s) => J::String(format!("{s:?}")),
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Value {
        use serde_json::Value as J;
        match json {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(*b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::Str(s.clone()),
            J::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            J::Object(m) => Value::Map(m.iter().map(|(k, v)| (Value::Str(k.clone()), Value::from_json(v))).collect()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", x.0),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bytes(b) => {
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::List(_) | Value::Map(_) => write!(f, "{}", self.to_json()),
            Value::Symbol(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn numbers_compare_across_kinds() {
        assert_eq!(Value::Int(1).compare(&Value::float(1.5)), Some(Ordering::Less));
        let d = Value::Decimal(BigDecimal::from_str("2.50").unwrap());
        assert_eq!(d.compare(&Value::Int(2)), Some(Ordering::Greater));
        assert!(Value::Int(1).sql_eq(&Value::float(1.0)));
        assert_eq!(Value::str("a").compare(&Value::Int(1)), None);
    }

    #[test]
    fn narrowing_wraps_like_a_machine_cast() {
        assert_eq!(Value::Int(128).convert_to(&Repr::Prim(Primitive::I8)).unwrap(), Value::Int(-128));
        assert_eq!(Value::float(2.9).convert_to(&Repr::Prim(Primitive::I32)).unwrap(), Value::Int(2));
        assert_eq!(Value::Null.convert_to(&Repr::Boxed(Primitive::I32)).unwrap(), Value::Null);
        assert!(matches!(
            Value::Null.convert_to(&Repr::Prim(Primitive::I32)),
            Err(RuntimeError::NullValue(_))
        ));
    }

    #[test]
    fn json_conversion_keeps_structure() {
        let json = serde_json::json!({"a": [1, 2.5, null], "b": true});
        let v = Value::from_json(&json);
        assert_eq!(v.to_json(), json);
    }

    #[test]
    fn equal_maps_hash_equally_regardless_of_order() {
        use std::collections::hash_map::DefaultHasher;
        let mut m1 = IndexMap::new();
        m1.insert(Value::str("a"), Value::Int(1));
        m1.insert(Value::str("b"), Value::Int(2));
        let mut m2 = IndexMap::new();
        m2.insert(Value::str("b"), Value::Int(2));
        m2.insert(Value::str("a"), Value::Int(1));
        let (a, b) = (Value::Map(m1), Value::Map(m2));
        assert_eq!(a, b);
        let h = |v: &Value| {
            let mut s = DefaultHasher::new();
            v.hash(&mut s);
            s.finish()
        };
        assert_eq!(h(&a), h(&b));
    }
}
