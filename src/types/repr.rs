use serde::{Deserialize, Serialize};

use crate::runtime::Value;

/// Unboxed machine kinds a value can be held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl Primitive {
    pub fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Bool)
    }

    pub fn is_integral(self) -> bool {
        matches!(self, Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64)
    }

    pub fn is_fractional(self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }

    /// Zero (or `false`): what an unboxed slot holds before its first write.
    pub fn default_value(self) -> Value {
        match self {
            Primitive::Bool => Value::Bool(false),
            Primitive::F32 | Primitive::F64 => Value::float(0.0),
            _ => Value::Int(0),
        }
    }

    /// Largest value of the kind; the MIN aggregate starts from here.
    pub fn max_value(self) -> Value {
        match self {
            Primitive::Bool => Value::Bool(true),
            Primitive::I8 => Value::Int(i8::MAX as i64),
            Primitive::I16 => Value::Int(i16::MAX as i64),
            Primitive::I32 => Value::Int(i32::MAX as i64),
            Primitive::I64 => Value::Int(i64::MAX),
            Primitive::F32 => Value::float(f32::MAX as f64),
            Primitive::F64 => Value::float(f64::MAX),
        }
    }

    /// Smallest value of the kind; the MAX aggregate starts from here.
    pub fn min_value(self) -> Value {
        match self {
            Primitive::Bool => Value::Bool(false),
            Primitive::I8 => Value::Int(i8::MIN as i64),
            Primitive::I16 => Value::Int(i16::MIN as i64),
            Primitive::I32 => Value::Int(i32::MIN as i64),
            Primitive::I64 => Value::Int(i64::MIN),
            Primitive::F32 => Value::float(f32::MIN as f64),
            Primitive::F64 => Value::float(f64::MIN),
        }
    }

    /// Binary numeric promotion: narrow integers widen to `I32`.
    pub fn promote(a: Primitive, b: Primitive) -> Primitive {
        use Primitive::*;
        let rank = |p: Primitive| match p {
            Bool => 0,
            I8 | I16 | I32 => 1,
            I64 => 2,
            F32 => 3,
            F64 => 4,
        };
        match rank(a).max(rank(b)) {
            0 => Bool,
            1 => I32,
            2 => I64,
            3 => F32,
            _ => F64,
        }
    }
}

/// Runtime representation chosen for a SQL type.
///
/// `Prim` can never hold null; everything else can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repr {
    Prim(Primitive),
    Boxed(Primitive),
    Decimal,
    String,
    Bytes,
    List,
    Map,
    Symbol,
    /// Untyped reference; ANY and anything the factory cannot pin down.
    Object,
}

impl Repr {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Repr::Prim(_))
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_primitive()
    }

    /// The primitive behind a `Prim` or `Boxed` repr.
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Repr::Prim(p) | Repr::Boxed(p) => Some(*p),
            _ => None,
        }
    }

    pub fn boxed_primitive(&self) -> Option<Primitive> {
        match self {
            Repr::Boxed(p) => Some(*p),
            _ => None,
        }
    }

    pub fn unboxed(&self) -> Repr {
        match self {
            Repr::Boxed(p) => Repr::Prim(*p),
            other => *other,
        }
    }

    pub fn boxed(&self) -> Repr {
        match self {
            Repr::Prim(p) => Repr::Boxed(*p),
            other => *other,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Repr::Decimal) || self.primitive().is_some_and(Primitive::is_numeric)
    }
}
