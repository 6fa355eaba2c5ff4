use crate::types::{Primitive, RelType, Repr, SqlTypeName};

/// Maps SQL types to runtime representations and computes common types.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeFactory;

impl TypeFactory {
    pub fn new() -> Self {
        Self
    }

    /// Representation used to hold a value of `ty`. Non-nullable types that
    /// have a primitive kind get the unboxed form.
    pub fn repr_of(&self, ty: &RelType) -> Repr {
        use SqlTypeName as T;
        let primitive = match ty.name {
            T::Boolean => Some(Primitive::Bool),
            T::TinyInt => Some(Primitive::I8),
            T::SmallInt => Some(Primitive::I16),
            T::Integer | T::Date | T::Time => Some(Primitive::I32),
            T::BigInt | T::Timestamp | T::TimestampWithLocalTimeZone => Some(Primitive::I64),
            T::Real => Some(Primitive::F32),
            T::Float | T::Double => Some(Primitive::F64),
            t if t.is_interval_year_month() => Some(Primitive::I32),
            t if t.is_interval_day_time() => Some(Primitive::I64),
            _ => None,
        };
        if let Some(p) = primitive {
            return if ty.nullable { Repr::Boxed(p) } else { Repr::Prim(p) };
        }
        match ty.name {
            T::Decimal => Repr::Decimal,
            T::Char | T::Varchar => Repr::String,
            T::Binary | T::VarBinary => Repr::Bytes,
            T::Array | T::Multiset | T::Row => Repr::List,
            T::Map => Repr::Map,
            T::Symbol => Repr::Symbol,
            _ => Repr::Object,
        }
    }

    /// The narrowest type every input converts to without loss, or `None`
    /// when the inputs share no family. NULL-typed inputs are absorbed and
    /// the result is nullable if any input is.
    pub fn least_restrictive(&self, types: &[RelType]) -> Option<RelType> {
        let nullable = types.iter().any(|t| t.nullable || t.name == SqlTypeName::Null);
        let typed: Vec<&RelType> = types.iter().filter(|t| t.name != SqlTypeName::Null).collect();
        let first = match typed.first() {
            Some(f) => *f,
            None => return types.first().map(|t| t.with_nullability(true)),
        };
        if typed.iter().any(|t| t.name == SqlTypeName::Any) {
            return Some(RelType::new(SqlTypeName::Any).with_nullability(nullable));
        }
        if typed.iter().all(|t| t.equal_sans_nullability(first)) {
            return Some(first.with_nullability(nullable));
        }

        let names: Vec<SqlTypeName> = typed.iter().map(|t| t.name).collect();
        let name = if names.iter().all(|n| n.is_numeric()) {
            names.iter().copied().max_by_key(|n| n.numeric_rank())?
        } else if names.iter().all(|n| n.is_character()) {
            if names.iter().all(|n| *n == SqlTypeName::Char) { SqlTypeName::Char } else { SqlTypeName::Varchar }
        } else if names.iter().all(|n| n.is_binary()) {
            SqlTypeName::VarBinary
        } else if names.iter().all(|n| n.is_interval_year_month()) {
            SqlTypeName::IntervalYearMonth
        } else if names.iter().all(|n| n.is_interval_day_time()) {
            SqlTypeName::IntervalDaySecond
        } else if names.iter().all(|n| matches!(n, SqlTypeName::Date | SqlTypeName::Timestamp)) {
            SqlTypeName::Timestamp
        } else {
            return None;
        };
        let mut out = RelType::new(name);
        out.nullable = nullable;
        Some(out)
    }
}
