use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rex::UserDefinedFunction;

/// Built-in scalar operators the registry can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatorKind {
    Row,
    // strings
    Upper,
    Lower,
    InitCap,
    ToBase64,
    FromBase64,
    Md5,
    Sha1,
    Substring,
    Left,
    Right,
    Replace,
    Translate3,
    Chr,
    CharacterLength,
    CharLength,
    Concat,
    ConcatFunction,
    Concat2,
    Overlay,
    Position,
    Ascii,
    Repeat,
    Space,
    Strcmp,
    Soundex,
    Difference,
    Reverse,
    Trim,
    // logic and comparison
    And,
    Or,
    Not,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equals,
    NotEquals,
    // arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    DivideInteger,
    UnaryMinus,
    UnaryPlus,
    Mod,
    Exp,
    Power,
    Ln,
    Log10,
    Abs,
    Rand,
    RandInteger,
    Acos,
    Asin,
    Atan,
    Atan2,
    Cbrt,
    Cos,
    Cosh,
    Cot,
    Degrees,
    Radians,
    Round,
    Sign,
    Sin,
    Sinh,
    Tan,
    Tanh,
    Truncate,
    Pi,
    // datetime
    DatetimePlus,
    MinusDate,
    Extract,
    Floor,
    Ceil,
    LastDay,
    DayName,
    MonthName,
    TimestampSeconds,
    TimestampMillis,
    TimestampMicros,
    UnixSeconds,
    UnixMillis,
    UnixMicros,
    DateFromUnixDate,
    UnixDate,
    // null and boolean tests
    IsNull,
    IsNotNull,
    IsTrue,
    IsNotTrue,
    IsFalse,
    IsNotFalse,
    // pattern matching
    Like,
    NotLike,
    SimilarTo,
    NotSimilarTo,
    PosixRegexCaseInsensitive,
    PosixRegexCaseSensitive,
    NegatedPosixRegexCaseInsensitive,
    NegatedPosixRegexCaseSensitive,
    RegexpReplace,
    // collections
    Cardinality,
    Slice,
    Element,
    StructAccess,
    MemberOf,
    IsEmpty,
    IsNotEmpty,
    IsASet,
    IsNotASet,
    MultisetIntersectDistinct,
    MultisetIntersect,
    MultisetExceptDistinct,
    MultisetExcept,
    MultisetUnionDistinct,
    MultisetUnion,
    SubmultisetOf,
    NotSubmultisetOf,
    // misc
    Coalesce,
    Cast,
    Reinterpret,
    MapValueConstructor,
    ArrayValueConstructor,
    Item,
    Default,
    CurrentValue,
    NextValue,
    Compress,
    ExtractValue,
    XmlTransform,
    ExtractXml,
    ExistsNode,
    // json
    JsonValueExpression,
    JsonExists,
    JsonValue,
    JsonQuery,
    JsonType,
    JsonDepth,
    JsonKeys,
    JsonPretty,
    JsonLength,
    JsonRemove,
    JsonStorageSize,
    JsonObject,
    JsonArray,
    IsJsonValue,
    IsJsonObject,
    IsJsonArray,
    IsJsonScalar,
    IsNotJsonValue,
    IsNotJsonObject,
    IsNotJsonArray,
    IsNotJsonScalar,
    // system
    User,
    CurrentUser,
    SessionUser,
    SystemUser,
    CurrentPath,
    CurrentRole,
    CurrentCatalog,
    CurrentTime,
    CurrentTimestamp,
    CurrentDate,
    LocalTime,
    LocalTimestamp,
}

impl OperatorKind {
    /// Upper snake-case SQL name, e.g. `IS_NOT_NULL`.
    pub fn sql_name(self) -> String {
        let debug = format!("{self:?}");
        let mut out = String::with_capacity(debug.len() + 4);
        for (i, ch) in debug.chars().enumerate() {
            if ch.is_ascii_uppercase() && i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_uppercase());
        }
        out
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_name())
    }
}

/// The operator of a rex call.
#[derive(Clone)]
pub enum SqlOperator {
    Builtin(OperatorKind),
    /// Scalar user-defined function.
    UserDefined(UserDefinedFunction),
    TableFunction(UserDefinedFunction),
    TableMacro(UserDefinedFunction),
    /// Structured-type constructor (`new T(...)`); builds a row.
    TypeConstructor(String),
}

impl SqlOperator {
    pub fn kind(&self) -> Option<OperatorKind> {
        match self {
            SqlOperator::Builtin(k) => Some(*k),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            SqlOperator::Builtin(k) => k.sql_name(),
            SqlOperator::UserDefined(f) | SqlOperator::TableFunction(f) | SqlOperator::TableMacro(f) => {
                f.name().to_string()
            }
            SqlOperator::TypeConstructor(name) => name.clone(),
        }
    }

    /// Table functions and macros already produce the declared shape, so
    /// their results skip the final representation conversion.
    pub fn is_table_function_or_macro(&self) -> bool {
        matches!(self, SqlOperator::TableFunction(_) | SqlOperator::TableMacro(_))
    }
}

impl fmt::Debug for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlOperator::Builtin(k) => write!(f, "{k}"),
            SqlOperator::UserDefined(u) => write!(f, "UserDefined({})", u.name()),
            SqlOperator::TableFunction(u) => write!(f, "TableFunction({})", u.name()),
            SqlOperator::TableMacro(u) => write!(f, "TableMacro({})", u.name()),
            SqlOperator::TypeConstructor(n) => write!(f, "TypeConstructor({n})"),
        }
    }
}

impl From<OperatorKind> for SqlOperator {
    fn from(kind: OperatorKind) -> Self {
        SqlOperator::Builtin(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_names_are_upper_snake_case() {
        assert_eq!(OperatorKind::IsNotNull.sql_name(), "IS_NOT_NULL");
        assert_eq!(OperatorKind::Upper.sql_name(), "UPPER");
        assert_eq!(OperatorKind::JsonValueExpression.to_string(), "JSON_VALUE_EXPRESSION");
        assert_eq!(SqlOperator::from(OperatorKind::Coalesce).name(), "COALESCE");
    }
}
