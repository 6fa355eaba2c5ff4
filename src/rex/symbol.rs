use serde::{Deserialize, Serialize};

use crate::types::{SqlTypeName, TimeUnitRange};

/// Which ends TRIM strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrimFlag {
    Both,
    Leading,
    Trailing,
}

impl TrimFlag {
    pub fn leading(self) -> bool {
        matches!(self, TrimFlag::Both | TrimFlag::Leading)
    }

    pub fn trailing(self) -> bool {
        matches!(self, TrimFlag::Both | TrimFlag::Trailing)
    }
}

/// `NULL ON NULL` keeps null members; `ABSENT ON NULL` drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonNullClause {
    NullOnNull,
    AbsentOnNull,
}

/// Marker that closes an `... ON EMPTY` / `... ON ERROR` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonEmptyOrError {
    Empty,
    Error,
}

/// JSON_VALUE behavior when the path is empty or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonValueBehavior {
    Error,
    Null,
    Default,
}

/// JSON_QUERY behavior when the path is empty or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonQueryBehavior {
    Error,
    Null,
    EmptyArray,
    EmptyObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonQueryWrapper {
    WithoutArray,
    WithConditionalArray,
    WithUnconditionalArray,
}

/// JSON_EXISTS outcome when evaluating the path fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonExistsBehavior {
    True,
    False,
    Unknown,
    Error,
}

/// Flag literals that travel as operands: interval units, trim sides,
/// JSON clauses and cast targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    TimeUnit(TimeUnitRange),
    Trim(TrimFlag),
    JsonNullClause(JsonNullClause),
    JsonEmptyOrError(JsonEmptyOrError),
    JsonValueBehavior(JsonValueBehavior),
    JsonQueryBehavior(JsonQueryBehavior),
    JsonQueryWrapper(JsonQueryWrapper),
    JsonExistsBehavior(JsonExistsBehavior),
    TypeName(SqlTypeName),
}
