use std::fmt;

use crate::rex::{JsonNullClause, UserDefinedAggFunction};

/// Built-in aggregate and window functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggKind {
    Count,
    RegrCount,
    Sum,
    Sum0,
    Min,
    Max,
    AnyValue,
    Some,
    Every,
    BitAnd,
    BitOr,
    BitXor,
    SingleValue,
    Collect,
    ListAgg,
    Fusion,
    Intersection,
    Grouping,
    GroupingId,
    JsonObjectAgg(JsonNullClause),
    JsonArrayAgg(JsonNullClause),
    Rank,
    DenseRank,
    RowNumber,
}

impl AggKind {
    /// Plain aggregates whose strategy is also correct over a window frame.
    pub fn is_window_reusable(self) -> bool {
        matches!(
            self,
            AggKind::Sum
                | AggKind::Sum0
                | AggKind::Min
                | AggKind::Max
                | AggKind::AnyValue
                | AggKind::Some
                | AggKind::Every
                | AggKind::BitAnd
                | AggKind::BitOr
                | AggKind::BitXor
                | AggKind::SingleValue
                | AggKind::Collect
                | AggKind::ListAgg
                | AggKind::Fusion
                | AggKind::Intersection
        )
    }
}

#[derive(Clone)]
pub enum AggFunction {
    Builtin(AggKind),
    UserDefined(UserDefinedAggFunction),
}

impl AggFunction {
    pub fn kind(&self) -> Option<AggKind> {
        match self {
            AggFunction::Builtin(k) => Some(*k),
            AggFunction::UserDefined(_) => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            AggFunction::Builtin(k) => format!("{k:?}").to_uppercase(),
            AggFunction::UserDefined(u) => u.name().to_string(),
        }
    }
}

impl fmt::Debug for AggFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggFunction::Builtin(k) => write!(f, "{k:?}"),
            AggFunction::UserDefined(u) => write!(f, "UserDefined({})", u.name()),
        }
    }
}

impl From<AggKind> for AggFunction {
    fn from(kind: AggKind) -> Self {
        AggFunction::Builtin(kind)
    }
}
