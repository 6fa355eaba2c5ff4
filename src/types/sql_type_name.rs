use serde::{Deserialize, Serialize};

/// SQL type families known to the code generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlTypeName {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Float,
    Double,
    Char,
    Varchar,
    Binary,
    VarBinary,
    /// Days since 1970-01-01.
    Date,
    /// Milliseconds since midnight.
    Time,
    /// Milliseconds since the epoch, no zone.
    Timestamp,
    /// Milliseconds since the epoch, shifted by the session zone on use.
    TimestampWithLocalTimeZone,
    IntervalYear,
    IntervalYearMonth,
    IntervalMonth,
    IntervalDay,
    IntervalDayHour,
    IntervalDayMinute,
    IntervalDaySecond,
    IntervalHour,
    IntervalHourMinute,
    IntervalHourSecond,
    IntervalMinute,
    IntervalMinuteSecond,
    IntervalSecond,
    Array,
    Map,
    Multiset,
    Row,
    Any,
    Null,
    Symbol,
}

impl SqlTypeName {
    pub fn is_exact_integer(self) -> bool {
        matches!(self, Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt)
    }

    pub fn is_approximate(self) -> bool {
        matches!(self, Self::Real | Self::Float | Self::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_exact_integer() || self.is_approximate() || self == Self::Decimal
    }

    pub fn is_character(self) -> bool {
        matches!(self, Self::Char | Self::Varchar)
    }

    pub fn is_binary(self) -> bool {
        matches!(self, Self::Binary | Self::VarBinary)
    }

    /// Year-month intervals are stored as a month count.
    pub fn is_interval_year_month(self) -> bool {
        matches!(self, Self::IntervalYear | Self::IntervalYearMonth | Self::IntervalMonth)
    }

    /// Day-time intervals are stored as milliseconds.
    pub fn is_interval_day_time(self) -> bool {
        matches!(
            self,
            Self::IntervalDay
                | Self::IntervalDayHour
                | Self::IntervalDayMinute
                | Self::IntervalDaySecond
                | Self::IntervalHour
                | Self::IntervalHourMinute
                | Self::IntervalHourSecond
                | Self::IntervalMinute
                | Self::IntervalMinuteSecond
                | Self::IntervalSecond
        )
    }

    pub fn is_interval(self) -> bool {
        self.is_interval_year_month() || self.is_interval_day_time()
    }

    pub fn is_datetime(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp | Self::TimestampWithLocalTimeZone)
    }

    pub fn is_collection(self) -> bool {
        matches!(self, Self::Array | Self::Multiset | Self::Map)
    }

    /// Position on the numeric widening ladder; higher absorbs lower.
    pub(crate) fn numeric_rank(self) -> Option<u8> {
        match self {
            Self::TinyInt => Some(0),
            Self::SmallInt => Some(1),
            Self::Integer => Some(2),
            Self::BigInt => Some(3),
            Self::Decimal => Some(4),
            Self::Real => Some(5),
            Self::Float => Some(6),
            Self::Double => Some(7),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_do_not_overlap() {
        assert!(SqlTypeName::BigInt.is_exact_integer());
        assert!(!SqlTypeName::Decimal.is_exact_integer());
        assert!(SqlTypeName::Decimal.is_numeric());
        assert!(SqlTypeName::IntervalMonth.is_interval_year_month());
        assert!(!SqlTypeName::IntervalMonth.is_interval_day_time());
        assert!(SqlTypeName::IntervalHourSecond.is_interval_day_time());
        assert!(SqlTypeName::TimestampWithLocalTimeZone.is_datetime());
        assert!(!SqlTypeName::IntervalDay.is_datetime());
    }

    #[test]
    fn numeric_rank_orders_the_ladder() {
        assert!(SqlTypeName::TinyInt.numeric_rank() < SqlTypeName::BigInt.numeric_rank());
        assert!(SqlTypeName::BigInt.numeric_rank() < SqlTypeName::Decimal.numeric_rank());
        assert!(SqlTypeName::Decimal.numeric_rank() < SqlTypeName::Double.numeric_rank());
        assert_eq!(SqlTypeName::Varchar.numeric_rank(), None);
    }
}
