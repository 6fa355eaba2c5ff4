use serde::{Deserialize, Serialize};

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
pub const MONTHS_PER_YEAR: i64 = 12;

/// Calendar and clock units that EXTRACT, FLOOR and CEIL understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Quarter,
    IsoYear,
    Week,
    Millennium,
    Century,
    Decade,
    Dow,
    IsoDow,
    Doy,
    Epoch,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    /// Size of one unit in the base of its family: months for year-month
    /// units, milliseconds for day-time units, 1 for ordinal units.
    pub fn multiplier(self) -> f64 {
        match self {
            TimeUnit::Year | TimeUnit::IsoYear => 12.0,
            TimeUnit::Month => 1.0,
            TimeUnit::Quarter => 3.0,
            TimeUnit::Decade => 120.0,
            TimeUnit::Century => 1_200.0,
            TimeUnit::Millennium => 12_000.0,
            TimeUnit::Week => (7 * MILLIS_PER_DAY) as f64,
            TimeUnit::Day => MILLIS_PER_DAY as f64,
            TimeUnit::Hour => MILLIS_PER_HOUR as f64,
            TimeUnit::Minute => MILLIS_PER_MINUTE as f64,
            TimeUnit::Second => MILLIS_PER_SECOND as f64,
            TimeUnit::Millisecond | TimeUnit::Dow | TimeUnit::IsoDow | TimeUnit::Doy | TimeUnit::Epoch => 1.0,
            TimeUnit::Microsecond => 1e-3,
            TimeUnit::Nanosecond => 1e-6,
        }
    }

    /// Whole-number multiplier; sub-millisecond units truncate to 0.
    pub fn long_multiplier(self) -> i64 {
        self.multiplier() as i64
    }

    /// How many of this unit fit in one millisecond (1 for everything coarser).
    pub fn per_millisecond(self) -> i64 {
        let m = self.multiplier();
        if m >= 1.0 { 1 } else { (1.0 / m).round() as i64 }
    }

    pub fn is_year_month(self) -> bool {
        matches!(
            self,
            TimeUnit::Year
                | TimeUnit::Month
                | TimeUnit::Quarter
                | TimeUnit::IsoYear
                | TimeUnit::Decade
                | TimeUnit::Century
                | TimeUnit::Millennium
        )
    }
}

/// A unit or a leading-to-trailing unit span, as written in an interval
/// qualifier or as the first argument of EXTRACT / FLOOR / CEIL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnitRange {
    Year,
    YearToMonth,
    Quarter,
    Month,
    Week,
    Day,
    DayToHour,
    DayToMinute,
    DayToSecond,
    Hour,
    HourToMinute,
    HourToSecond,
    Minute,
    MinuteToSecond,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
    IsoYear,
    Millennium,
    Century,
    Decade,
    Dow,
    IsoDow,
    Doy,
    Epoch,
}

impl TimeUnitRange {
    pub fn start_unit(self) -> TimeUnit {
        use TimeUnitRange as R;
        match self {
            R::Year | R::YearToMonth => TimeUnit::Year,
            R::Quarter => TimeUnit::Quarter,
            R::Month => TimeUnit::Month,
            R::Week => TimeUnit::Week,
            R::Day | R::DayToHour | R::DayToMinute | R::DayToSecond => TimeUnit::Day,
            R::Hour | R::HourToMinute | R::HourToSecond => TimeUnit::Hour,
            R::Minute | R::MinuteToSecond => TimeUnit::Minute,
            R::Second => TimeUnit::Second,
            R::Millisecond => TimeUnit::Millisecond,
            R::Microsecond => TimeUnit::Microsecond,
            R::Nanosecond => TimeUnit::Nanosecond,
            R::IsoYear => TimeUnit::IsoYear,
            R::Millennium => TimeUnit::Millennium,
            R::Century => TimeUnit::Century,
            R::Decade => TimeUnit::Decade,
            R::Dow => TimeUnit::Dow,
            R::IsoDow => TimeUnit::IsoDow,
            R::Doy => TimeUnit::Doy,
            R::Epoch => TimeUnit::Epoch,
        }
    }

    pub fn end_unit(self) -> Option<TimeUnit> {
        use TimeUnitRange as R;
        match self {
            R::YearToMonth => Some(TimeUnit::Month),
            R::DayToHour => Some(TimeUnit::Hour),
            R::DayToMinute | R::HourToMinute => Some(TimeUnit::Minute),
            R::DayToSecond | R::HourToSecond | R::MinuteToSecond => Some(TimeUnit::Second),
            _ => None,
        }
    }
}
