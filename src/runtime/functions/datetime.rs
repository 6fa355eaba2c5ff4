use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};

use crate::error::RuntimeError;
use crate::rex::Symbol;
use crate::runtime::functions::{arg, floor_div, floor_mod, int_arg, Builtin};
use crate::runtime::Value;
use crate::types::{TimeUnit, MILLIS_PER_DAY, MILLIS_PER_SECOND};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i64 = 719_163;

pub(crate) fn register(routines: &mut HashMap<&'static str, Builtin>) {
    routines.insert("unixDateExtract", |a| {
        let unit = unit_arg("unixDateExtract", a, 0)?;
        Ok(Value::Int(date_extract(unit, date_of(int_arg("unixDateExtract", a, 1)?)?)?))
    });
    routines.insert("unixDateFloor", |a| {
        let unit = unit_arg("unixDateFloor", a, 0)?;
        Ok(Value::Int(date_floor(unit, int_arg("unixDateFloor", a, 1)?, true)?))
    });
    routines.insert("unixDateCeil", |a| {
        let unit = unit_arg("unixDateCeil", a, 0)?;
        Ok(Value::Int(date_floor(unit, int_arg("unixDateCeil", a, 1)?, false)?))
    });
    routines.insert("unixTimestampFloor", |a| timestamp_floor("unixTimestampFloor", a, true));
    routines.insert("unixTimestampCeil", |a| timestamp_floor("unixTimestampCeil", a, false));
    routines.insert("addMonths", |a| {
        let ts = int_arg("addMonths", a, 0)?;
        let months = int_arg("addMonths", a, 1)?;
        let (days, time) = (floor_div(ts, MILLIS_PER_DAY)?, floor_mod(ts, MILLIS_PER_DAY)?);
        Ok(Value::Int(add_months(days, months)? * MILLIS_PER_DAY + time))
    });
    routines.insert("addMonthsInt", |a| {
        Ok(Value::Int(add_months(int_arg("addMonthsInt", a, 0)?, int_arg("addMonthsInt", a, 1)?)?))
    });
    routines.insert("subtractMonths", |a| {
        let (d0, d1) = (int_arg("subtractMonths", a, 0)?, int_arg("subtractMonths", a, 1)?);
        Ok(Value::Int(subtract_months(d0 * MILLIS_PER_DAY, d1 * MILLIS_PER_DAY)?))
    });
    routines.insert("subtractMonthsTimestamp", |a| {
        let (t0, t1) = (int_arg("subtractMonthsTimestamp", a, 0)?, int_arg("subtractMonthsTimestamp", a, 1)?);
        Ok(Value::Int(subtract_months(t0, t1)?))
    });
    routines.insert("lastDay", |a| Ok(Value::Int(last_day(int_arg("lastDay", a, 0)?)?)));
    routines.insert("lastDayTimestamp", |a| {
        Ok(Value::Int(last_day(floor_div(int_arg("lastDayTimestamp", a, 0)?, MILLIS_PER_DAY)?)?))
    });
    routines.insert("dayNameWithDate", |a| name_of("dayNameWithDate", a, false, "%A"));
    routines.insert("dayNameWithTimestamp", |a| name_of("dayNameWithTimestamp", a, true, "%A"));
    routines.insert("monthNameWithDate", |a| name_of("monthNameWithDate", a, false, "%B"));
    routines.insert("monthNameWithTimestamp", |a| name_of("monthNameWithTimestamp", a, true, "%B"));

    routines.insert("timestampSeconds", |a| scaled("timestampSeconds", a, |v| v.checked_mul(MILLIS_PER_SECOND)));
    routines.insert("timestampMillis", |a| scaled("timestampMillis", a, Some));
    routines.insert("timestampMicros", |a| scaled("timestampMicros", a, |v| Some(v.div_euclid(1_000))));
    routines.insert("unixSeconds", |a| scaled("unixSeconds", a, |v| Some(v.div_euclid(MILLIS_PER_SECOND))));
    routines.insert("unixMillis", |a| scaled("unixMillis", a, Some));
    routines.insert("unixMicros", |a| scaled("unixMicros", a, |v| v.checked_mul(1_000)));
    routines.insert("dateFromUnixDate", |a| scaled("dateFromUnixDate", a, Some));
    routines.insert("unixDate", |a| scaled("unixDate", a, Some));
    routines.insert("timestampWithLocalTimeZoneToTimestamp", |a| {
        let ts = int_arg("timestampWithLocalTimeZoneToTimestamp", a, 0)?;
        let offset = int_arg("timestampWithLocalTimeZoneToTimestamp", a, 1)?;
        ts.checked_add(offset)
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::Overflow("timestampWithLocalTimeZoneToTimestamp".into()))
    });
}

pub(crate) fn date_of(days: i64) -> Result<NaiveDate, RuntimeError> {
    days.checked_add(EPOCH_DAYS_FROM_CE)
        .and_then(|d| i32::try_from(d).ok())
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| RuntimeError::Overflow(format!("date {days}")))
}

pub(crate) fn days_of(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 - EPOCH_DAYS_FROM_CE
}

fn unit_arg(routine: &str, args: &[Value], i: usize) -> Result<TimeUnit, RuntimeError> {
    match arg(routine, args, i)? {
        Value::Symbol(Symbol::TimeUnit(range)) => Ok(range.start_unit()),
        other => Err(RuntimeError::invalid_argument(routine, format!("expected a time unit, got {}", other.type_name()))),
    }
}

fn date_extract(unit: TimeUnit, date: NaiveDate) -> Result<i64, RuntimeError> {
    let year = date.year() as i64;
    Ok(match unit {
        TimeUnit::Year => year,
        TimeUnit::Month => date.month() as i64,
        TimeUnit::Day => date.day() as i64,
        TimeUnit::Quarter => (date.month() as i64 - 1) / 3 + 1,
        // Sunday is 1
        TimeUnit::Dow => date.weekday().number_from_sunday() as i64,
        TimeUnit::IsoDow => date.weekday().number_from_monday() as i64,
        TimeUnit::Doy => date.ordinal() as i64,
        TimeUnit::Week => date.iso_week().week() as i64,
        TimeUnit::IsoYear => date.iso_week().year() as i64,
        TimeUnit::Decade => year.div_euclid(10),
        TimeUnit::Century => {
            if year > 0 { (year + 99) / 100 } else { (year - 99) / 100 }
        }
        TimeUnit::Millennium => {
            if year > 0 { (year + 999) / 1000 } else { (year - 999) / 1000 }
        }
        other => return Err(RuntimeError::invalid_argument("unixDateExtract", format!("{other:?} is not a date field"))),
    })
}

/// Start of the period containing `days`, or of the next period when
/// rounding up from inside one.
fn date_floor(unit: TimeUnit, days: i64, floor: bool) -> Result<i64, RuntimeError> {
    let date = date_of(days)?;
    let start = |y: i32, m: u32| {
        NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(|| RuntimeError::Overflow(format!("date {y}-{m}")))
    };
    let (down, next) = match unit {
        TimeUnit::Day => return Ok(days),
        TimeUnit::Week => {
            let down = days - date.weekday().num_days_from_sunday() as i64;
            (down, down + 7)
        }
        TimeUnit::Month => {
            let down = start(date.year(), date.month())?;
            (days_of(down), days_of(shift_months(down, 1)?))
        }
        TimeUnit::Quarter => {
            let down = start(date.year(), (date.month() - 1) / 3 * 3 + 1)?;
            (days_of(down), days_of(shift_months(down, 3)?))
        }
        TimeUnit::Year => {
            let down = start(date.year(), 1)?;
            (days_of(down), days_of(shift_months(down, 12)?))
        }
        other => {
            return Err(RuntimeError::invalid_argument("unixDateFloor", format!("cannot round a date to {other:?}")));
        }
    };
    Ok(if floor || down == days { down } else { next })
}

fn timestamp_floor(routine: &str, args: &[Value], floor: bool) -> Result<Value, RuntimeError> {
    let unit = unit_arg(routine, args, 0)?;
    let ts = int_arg(routine, args, 1)?;
    let days = floor_div(ts, MILLIS_PER_DAY)?;
    let exact = floor_mod(ts, MILLIS_PER_DAY)? == 0;
    let rounded = date_floor(unit, days, floor)?;
    // a partial day rounds up past its own midnight
    let rounded = if !floor && !exact && rounded == days { days + 1 } else { rounded };
    Ok(Value::Int(rounded * MILLIS_PER_DAY))
}

fn shift_months(date: NaiveDate, months: i64) -> Result<NaiveDate, RuntimeError> {
    let overflow = || RuntimeError::Overflow(format!("{date} plus {months} months"));
    let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| overflow())?;
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    };
    shifted.ok_or_else(overflow)
}

/// Adds months to a day number; a day past the end of the target month
/// clamps to its last day.
fn add_months(days: i64, months: i64) -> Result<i64, RuntimeError> {
    Ok(days_of(shift_months(date_of(days)?, months)?))
}

/// Whole months from `t1` to `t0`, both in milliseconds.
fn subtract_months(t0: i64, t1: i64) -> Result<i64, RuntimeError> {
    if t0 < t1 {
        return Ok(-subtract_months(t1, t0)?);
    }
    let (d0, d1) = (date_of(floor_div(t0, MILLIS_PER_DAY)?)?, date_of(floor_div(t1, MILLIS_PER_DAY)?)?);
    let mut months = (d0.year() as i64 - d1.year() as i64) * 12 + d0.month() as i64 - d1.month() as i64;
    let time1 = floor_mod(t1, MILLIS_PER_DAY)?;
    while months > 0 && days_of(shift_months(d1, months)?) * MILLIS_PER_DAY + time1 > t0 {
        months -= 1;
    }
    Ok(months)
}

fn last_day(days: i64) -> Result<i64, RuntimeError> {
    let date = date_of(days)?;
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| RuntimeError::Overflow(format!("date {days}")))?;
    Ok(days_of(shift_months(first, 1)?) - 1)
}

fn name_of(routine: &str, args: &[Value], timestamp: bool, format: &str) -> Result<Value, RuntimeError> {
    let v = int_arg(routine, args, 0)?;
    let days = if timestamp { floor_div(v, MILLIS_PER_DAY)? } else { v };
    Ok(Value::str(date_of(days)?.format(format).to_string()))
}

fn scaled(routine: &str, args: &[Value], f: fn(i64) -> Option<i64>) -> Result<Value, RuntimeError> {
    f(int_arg(routine, args, 0)?)
        .map(Value::Int)
        .ok_or_else(|| RuntimeError::Overflow(routine.to_string()))
}
