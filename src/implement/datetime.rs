use crate::error::ImpError;
use crate::implement::{CallImplementor, NullPolicy};
use crate::linq::{BinaryOp, Expr, Routine, UnaryOp};
use crate::rex::{OperatorKind, RexCall, Symbol};
use crate::translator::Translator;
use crate::types::{
    Primitive, Repr, SqlTypeName, TimeUnit, TimeUnitRange, MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE,
    MILLIS_PER_SECOND, MONTHS_PER_YEAR,
};

const I32: Repr = Repr::Prim(Primitive::I32);
const I64: Repr = Repr::Prim(Primitive::I64);

fn routine(name: &'static str, args: Vec<Expr>, repr: Repr) -> Expr {
    Expr::call(Routine::named(name), args, repr)
}

fn floor_div(e: Expr, divisor: i64) -> Expr {
    routine("floorDiv", vec![Expr::convert(e, I64), Expr::long(divisor)], I64)
}

/// Euclidean remainder; a factor of 1 leaves the operand alone.
fn floor_mod(e: Expr, factor: i64) -> Expr {
    if factor == 1 {
        e
    } else {
        routine("floorMod", vec![Expr::convert(e, I64), Expr::long(factor)], I64)
    }
}

fn binary(op: BinaryOp, a: Expr, b: Expr) -> Expr {
    Expr::binary(op, a, b)
}

fn to_local_timestamp(translator: &Translator, operand: Expr) -> Expr {
    let zone = routine("timeZone", vec![translator.root()], Repr::Object);
    routine("timestampWithLocalTimeZoneToTimestamp", vec![operand, zone], I64)
}

fn time_unit_range(translator: &Translator, e: &Expr, op: &str) -> Result<TimeUnitRange, ImpError> {
    match translator.literal_symbol(e) {
        Some(Symbol::TimeUnit(range)) => Ok(range),
        _ => Err(ImpError::invalid_call(op, "expected a time unit literal")),
    }
}

fn operands2<'a>(call: &RexCall, args: &'a [Expr]) -> Result<(&'a Expr, &'a Expr), ImpError> {
    match args {
        [a, b] => Ok((a, b)),
        _ => Err(ImpError::invalid_call(call.op.name(), format!("expected 2 operands, got {}", args.len()))),
    }
}

/// Divisor that isolates `unit` within the next larger one.
fn factor(unit: TimeUnit) -> Result<i64, ImpError> {
    match unit {
        TimeUnit::Day => Ok(1),
        TimeUnit::Hour => Ok(MILLIS_PER_DAY),
        TimeUnit::Minute => Ok(MILLIS_PER_HOUR),
        TimeUnit::Second => Ok(MILLIS_PER_MINUTE),
        TimeUnit::Millisecond => Ok(MILLIS_PER_SECOND),
        TimeUnit::Month | TimeUnit::Quarter => Ok(MONTHS_PER_YEAR),
        TimeUnit::Year | TimeUnit::Decade | TimeUnit::Century | TimeUnit::Millennium => Ok(1),
        other => Err(ImpError::unsupported(format!("no factor for {other:?}"))),
    }
}

/// EXTRACT(unit FROM temporal).
pub struct ExtractImplementor;

impl CallImplementor for ExtractImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        "extract"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let (unit_literal, operand) = operands2(call, args)?;
        let range = time_unit_range(translator, unit_literal, "EXTRACT")?;
        let unit = range.start_unit();
        let sql_type = call
            .operands
            .get(1)
            .map(|o| o.ty().name)
            .ok_or_else(|| ImpError::invalid_call("EXTRACT", "missing operand"))?;
        let mut operand = operand.clone();
        let date_extract = |days: Expr| routine("unixDateExtract", vec![unit_literal.clone(), days], I64);

        use TimeUnit as U;
        match unit {
            U::Millennium
            | U::Century
            | U::Year
            | U::Quarter
            | U::Month
            | U::Day
            | U::Dow
            | U::Decade
            | U::Doy
            | U::IsoDow
            | U::IsoYear
            | U::Week => match sql_type {
                t if t.is_interval() => {}
                SqlTypeName::TimestampWithLocalTimeZone => {
                    let local = to_local_timestamp(translator, operand);
                    return Ok(date_extract(floor_div(local, MILLIS_PER_DAY)));
                }
                SqlTypeName::Timestamp => return Ok(date_extract(floor_div(operand, MILLIS_PER_DAY))),
                SqlTypeName::Date => return Ok(date_extract(operand)),
                other => return Err(ImpError::unsupported(format!("EXTRACT {unit:?} from {other:?}"))),
            },
            U::Millisecond | U::Microsecond | U::Nanosecond => {
                if sql_type == SqlTypeName::Date {
                    return Ok(Expr::long(0));
                }
                let within_minute = floor_mod(operand, MILLIS_PER_MINUTE);
                return Ok(binary(BinaryOp::Multiply, within_minute, Expr::long(unit.per_millisecond())));
            }
            U::Epoch => {
                return match sql_type {
                    SqlTypeName::Date => {
                        let millis = binary(BinaryOp::Multiply, Expr::convert(operand, I64), Expr::long(MILLIS_PER_DAY));
                        Ok(binary(BinaryOp::Divide, millis, Expr::long(MILLIS_PER_SECOND)))
                    }
                    SqlTypeName::Timestamp => {
                        Ok(binary(BinaryOp::Divide, Expr::convert(operand, I64), Expr::long(MILLIS_PER_SECOND)))
                    }
                    SqlTypeName::TimestampWithLocalTimeZone => {
                        let local = to_local_timestamp(translator, operand);
                        Ok(binary(BinaryOp::Divide, local, Expr::long(MILLIS_PER_SECOND)))
                    }
                    other => Err(ImpError::unsupported(format!("EXTRACT EPOCH from {other:?}"))),
                };
            }
            U::Hour | U::Minute | U::Second => {
                if sql_type == SqlTypeName::Date {
                    return Ok(Expr::long(0));
                }
            }
        }

        // clock units and intervals: isolate the unit, then scale it down
        operand = floor_mod(operand, factor(unit)?);
        if unit == U::Quarter {
            operand = binary(BinaryOp::Subtract, operand, Expr::long(1));
        }
        operand = binary(BinaryOp::Divide, operand, Expr::long(unit.long_multiplier()));
        if unit == U::Quarter {
            operand = binary(BinaryOp::Add, operand, Expr::long(1));
        }
        Ok(operand)
    }
}

/// FLOOR / CEIL, numeric or temporal.
pub struct FloorCeilImplementor {
    floor: bool,
}

impl FloorCeilImplementor {
    pub fn floor() -> Self {
        Self { floor: true }
    }

    pub fn ceil() -> Self {
        Self { floor: false }
    }

    fn numeric_routine(&self) -> Routine {
        Routine::named(if self.floor { "floor" } else { "ceil" })
    }

    fn to_unit(&self, operand: Expr, repr: Repr, unit: TimeUnit) -> Expr {
        let multiplier = Expr::convert(Expr::long(unit.long_multiplier()), repr);
        Expr::call(self.numeric_routine(), vec![Expr::convert(operand, repr), multiplier], repr)
    }
}

impl CallImplementor for FloorCeilImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        if self.floor { "floor" } else { "ceil" }
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        match args {
            [operand] => {
                if call.ty.name.is_exact_integer() {
                    Ok(operand.clone())
                } else {
                    Ok(Expr::call(self.numeric_routine(), args.to_vec(), translator.repr_of(&call.ty)))
                }
            }
            [operand, unit_literal] => {
                let mut operand = operand.clone();
                let (repr, temporal, pre_floor) = match call.ty.name {
                    SqlTypeName::TimestampWithLocalTimeZone => {
                        operand = to_local_timestamp(translator, operand);
                        (I64, if self.floor { "unixTimestampFloor" } else { "unixTimestampCeil" }, true)
                    }
                    SqlTypeName::Timestamp => {
                        (I64, if self.floor { "unixTimestampFloor" } else { "unixTimestampCeil" }, true)
                    }
                    _ => (I32, if self.floor { "unixDateFloor" } else { "unixDateCeil" }, false),
                };
                let range = time_unit_range(translator, unit_literal, self.variable_name())?;
                match range {
                    TimeUnitRange::Year
                    | TimeUnitRange::Quarter
                    | TimeUnitRange::Month
                    | TimeUnitRange::Week
                    | TimeUnitRange::Day => {
                        let operand = if pre_floor { self.to_unit(operand, repr, TimeUnit::Day) } else { operand };
                        Ok(routine(temporal, vec![unit_literal.clone(), operand], repr))
                    }
                    _ => Ok(self.to_unit(operand, repr, range.start_unit())),
                }
            }
            _ => Err(ImpError::invalid_call(call.op.name(), format!("expected 1 or 2 operands, got {}", args.len()))),
        }
    }
}

/// DATETIME_PLUS and MINUS_DATE over dates, times, timestamps and intervals.
pub struct DatetimeArithmeticImplementor;

impl DatetimeArithmeticImplementor {
    /// TIME arithmetic wraps around midnight.
    fn normalize(result_type: SqlTypeName, e: Expr) -> Expr {
        match result_type {
            SqlTypeName::Time => Expr::convert(floor_mod(e, MILLIS_PER_DAY), I32),
            _ => e,
        }
    }

    fn multiply_divide(e: Expr, multiplier: i64, divider: i64) -> Expr {
        if multiplier == 1 {
            return if divider == 1 { e } else { binary(BinaryOp::Divide, e, Expr::long(divider)) };
        }
        if multiplier == divider {
            e
        } else if multiplier > divider {
            binary(BinaryOp::Multiply, e, Expr::long(multiplier / divider))
        } else {
            Self::multiply_divide(e, 1, divider / multiplier)
        }
    }
}

impl CallImplementor for DatetimeArithmeticImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        "datetime_arithmetic"
    }

    fn implement_safe(&self, _translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let (a, b) = operands2(call, args)?;
        let (type0, type1) = match call.operands.as_slice() {
            [o0, o1] => (o0.ty().name, o1.ty().name),
            _ => return Err(ImpError::invalid_call(call.op.name(), "expected 2 operands")),
        };
        let result_type = call.ty.name;
        let minus = call.kind() == Some(OperatorKind::MinusDate);
        let (mut trop0, mut trop1) = (a.clone(), b.clone());

        match type0 {
            SqlTypeName::Date => {
                if result_type == SqlTypeName::Timestamp {
                    trop0 = binary(BinaryOp::Multiply, Expr::convert(trop0, I64), Expr::long(MILLIS_PER_DAY));
                } else if type1.is_interval_day_time() {
                    trop1 = Expr::convert(binary(BinaryOp::Divide, trop1, Expr::long(MILLIS_PER_DAY)), I32);
                }
            }
            SqlTypeName::Time => trop1 = Expr::convert(trop1, I32),
            _ => {}
        }

        if type1.is_interval_year_month() {
            if minus {
                trop1 = Expr::unary(UnaryOp::Negate, trop1);
            }
            return Ok(match result_type {
                // months do not move a time of day
                SqlTypeName::Time => trop0,
                _ if matches!(type0, SqlTypeName::Timestamp | SqlTypeName::TimestampWithLocalTimeZone) => {
                    routine("addMonths", vec![trop0, trop1], I64)
                }
                _ => routine("addMonthsInt", vec![trop0, trop1], I32),
            });
        }
        if type1.is_interval_day_time() {
            let op = if minus { BinaryOp::Subtract } else { BinaryOp::Add };
            return Ok(Self::normalize(result_type, binary(op, trop0, trop1)));
        }
        if minus {
            if result_type.is_interval_year_month() {
                let name = if type0 == SqlTypeName::Date { "subtractMonths" } else { "subtractMonthsTimestamp" };
                return Ok(routine(name, vec![trop0, trop1], I32));
            }
            let from = if type1 == SqlTypeName::Date { TimeUnit::Day } else { TimeUnit::Millisecond };
            let difference = Expr::convert(binary(BinaryOp::Subtract, trop0, trop1), I64);
            return Ok(Self::multiply_divide(difference, from.long_multiplier(), TimeUnit::Millisecond.long_multiplier()));
        }
        Err(ImpError::unsupported(format!("{} of {type0:?} and {type1:?}", call.op.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implement::_tests::fixtures::*;
    use crate::rex::RexNode;
    use crate::runtime::Value;
    use crate::types::RelType;

    // 2024-03-15 and 2024-03-15 13:45:30.250
    const DAY: i64 = 19797;
    const TS: i64 = DAY * MILLIS_PER_DAY + 13 * MILLIS_PER_HOUR + 45 * MILLIS_PER_MINUTE + 30_250;

    fn date_lit(d: i64) -> RexNode {
        RexNode::literal(Value::Int(d), RelType::new(SqlTypeName::Date))
    }

    fn ts_lit(ms: i64) -> RexNode {
        RexNode::literal(Value::Int(ms), RelType::new(SqlTypeName::Timestamp))
    }

    fn unit(range: TimeUnitRange) -> RexNode {
        RexNode::symbol(Symbol::TimeUnit(range))
    }

    fn extract(range: TimeUnitRange, operand: RexNode) -> Value {
        let call = RexNode::call(OperatorKind::Extract, bigint_t(), vec![unit(range), operand]);
        let (block, result) = compile(&call);
        run(&block, &result, &[])
    }

    // ---- EXTRACT ----

    #[test]
    fn extract_calendar_fields() {
        assert_eq!(extract(TimeUnitRange::Year, date_lit(DAY)), Value::Int(2024));
        assert_eq!(extract(TimeUnitRange::Month, ts_lit(TS)), Value::Int(3));
        assert_eq!(extract(TimeUnitRange::Day, ts_lit(TS)), Value::Int(15));
        assert_eq!(extract(TimeUnitRange::Quarter, date_lit(DAY)), Value::Int(1));
        assert_eq!(extract(TimeUnitRange::Dow, date_lit(DAY)), Value::Int(6));
        assert_eq!(extract(TimeUnitRange::Doy, date_lit(DAY)), Value::Int(75));
    }

    #[test]
    fn extract_clock_fields() {
        assert_eq!(extract(TimeUnitRange::Hour, ts_lit(TS)), Value::Int(13));
        assert_eq!(extract(TimeUnitRange::Minute, ts_lit(TS)), Value::Int(45));
        assert_eq!(extract(TimeUnitRange::Second, ts_lit(TS)), Value::Int(30));
        assert_eq!(extract(TimeUnitRange::Millisecond, ts_lit(TS)), Value::Int(30_250));
        assert_eq!(extract(TimeUnitRange::Microsecond, ts_lit(TS)), Value::Int(30_250_000));
    }

    #[test]
    fn sub_second_and_clock_units_on_date_are_zero() {
        for range in [TimeUnitRange::Millisecond, TimeUnitRange::Microsecond, TimeUnitRange::Nanosecond, TimeUnitRange::Hour] {
            assert_eq!(extract(range, date_lit(DAY)), Value::Int(0));
        }
    }

    #[test]
    fn extract_epoch() {
        assert_eq!(extract(TimeUnitRange::Epoch, date_lit(1)), Value::Int(86_400));
        assert_eq!(extract(TimeUnitRange::Epoch, ts_lit(TS)), Value::Int(TS / 1000));
    }

    #[test]
    fn extract_from_year_month_interval() {
        let fourteen_months = RexNode::literal(Value::Int(14), RelType::new(SqlTypeName::IntervalYearMonth));
        assert_eq!(extract(TimeUnitRange::Year, fourteen_months.clone()), Value::Int(1));
        assert_eq!(extract(TimeUnitRange::Month, fourteen_months.clone()), Value::Int(2));
        // months 0..=2 are the first quarter
        assert_eq!(extract(TimeUnitRange::Quarter, fourteen_months), Value::Int(1));
        let five = RexNode::literal(Value::Int(5), RelType::new(SqlTypeName::IntervalMonth));
        assert_eq!(extract(TimeUnitRange::Quarter, five), Value::Int(2));
    }

    #[test]
    fn extract_week_from_interval_is_unsupported() {
        let call = RexNode::call(
            OperatorKind::Extract,
            bigint_t(),
            vec![unit(TimeUnitRange::Week), RexNode::literal(Value::Int(3), RelType::new(SqlTypeName::IntervalMonth))],
        );
        let err = compile_err(&call);
        assert!(matches!(err, ImpError::Unsupported(_)));
    }

    #[test]
    fn extract_without_unit_literal_is_invalid() {
        let call = RexNode::call(OperatorKind::Extract, bigint_t(), vec![lit_i(1), date_lit(DAY)]);
        assert!(matches!(compile_err(&call), ImpError::InvalidCall { .. }));
    }

    // ---- FLOOR / CEIL ----

    #[test]
    fn floor_timestamp_to_month_and_hour() {
        let ts_t = RelType::new(SqlTypeName::Timestamp);
        let call = RexNode::call(OperatorKind::Floor, ts_t.clone(), vec![ts_lit(TS), unit(TimeUnitRange::Month)]);
        let (block, result) = compile(&call);
        // 2024-03-01
        assert_eq!(run(&block, &result, &[]), Value::Int((DAY - 14) * MILLIS_PER_DAY));

        let call = RexNode::call(OperatorKind::Floor, ts_t.clone(), vec![ts_lit(TS), unit(TimeUnitRange::Hour)]);
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(DAY * MILLIS_PER_DAY + 13 * MILLIS_PER_HOUR));

        let call = RexNode::call(OperatorKind::Ceil, ts_t, vec![ts_lit(TS), unit(TimeUnitRange::Hour)]);
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(DAY * MILLIS_PER_DAY + 14 * MILLIS_PER_HOUR));
    }

    #[test]
    fn floor_date_to_year() {
        let call = RexNode::call(
            OperatorKind::Floor,
            RelType::new(SqlTypeName::Date),
            vec![date_lit(DAY), unit(TimeUnitRange::Year)],
        );
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(19723));
    }

    #[test]
    fn floor_of_integer_is_identity() {
        let call = RexNode::call(OperatorKind::Floor, int_t(), vec![lit_i(7)]);
        let (block, result) = compile(&call);
        assert!(!calls_routine(&block, &result, "floor"));
        assert_eq!(run(&block, &result, &[]), Value::Int(7));

        let call = RexNode::call(OperatorKind::Ceil, double_t(), vec![lit_f(1.2)]);
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::float(2.0));
    }

    // ---- DATETIME_PLUS / MINUS_DATE ----

    #[test]
    fn date_plus_months_clamps_day() {
        // 2024-01-31 + 1 month = 2024-02-29
        let jan31 = date_lit(19723 + 30);
        let month = RexNode::literal(Value::Int(1), RelType::new(SqlTypeName::IntervalMonth));
        let call = RexNode::call(OperatorKind::DatetimePlus, RelType::new(SqlTypeName::Date), vec![jan31, month]);
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(19723 + 31 + 28));
    }

    #[test]
    fn time_plus_interval_wraps_midnight() {
        let t = RexNode::literal(Value::Int(23 * MILLIS_PER_HOUR), RelType::new(SqlTypeName::Time));
        let two_hours = RexNode::literal(Value::Int(2 * MILLIS_PER_HOUR), RelType::new(SqlTypeName::IntervalHour));
        let call = RexNode::call(OperatorKind::DatetimePlus, RelType::new(SqlTypeName::Time), vec![t, two_hours]);
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(MILLIS_PER_HOUR));
    }

    #[test]
    fn date_plus_day_interval() {
        let three_days = RexNode::literal(Value::Int(3 * MILLIS_PER_DAY), RelType::new(SqlTypeName::IntervalDay));
        let call = RexNode::call(OperatorKind::DatetimePlus, RelType::new(SqlTypeName::Date), vec![date_lit(DAY), three_days]);
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(DAY + 3));
    }

    #[test]
    fn date_minus_date_is_milliseconds() {
        let call = RexNode::call(
            OperatorKind::MinusDate,
            RelType::new(SqlTypeName::IntervalDay),
            vec![date_lit(DAY), date_lit(DAY - 2)],
        );
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(2 * MILLIS_PER_DAY));
    }

    #[test]
    fn date_minus_date_in_months() {
        let call = RexNode::call(
            OperatorKind::MinusDate,
            RelType::new(SqlTypeName::IntervalMonth),
            vec![date_lit(DAY), date_lit(19723)],
        );
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(2));
    }
}
