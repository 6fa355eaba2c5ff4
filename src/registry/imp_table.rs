use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::aggregate::{
    AggImplementor, BitOpImplementor, CollectImplementor, CountImplementor, CountWinImplementor, GroupingImplementor,
    IntersectionImplementor, JsonAggImplementor, ListAggImplementor, MinMaxImplementor, RankImplementor,
    RowNumberImplementor, SingleValueImplementor, Strict, SumImplementor,
};
use crate::error::ImpError;
use crate::implement::{
    ArityImplementor, BinaryImplementor, CallImplementor, CastImplementor, CoalesceImplementor,
    Connective, DatetimeArithmeticImplementor, DefaultImplementor, ExtractImplementor, FloorCeilImplementor,
    IsPredicateImplementor, ItemImplementor, JsonValueImplementor, LogicalImplementor, LogicalNotImplementor,
    MethodImplementor, NotImplementor, NullPolicy, PiImplementor, ReinterpretImplementor, SequenceImplementor,
    SystemFunctionImplementor, TemporalMethodImplementor, TrimImplementor, UnaryImplementor,
    ValueConstructorImplementor,
};
use crate::linq::{BinaryOp, UnaryOp};
use crate::rex::{AggFunction, AggKind, JsonNullClause, OperatorKind, SqlOperator};
use crate::translator::CompilerConfig;

/// Builds a fresh aggregate strategy for one call site.
type AggFactory = fn(AggKind) -> Box<dyn AggImplementor>;

static INSTANCE: Lazy<ImpTable> = Lazy::new(ImpTable::new);

/// Operator and aggregate dispatch.
///
/// Bindings are fixed at construction; the table is then shared read-only
/// by every compilation.
pub struct ImpTable {
    config: CompilerConfig,
    operators: HashMap<OperatorKind, Arc<dyn CallImplementor>>,
    aggregates: HashMap<AggKind, AggFactory>,
    win_aggregates: HashMap<AggKind, AggFactory>,
}

impl Default for ImpTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ImpTable {
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        let mut table = Self {
            config,
            operators: HashMap::new(),
            aggregates: HashMap::new(),
            win_aggregates: HashMap::new(),
        };
        table.register_strings();
        table.register_logic_and_arithmetic();
        table.register_datetime();
        table.register_predicates_and_patterns();
        table.register_collections();
        table.register_misc();
        table.register_json();
        table.register_system();
        table.register_aggregates();
        debug!(
            operators = table.operators.len(),
            aggregates = table.aggregates.len(),
            window_aggregates = table.win_aggregates.len(),
            "implementor table built"
        );
        table
    }

    /// Process-wide table with the default configuration.
    pub fn instance() -> &'static ImpTable {
        &INSTANCE
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Operators with a binding, sorted.
    pub fn operators(&self) -> Vec<OperatorKind> {
        let mut kinds: Vec<OperatorKind> = self.operators.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// The implementor for `op`, or `None` when nothing is bound.
    ///
    /// A user-defined function that cannot produce its own code is a
    /// configuration error.
    pub fn get(&self, op: &SqlOperator) -> Result<Option<Arc<dyn CallImplementor>>, ImpError> {
        match op {
            SqlOperator::Builtin(kind) => Ok(self.operators.get(kind).cloned()),
            SqlOperator::UserDefined(udf) | SqlOperator::TableFunction(udf) | SqlOperator::TableMacro(udf) => {
                match udf.function.as_implementable() {
                    Some(implementable) => Ok(Some(implementable.implementor())),
                    None => {
                        warn!(function = udf.name(), "user-defined function is not implementable");
                        Err(ImpError::configuration(format!("user-defined function {} is not implementable", udf.name())))
                    }
                }
            }
            SqlOperator::TypeConstructor(_) => Ok(self.operators.get(&OperatorKind::Row).cloned()),
        }
    }

    /// A strategy for `function`. Windowed lookups prefer a window-only
    /// strategy and fall back to the plain one when the config allows it.
    pub fn aggregate(&self, function: &AggFunction, for_window: bool) -> Result<Box<dyn AggImplementor>, ImpError> {
        let kind = match function {
            AggFunction::UserDefined(udf) => {
                return match udf.function.as_implementable() {
                    Some(implementable) => Ok(implementable.implementor(for_window)),
                    None => {
                        warn!(aggregate = udf.name(), "user-defined aggregate is not implementable");
                        Err(ImpError::configuration(format!("user-defined aggregate {} is not implementable", udf.name())))
                    }
                };
            }
            AggFunction::Builtin(kind) => *kind,
        };
        if for_window {
            if let Some(factory) = self.win_aggregates.get(&kind) {
                return Ok(factory(kind));
            }
            if !self.config.window_reuse.allows(kind) {
                warn!(aggregate = %function.name(), "aggregate cannot be evaluated over a window");
                return Err(ImpError::configuration(format!("{} cannot be used as a window aggregate", function.name())));
            }
            debug!(aggregate = %function.name(), "reusing plain aggregate strategy over a window");
        }
        match self.aggregates.get(&kind) {
            Some(factory) => Ok(factory(kind)),
            None => {
                warn!(aggregate = %function.name(), for_window, "no aggregate strategy");
                Err(ImpError::configuration(format!("no strategy for aggregate {}", function.name())))
            }
        }
    }

    fn bind(&mut self, kind: OperatorKind, implementor: impl CallImplementor + 'static) {
        self.operators.insert(kind, Arc::new(implementor));
    }

    fn method(&mut self, kind: OperatorKind, routine: &'static str, policy: NullPolicy) {
        self.bind(kind, MethodImplementor::new(routine, policy));
    }

    /// Binds `kind` to `routine` and `negated` to its negation.
    fn method_with_negation(&mut self, kind: OperatorKind, negated: OperatorKind, routine: &'static str, policy: NullPolicy) {
        let positive: Arc<dyn CallImplementor> = Arc::new(MethodImplementor::new(routine, policy));
        self.operators.insert(kind, positive.clone());
        self.bind(negated, NotImplementor::of(positive));
    }

    fn binary(&mut self, kind: OperatorKind, op: BinaryOp, backup: &'static str) {
        self.bind(kind, BinaryImplementor::new(op, NullPolicy::Strict, true, Some(backup)));
    }

    fn register_strings(&mut self) {
        use OperatorKind as K;
        let strict = [
            (K::Upper, "upper"),
            (K::Lower, "lower"),
            (K::InitCap, "initcap"),
            (K::ToBase64, "toBase64"),
            (K::FromBase64, "fromBase64"),
            (K::Md5, "md5"),
            (K::Sha1, "sha1"),
            (K::Substring, "substring"),
            (K::Replace, "replace"),
            (K::Translate3, "translate3"),
            (K::Chr, "chr"),
            (K::CharacterLength, "charLength"),
            (K::CharLength, "charLength"),
            (K::Concat, "concat"),
            (K::ConcatFunction, "concatMulti"),
            (K::Overlay, "overlay"),
            (K::Position, "position"),
            (K::Ascii, "ascii"),
            (K::Repeat, "repeat"),
            (K::Space, "space"),
            (K::Strcmp, "strcmp"),
            (K::Soundex, "soundex"),
            (K::Difference, "difference"),
            (K::Reverse, "reverse"),
        ];
        for (kind, routine) in strict {
            self.method(kind, routine, NullPolicy::Strict);
        }
        self.method(K::Left, "left", NullPolicy::Any);
        self.method(K::Right, "right", NullPolicy::Any);
        // null only when both sides are null; the routine decides
        self.method(K::Concat2, "concatWithNull", NullPolicy::None);
        self.bind(K::Trim, TrimImplementor);
    }

    fn register_logic_and_arithmetic(&mut self) {
        use OperatorKind as K;
        self.bind(K::And, LogicalImplementor::new(Connective::And));
        self.bind(K::Or, LogicalImplementor::new(Connective::Or));
        self.bind(K::Not, LogicalNotImplementor);

        self.binary(K::LessThan, BinaryOp::LessThan, "lt");
        self.binary(K::LessThanOrEqual, BinaryOp::LessThanOrEqual, "le");
        self.binary(K::GreaterThan, BinaryOp::GreaterThan, "gt");
        self.binary(K::GreaterThanOrEqual, BinaryOp::GreaterThanOrEqual, "ge");
        self.binary(K::Equals, BinaryOp::Equal, "eq");
        self.binary(K::NotEquals, BinaryOp::NotEqual, "ne");

        self.binary(K::Plus, BinaryOp::Add, "plus");
        self.binary(K::Minus, BinaryOp::Subtract, "minus");
        self.binary(K::Multiply, BinaryOp::Multiply, "multiply");
        self.binary(K::Divide, BinaryOp::Divide, "divide");
        self.binary(K::DivideInteger, BinaryOp::Divide, "divide");
        self.bind(K::UnaryMinus, UnaryImplementor::new(UnaryOp::Negate, NullPolicy::Strict));
        self.bind(K::UnaryPlus, UnaryImplementor::new(UnaryOp::UnaryPlus, NullPolicy::Strict));

        let math = [
            (K::Mod, "mod"),
            (K::Exp, "exp"),
            (K::Power, "power"),
            (K::Ln, "ln"),
            (K::Log10, "log10"),
            (K::Abs, "abs"),
            (K::Acos, "acos"),
            (K::Asin, "asin"),
            (K::Atan, "atan"),
            (K::Atan2, "atan2"),
            (K::Cbrt, "cbrt"),
            (K::Cos, "cos"),
            (K::Cosh, "cosh"),
            (K::Cot, "cot"),
            (K::Degrees, "degrees"),
            (K::Radians, "radians"),
            (K::Round, "round"),
            (K::Sign, "sign"),
            (K::Sin, "sin"),
            (K::Sinh, "sinh"),
            (K::Tan, "tan"),
            (K::Tanh, "tanh"),
            (K::Truncate, "truncate"),
        ];
        for (kind, routine) in math {
            self.method(kind, routine, NullPolicy::Strict);
        }
        self.bind(K::Rand, ArityImplementor::new("rand", NullPolicy::Strict, 0, &["rand", "randSeed"]));
        self.bind(
            K::RandInteger,
            ArityImplementor::new("rand_integer", NullPolicy::Strict, 1, &["randInteger", "randIntegerSeed"]),
        );
        self.bind(K::Pi, PiImplementor);
    }

    fn register_datetime(&mut self) {
        use OperatorKind as K;
        self.bind(K::DatetimePlus, DatetimeArithmeticImplementor);
        self.bind(K::MinusDate, DatetimeArithmeticImplementor);
        self.bind(K::Extract, ExtractImplementor);
        self.bind(K::Floor, FloorCeilImplementor::floor());
        self.bind(K::Ceil, FloorCeilImplementor::ceil());
        self.bind(K::LastDay, TemporalMethodImplementor::new("last_day", "lastDay", "lastDayTimestamp", false));
        self.bind(
            K::DayName,
            TemporalMethodImplementor::new("day_name", "dayNameWithDate", "dayNameWithTimestamp", true),
        );
        self.bind(
            K::MonthName,
            TemporalMethodImplementor::new("month_name", "monthNameWithDate", "monthNameWithTimestamp", true),
        );
        let conversions = [
            (K::TimestampSeconds, "timestampSeconds"),
            (K::TimestampMillis, "timestampMillis"),
            (K::TimestampMicros, "timestampMicros"),
            (K::UnixSeconds, "unixSeconds"),
            (K::UnixMillis, "unixMillis"),
            (K::UnixMicros, "unixMicros"),
            (K::DateFromUnixDate, "dateFromUnixDate"),
            (K::UnixDate, "unixDate"),
        ];
        for (kind, routine) in conversions {
            self.method(kind, routine, NullPolicy::Strict);
        }
    }

    fn register_predicates_and_patterns(&mut self) {
        use OperatorKind as K;
        for kind in [K::IsNull, K::IsNotNull, K::IsTrue, K::IsNotTrue, K::IsFalse, K::IsNotFalse] {
            self.bind(kind, IsPredicateImplementor::new(kind));
        }
        self.method_with_negation(K::Like, K::NotLike, "like", NullPolicy::Strict);
        self.method_with_negation(K::SimilarTo, K::NotSimilarTo, "similar", NullPolicy::Strict);
        self.method_with_negation(
            K::PosixRegexCaseSensitive,
            K::NegatedPosixRegexCaseSensitive,
            "posixRegexCaseSensitive",
            NullPolicy::Strict,
        );
        self.method_with_negation(
            K::PosixRegexCaseInsensitive,
            K::NegatedPosixRegexCaseInsensitive,
            "posixRegexCaseInsensitive",
            NullPolicy::Strict,
        );
        self.bind(
            K::RegexpReplace,
            ArityImplementor::new(
                "regexp_replace",
                NullPolicy::Strict,
                3,
                &["regexpReplace", "regexpReplace", "regexpReplace", "regexpReplace"],
            ),
        );
    }

    fn register_collections(&mut self) {
        use OperatorKind as K;
        let strict = [
            (K::Cardinality, "cardinality"),
            (K::Slice, "slice"),
            (K::Element, "element"),
            (K::MemberOf, "memberOf"),
            (K::MultisetIntersectDistinct, "multisetIntersectDistinct"),
            (K::MultisetIntersect, "multisetIntersectAll"),
            (K::MultisetExceptDistinct, "multisetExceptDistinct"),
            (K::MultisetExcept, "multisetExceptAll"),
            (K::MultisetUnionDistinct, "multisetUnionDistinct"),
            (K::MultisetUnion, "multisetUnionAll"),
        ];
        for (kind, routine) in strict {
            self.method(kind, routine, NullPolicy::Strict);
        }
        self.method(K::StructAccess, "structAccess", NullPolicy::Any);
        self.method_with_negation(K::IsEmpty, K::IsNotEmpty, "isEmpty", NullPolicy::Strict);
        self.method_with_negation(K::IsASet, K::IsNotASet, "isASet", NullPolicy::Strict);
        self.method_with_negation(K::SubmultisetOf, K::NotSubmultisetOf, "submultisetOf", NullPolicy::Strict);
        self.bind(K::ArrayValueConstructor, ValueConstructorImplementor);
        self.bind(K::MapValueConstructor, ValueConstructorImplementor);
        self.bind(K::Item, ItemImplementor);
        self.method(K::Row, "array", NullPolicy::None);
    }

    fn register_misc(&mut self) {
        use OperatorKind as K;
        self.bind(K::Coalesce, CoalesceImplementor);
        self.bind(K::Cast, CastImplementor);
        self.bind(K::Reinterpret, ReinterpretImplementor);
        self.bind(K::Default, DefaultImplementor);
        self.bind(K::CurrentValue, SequenceImplementor::current_value());
        self.bind(K::NextValue, SequenceImplementor::next_value());
        let arg0 = [
            (K::Compress, "compress"),
            (K::ExtractValue, "extractValue"),
            (K::XmlTransform, "xmlTransform"),
            (K::ExtractXml, "extractXml"),
            (K::ExistsNode, "existsNode"),
        ];
        for (kind, routine) in arg0 {
            self.method(kind, routine, NullPolicy::Arg0);
        }
    }

    fn register_json(&mut self) {
        use OperatorKind as K;
        self.method(K::JsonValueExpression, "jsonValueExpression", NullPolicy::Strict);
        self.bind(K::JsonValue, JsonValueImplementor);
        let arg0 = [
            (K::JsonExists, "jsonExists"),
            (K::JsonQuery, "jsonQuery"),
            (K::JsonType, "jsonType"),
            (K::JsonDepth, "jsonDepth"),
            (K::JsonKeys, "jsonKeys"),
            (K::JsonPretty, "jsonPretty"),
            (K::JsonLength, "jsonLength"),
            (K::JsonRemove, "jsonRemove"),
            (K::JsonStorageSize, "jsonStorageSize"),
        ];
        for (kind, routine) in arg0 {
            self.method(kind, routine, NullPolicy::Arg0);
        }
        self.method(K::JsonObject, "jsonObject", NullPolicy::None);
        self.method(K::JsonArray, "jsonArray", NullPolicy::None);
        self.method_with_negation(K::IsJsonValue, K::IsNotJsonValue, "isJsonValue", NullPolicy::None);
        self.method_with_negation(K::IsJsonObject, K::IsNotJsonObject, "isJsonObject", NullPolicy::None);
        self.method_with_negation(K::IsJsonArray, K::IsNotJsonArray, "isJsonArray", NullPolicy::None);
        self.method_with_negation(K::IsJsonScalar, K::IsNotJsonScalar, "isJsonScalar", NullPolicy::None);
    }

    fn register_system(&mut self) {
        use OperatorKind as K;
        for kind in [
            K::User,
            K::CurrentUser,
            K::SessionUser,
            K::SystemUser,
            K::CurrentPath,
            K::CurrentRole,
            K::CurrentCatalog,
            K::CurrentTime,
            K::CurrentTimestamp,
            K::CurrentDate,
            K::LocalTime,
            K::LocalTimestamp,
        ] {
            self.bind(kind, SystemFunctionImplementor);
        }
    }

    fn register_aggregates(&mut self) {
        use AggKind as A;
        let plain: [(AggKind, AggFactory); 19] = [
            (A::Count, |_| Box::new(Strict(CountImplementor))),
            (A::RegrCount, |_| Box::new(Strict(CountImplementor))),
            (A::Sum, |_| Box::new(Strict(SumImplementor))),
            (A::Sum0, |_| Box::new(Strict(SumImplementor))),
            (A::Min, |k| Box::new(Strict(MinMaxImplementor::new(k)))),
            (A::Max, |k| Box::new(Strict(MinMaxImplementor::new(k)))),
            (A::AnyValue, |k| Box::new(Strict(MinMaxImplementor::new(k)))),
            (A::Some, |k| Box::new(Strict(MinMaxImplementor::new(k)))),
            (A::Every, |k| Box::new(Strict(MinMaxImplementor::new(k)))),
            (A::BitAnd, |k| Box::new(Strict(BitOpImplementor::new(k)))),
            (A::BitOr, |k| Box::new(Strict(BitOpImplementor::new(k)))),
            (A::BitXor, |k| Box::new(Strict(BitOpImplementor::new(k)))),
            (A::SingleValue, |_| Box::new(SingleValueImplementor)),
            (A::Collect, |_| Box::new(Strict(CollectImplementor::collect()))),
            (A::ListAgg, |_| Box::new(Strict(ListAggImplementor))),
            (A::Fusion, |_| Box::new(Strict(CollectImplementor::fusion()))),
            (A::Intersection, |_| Box::new(Strict(IntersectionImplementor))),
            (A::Grouping, |_| Box::new(GroupingImplementor)),
            (A::GroupingId, |_| Box::new(GroupingImplementor)),
        ];
        self.aggregates.extend(plain);
        for clause in [JsonNullClause::AbsentOnNull, JsonNullClause::NullOnNull] {
            self.aggregates.insert(A::JsonObjectAgg(clause), |k| match k {
                AggKind::JsonObjectAgg(c) => Box::new(JsonAggImplementor::object(c)),
                _ => Box::new(JsonAggImplementor::object(JsonNullClause::NullOnNull)),
            });
            self.aggregates.insert(A::JsonArrayAgg(clause), |k| match k {
                AggKind::JsonArrayAgg(c) => Box::new(JsonAggImplementor::array(c)),
                _ => Box::new(JsonAggImplementor::array(JsonNullClause::NullOnNull)),
            });
        }

        let windowed: [(AggKind, AggFactory); 4] = [
            (A::Rank, |_| Box::new(Strict(RankImplementor::rank()))),
            (A::DenseRank, |_| Box::new(Strict(RankImplementor::dense_rank()))),
            (A::RowNumber, |_| Box::new(Strict(RowNumberImplementor))),
            (A::Count, |_| Box::new(CountWinImplementor::new())),
        ];
        self.win_aggregates.extend(windowed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggBundle, AggContext, RoutineAggImplementor};
    use crate::implement::_tests::fixtures::*;
    use crate::rex::{
        AggregateFunction, Function, ImplementableAggFunction, ImplementableFunction, RexNode, UserDefinedAggFunction,
        UserDefinedFunction,
    };
    use crate::runtime::Value;
    use crate::translator::{Translator, WindowReuse};
    use crate::types::{RelType, SqlTypeName};

    struct Opaque;

    impl Function for Opaque {
        fn name(&self) -> &str {
            "opaque"
        }
    }

    struct Twice;

    impl Function for Twice {
        fn name(&self) -> &str {
            "twice"
        }

        fn as_implementable(&self) -> Option<&dyn ImplementableFunction> {
            Some(self)
        }
    }

    impl ImplementableFunction for Twice {
        fn implementor(&self) -> Arc<dyn CallImplementor> {
            Arc::new(MethodImplementor::new("twice", NullPolicy::Strict))
        }
    }

    struct Product;

    impl AggregateFunction for Product {
        fn name(&self) -> &str {
            "product"
        }

        fn as_implementable(&self) -> Option<&dyn ImplementableAggFunction> {
            Some(self)
        }
    }

    impl ImplementableAggFunction for Product {
        fn implementor(&self, _for_window: bool) -> Box<dyn AggImplementor> {
            Box::new(Strict(RoutineAggImplementor::new("productInit", "productAdd", "productResult")))
        }
    }

    #[test]
    fn every_operator_is_bound() {
        let table = ImpTable::new();
        use OperatorKind as K;
        for kind in [K::Upper, K::Trim, K::And, K::Plus, K::Extract, K::IsNull, K::NotLike, K::Item, K::JsonValue, K::CurrentDate, K::Row] {
            assert!(table.get(&SqlOperator::Builtin(kind)).unwrap().is_some(), "{kind} unbound");
        }
        assert!(table.operators().len() > 150);
    }

    enum Operand {
        Input(SqlTypeName, Value),
        Fixed(RexNode),
    }

    fn nullable(name: SqlTypeName) -> RelType {
        RelType::nullable(name)
    }

    #[test]
    fn strict_bindings_are_null_when_any_operand_is() {
        use crate::rex::Symbol;
        use crate::types::TimeUnitRange;
        use Operand::*;
        use SqlTypeName as T;

        let unit = |r| Fixed(RexNode::symbol(Symbol::TimeUnit(r)));
        let cases: Vec<(OperatorKind, RelType, Vec<Operand>)> = vec![
            (OperatorKind::Plus, nullable(T::Integer), vec![Input(T::Integer, Value::Int(1)), Input(T::Integer, Value::Int(2))]),
            (OperatorKind::LessThan, nullable(T::Boolean), vec![Input(T::Integer, Value::Int(1)), Input(T::Integer, Value::Int(2))]),
            (OperatorKind::UnaryMinus, nullable(T::Integer), vec![Input(T::Integer, Value::Int(5))]),
            (OperatorKind::Mod, nullable(T::Integer), vec![Input(T::Integer, Value::Int(7)), Input(T::Integer, Value::Int(3))]),
            (OperatorKind::Upper, nullable(T::Varchar), vec![Input(T::Varchar, Value::str("abc"))]),
            (
                OperatorKind::Substring,
                nullable(T::Varchar),
                vec![Input(T::Varchar, Value::str("hello")), Input(T::Integer, Value::Int(2)), Input(T::Integer, Value::Int(3))],
            ),
            (OperatorKind::Cast, nullable(T::Varchar), vec![Input(T::Integer, Value::Int(12))]),
            (OperatorKind::Extract, nullable(T::BigInt), vec![unit(TimeUnitRange::Year), Input(T::Date, Value::Int(19797))]),
            (
                OperatorKind::Floor,
                nullable(T::Timestamp),
                vec![Input(T::Timestamp, Value::Int(FIXED_TIMESTAMP)), unit(TimeUnitRange::Hour)],
            ),
            (
                OperatorKind::DatetimePlus,
                nullable(T::Date),
                vec![Input(T::Date, Value::Int(19797)), Input(T::IntervalDay, Value::Int(86_400_000))],
            ),
            (
                OperatorKind::MinusDate,
                nullable(T::IntervalDay),
                vec![Input(T::Date, Value::Int(19797)), Input(T::Date, Value::Int(19795))],
            ),
            (
                OperatorKind::Item,
                nullable(T::Integer),
                vec![
                    Input(T::Array, Value::List(vec![Value::Int(10), Value::Int(20)])),
                    Input(T::Integer, Value::Int(1)),
                ],
            ),
        ];

        for (kind, ty, operands) in cases {
            let mut inputs: Vec<(String, RelType)> = Vec::new();
            let mut samples: Vec<Value> = Vec::new();
            let nodes: Vec<RexNode> = operands
                .into_iter()
                .map(|operand| match operand {
                    Input(name, sample) => {
                        let t = if name == T::Array { RelType::array(int_t()).with_nullability(true) } else { nullable(name) };
                        let node = input(inputs.len(), t.clone());
                        inputs.push((format!("x{}", inputs.len()), t));
                        samples.push(sample);
                        node
                    }
                    Fixed(node) => node,
                })
                .collect();
            let call = RexNode::call(kind, ty, nodes);
            let named: Vec<(&str, RelType)> = inputs.iter().map(|(n, t)| (n.as_str(), t.clone())).collect();
            let (block, result) = compile_with_inputs(&call, &named);

            let all: Vec<(&str, Value)> = named.iter().map(|(n, _)| *n).zip(samples.iter().cloned()).collect();
            assert!(!run_is_null(&block, &result, &all), "{kind} with no null operand");
            for forced in 0..all.len() {
                let mut bindings = all.clone();
                bindings[forced].1 = Value::Null;
                assert!(run_is_null(&block, &result, &bindings), "{kind} with operand {forced} null");
            }
        }
    }

    #[test]
    fn type_constructors_build_rows() {
        let table = ImpTable::new();
        let row = table.get(&SqlOperator::TypeConstructor("point".into())).unwrap().unwrap();
        assert_eq!(row.variable_name(), "method_call");

        let int = RelType::new(SqlTypeName::Integer);
        let call = RexNode::call(SqlOperator::TypeConstructor("point".into()), RelType::row(vec![int.clone(), int]), vec![lit_i(1), lit_i(2)]);
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn non_implementable_udf_is_a_configuration_error() {
        let table = ImpTable::new();
        let op = SqlOperator::UserDefined(UserDefinedFunction::new(Arc::new(Opaque)));
        assert!(matches!(table.get(&op), Err(ImpError::Configuration(_))));
    }

    #[test]
    fn implementable_udf_supplies_its_implementor() {
        let table = ImpTable::new();
        let op = SqlOperator::UserDefined(UserDefinedFunction::new(Arc::new(Twice)));
        let call = RexNode::call(op, int_t(), vec![lit_i(21)]);
        let mut tr = Translator::new(&table);
        let result = tr.translate(&call).unwrap();
        let block = tr.into_block();
        let mut it = interpreter();
        it.register_routine("twice", |args: &[Value]| Ok(Value::Int(args[0].as_i64().unwrap_or(0) * 2)));
        assert_eq!(it.evaluate(&block, &result).unwrap(), Value::Int(42));
    }

    #[test]
    fn routine_backed_udaf() {
        let table = ImpTable::new();
        let function = AggFunction::UserDefined(UserDefinedAggFunction::new(Arc::new(Product)));
        let ctx = AggContext::new(RelType::nullable(SqlTypeName::BigInt), vec![RelType::nullable(SqlTypeName::BigInt)]);
        let bundle = AggBundle::compile(&table, &function, &ctx, false).unwrap();

        let mut it = interpreter();
        it.register_routine("productInit", |_: &[Value]| Ok(Value::Int(1)));
        it.register_routine("productAdd", |args: &[Value]| {
            Ok(Value::Int(args[0].as_i64().unwrap_or(1) * args[1].as_i64().unwrap_or(1)))
        });
        it.register_routine("productResult", |args: &[Value]| Ok(args[0].clone()));
        it.run(&bundle.reset).unwrap();
        for v in [Value::Int(2), Value::Null, Value::Int(5)] {
            it.bind(&bundle.arguments[0].name, v);
            it.run(&bundle.add).unwrap();
        }
        it.run(&bundle.result).unwrap();
        assert_eq!(it.eval(&bundle.value).unwrap(), Value::Int(10));
    }

    #[test]
    fn window_lookup_prefers_window_strategies() {
        let table = ImpTable::new();
        let count = table.aggregate(&AggFunction::Builtin(AggKind::Count), true).unwrap();
        assert!(count.needs_window());
        let sum = table.aggregate(&AggFunction::Builtin(AggKind::Sum), true).unwrap();
        assert!(!sum.needs_window());
        assert!(table.aggregate(&AggFunction::Builtin(AggKind::RowNumber), false).is_err());
    }

    #[test]
    fn window_reuse_can_be_switched_off() {
        let strict = ImpTable::with_config(CompilerConfig { window_reuse: WindowReuse::Never, ..CompilerConfig::default() });
        assert!(matches!(
            strict.aggregate(&AggFunction::Builtin(AggKind::Sum), true),
            Err(ImpError::Configuration(_))
        ));
        // GROUPING is never reusable over a window
        let table = ImpTable::new();
        assert!(table.aggregate(&AggFunction::Builtin(AggKind::Grouping), true).is_err());
        assert!(table.aggregate(&AggFunction::Builtin(AggKind::Grouping), false).is_ok());
    }
}
