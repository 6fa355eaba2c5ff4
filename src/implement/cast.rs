use crate::error::ImpError;
use crate::implement::{implement_with_policy, CallImplementor, ExprResult, NullPolicy};
use crate::linq::Expr;
use crate::rex::{RexCall, RexNode};
use crate::translator::Translator;

/// CAST (and the DATE function, which is a cast).
pub struct CastImplementor;

impl CallImplementor for CastImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        "cast"
    }

    fn implement(&self, translator: &mut Translator, call: &RexCall, args: &[ExprResult]) -> Result<ExprResult, ImpError> {
        // casting to the operand's own type changes nothing
        if let ([operand], [arg]) = (call.operands.as_slice(), args) {
            if *operand.ty() == call.ty {
                return Ok(arg.clone());
            }
        }
        implement_with_policy(self, translator, call, args)
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let (Some(operand), Some(arg)) = (call.operands.first(), args.first()) else {
            return Err(ImpError::invalid_call("CAST", "expected 1 operand"));
        };
        let source = operand.ty();
        if *source == call.ty {
            return Ok(arg.clone());
        }
        if call.ty.equal_sans_nullability(source) {
            if let RexNode::Literal(lit) = translator.deref(operand) {
                return Ok(translator.translate_literal_value(&lit.value, &call.ty));
            }
        }
        let target = call.ty.with_nullability(false);
        Ok(translator.translate_cast(source, &target, arg.clone()))
    }
}

/// REINTERPRET: same bits, new type.
pub struct ReinterpretImplementor;

impl CallImplementor for ReinterpretImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        "reinterpret"
    }

    fn implement_safe(&self, _translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        args.first().cloned().ok_or_else(|| ImpError::invalid_call(call.op.name(), "expected 1 operand"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implement::_tests::fixtures::*;
    use crate::rex::OperatorKind;
    use crate::runtime::Value;
    use crate::types::{RelType, SqlTypeName};

    #[test]
    fn cast_to_same_type_is_a_structural_no_op() {
        let t = RelType::nullable(SqlTypeName::Integer);
        let call = RexNode::call(OperatorKind::Cast, t.clone(), vec![input(0, t.clone())]);
        let mut tr = translator();
        tr.add_input("x", &t);
        let operand = tr.translate(&input(0, t)).unwrap();
        let before = tr.block().statements().len();
        let result = tr.translate(&call).unwrap();
        assert_eq!(result, operand);
        assert_eq!(tr.block().statements().len(), before);
    }

    #[test]
    fn cast_of_literal_differing_only_in_nullability_is_folded() {
        let call = RexNode::call(OperatorKind::Cast, RelType::nullable(SqlTypeName::Integer), vec![lit_i(42)]);
        let (block, result) = compile(&call);
        assert!(!calls_routine(&block, &result, "cast"));
        assert_eq!(run(&block, &result, &[]), Value::Int(42));
    }

    #[test]
    fn cast_between_numerics_is_a_conversion() {
        let call = RexNode::call(OperatorKind::Cast, RelType::new(SqlTypeName::Integer), vec![lit_f(3.9)]);
        let (block, result) = compile(&call);
        assert!(!calls_routine(&block, &result, "cast"));
        assert_eq!(run(&block, &result, &[]), Value::Int(3));
    }

    #[test]
    fn cast_string_to_integer_goes_through_runtime() {
        let s = RelType::nullable(SqlTypeName::Varchar);
        let call = RexNode::call(OperatorKind::Cast, RelType::nullable(SqlTypeName::Integer), vec![input(0, s.clone())]);
        let (block, result) = compile_with_inputs(&call, &[("s", s)]);
        assert!(calls_routine(&block, &result, "cast"));
        assert_eq!(run(&block, &result, &[("s", Value::str(" 12 "))]), Value::Int(12));
        assert_eq!(run(&block, &result, &[("s", Value::Null)]), Value::Null);
    }

    #[test]
    fn cast_date_to_string() {
        let call = RexNode::call(
            OperatorKind::Cast,
            RelType::new(SqlTypeName::Varchar),
            vec![RexNode::literal(Value::Int(19797), RelType::new(SqlTypeName::Date))],
        );
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::str("2024-03-15"));
    }
}
