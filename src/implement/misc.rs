use std::f64::consts::PI;

use crate::error::ImpError;
use crate::implement::{CallImplementor, NullPolicy};
use crate::linq::{Expr, Routine};
use crate::rex::{RexCall, Symbol};
use crate::runtime::Value;
use crate::translator::Translator;
use crate::types::{Primitive, Repr};

/// `TRIM(flag, seek, s)`. Unless extended trim is allowed, the seek string
/// must be a single character.
pub struct TrimImplementor;

impl CallImplementor for TrimImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        "trim"
    }

    fn implement_safe(&self, translator: &mut Translator, _call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let [flag, seek, s] = args else {
            return Err(ImpError::invalid_call("TRIM", "expected flag, seek and string"));
        };
        let Some(Symbol::Trim(flag)) = translator.literal_symbol(flag) else {
            return Err(ImpError::invalid_call("TRIM", "first operand must be a trim flag"));
        };
        let strict = !translator.config().allow_extended_trim;
        let operands = vec![
            Expr::bool(flag.leading()),
            Expr::bool(flag.trailing()),
            seek.clone(),
            s.clone(),
            Expr::bool(strict),
        ];
        Ok(Expr::call(Routine::named("trim"), operands, Repr::String))
    }
}

pub struct PiImplementor;

impl CallImplementor for PiImplementor {
    fn variable_name(&self) -> &str {
        "pi"
    }

    fn implement_safe(&self, _translator: &mut Translator, _call: &RexCall, _args: &[Expr]) -> Result<Expr, ImpError> {
        Ok(Expr::constant(Value::float(PI), Repr::Prim(Primitive::F64)))
    }
}

/// `DEFAULT` in an argument position: a null of the declared type.
pub struct DefaultImplementor;

impl CallImplementor for DefaultImplementor {
    fn variable_name(&self) -> &str {
        "default"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, _args: &[Expr]) -> Result<Expr, ImpError> {
        Ok(Expr::null(translator.repr_of(&call.ty)))
    }
}

/// CURRENT VALUE FOR / NEXT VALUE FOR a named sequence.
pub struct SequenceImplementor {
    routine: Routine,
}

impl SequenceImplementor {
    pub fn current_value() -> Self {
        Self { routine: Routine::named("sequenceCurrentValue") }
    }

    pub fn next_value() -> Self {
        Self { routine: Routine::named("sequenceNextValue") }
    }
}

impl CallImplementor for SequenceImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        "sequence"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let [name] = args else {
            return Err(ImpError::invalid_call(call.op.name(), "expected a sequence name"));
        };
        let operands = vec![translator.root(), name.clone()];
        Ok(Expr::call(self.routine.clone(), operands, Repr::Prim(Primitive::I64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implement::_tests::fixtures::*;
    use crate::registry::ImpTable;
    use crate::rex::{OperatorKind, RexNode, TrimFlag};
    use crate::translator::CompilerConfig;
    use crate::types::{RelType, SqlTypeName};

    fn trim_call(flag: TrimFlag, seek: &str, s: &str) -> RexNode {
        let vc = RelType::new(SqlTypeName::Varchar);
        RexNode::call(
            OperatorKind::Trim,
            vc.clone(),
            vec![RexNode::symbol(Symbol::Trim(flag)), RexNode::literal(seek, vc.clone()), RexNode::literal(s, vc)],
        )
    }

    #[test]
    fn trim_flags_pick_the_ends() {
        for (flag, expected) in [(TrimFlag::Both, "abc"), (TrimFlag::Leading, "abc  "), (TrimFlag::Trailing, "  abc")] {
            let (block, result) = compile(&trim_call(flag, " ", "  abc  "));
            assert_eq!(run(&block, &result, &[]), Value::str(expected));
        }
    }

    #[test]
    fn multi_character_seek_needs_extended_trim() {
        let call = trim_call(TrimFlag::Both, "xy", "xyabcyx");
        let (block, result) = compile(&call);
        assert!(try_run(&block, &result, &[]).is_err());

        let table = ImpTable::with_config(CompilerConfig::lenient());
        let (block, result) = compile_on(&table, &call);
        assert_eq!(run(&block, &result, &[]), Value::str("abc"));
    }

    #[test]
    fn pi_and_default() {
        let (block, result) = compile(&RexNode::call(OperatorKind::Pi, double_t(), vec![]));
        assert_eq!(run(&block, &result, &[]), Value::float(PI));

        let call = RexNode::call(OperatorKind::Default, RelType::nullable(SqlTypeName::Integer), vec![]);
        let (block, result) = compile(&call);
        assert!(run_is_null(&block, &result, &[]));
    }

    #[test]
    fn sequences_count_per_name() {
        let vc = RelType::new(SqlTypeName::Varchar);
        let next = RexNode::call(OperatorKind::NextValue, bigint_t(), vec![RexNode::literal("seq", vc.clone())]);
        let current = RexNode::call(OperatorKind::CurrentValue, bigint_t(), vec![RexNode::literal("seq", vc)]);
        let (next_block, next_result) = compile(&next);
        let (cur_block, cur_result) = compile(&current);

        let mut interpreter = interpreter();
        assert_eq!(interpreter.evaluate(&next_block, &next_result).unwrap(), Value::Int(1));
        assert_eq!(interpreter.evaluate(&next_block, &next_result).unwrap(), Value::Int(2));
        assert_eq!(interpreter.evaluate(&cur_block, &cur_result).unwrap(), Value::Int(2));
    }
}
