use crate::error::ImpError;
use crate::implement::{CallImplementor, NullPolicy};
use crate::linq::{BinaryOp, Expr};
use crate::rex::{OperatorKind, RexCall};
use crate::translator::Translator;
use crate::types::Repr;

/// IS [NOT] NULL / TRUE / FALSE. The else-value is a literal boolean, so
/// these never yield null themselves.
pub struct IsPredicateImplementor {
    kind: OperatorKind,
}

impl IsPredicateImplementor {
    pub fn new(kind: OperatorKind) -> Self {
        Self { kind }
    }

    /// Outcome when the operand is null.
    fn when_null(&self) -> bool {
        matches!(self.kind, OperatorKind::IsNull | OperatorKind::IsNotTrue | OperatorKind::IsNotFalse)
    }
}

impl CallImplementor for IsPredicateImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        match self.kind {
            OperatorKind::IsNull => "is_null",
            OperatorKind::IsNotNull => "is_not_null",
            OperatorKind::IsTrue => "is_true",
            OperatorKind::IsNotTrue => "is_not_true",
            OperatorKind::IsFalse => "is_false",
            _ => "is_not_false",
        }
    }

    fn else_value(&self, repr: Repr) -> Expr {
        Expr::convert(Expr::bool(self.when_null()), repr)
    }

    fn implement_safe(&self, _translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let operand = args
            .first()
            .cloned()
            .ok_or_else(|| ImpError::invalid_call(call.op.name(), "expected 1 operand"))?;
        Ok(match self.kind {
            OperatorKind::IsNull => Expr::is_null(operand),
            OperatorKind::IsNotNull => Expr::is_not_null(operand),
            OperatorKind::IsTrue => Expr::binary(BinaryOp::Equal, operand, Expr::bool(true)),
            OperatorKind::IsNotTrue => Expr::binary(BinaryOp::NotEqual, operand, Expr::bool(true)),
            OperatorKind::IsFalse => Expr::binary(BinaryOp::Equal, operand, Expr::bool(false)),
            OperatorKind::IsNotFalse => Expr::binary(BinaryOp::NotEqual, operand, Expr::bool(false)),
            other => return Err(ImpError::unsupported(format!("not a null test: {other}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implement::_tests::fixtures::*;
    use crate::rex::RexNode;
    use crate::runtime::Value;

    fn eval(kind: OperatorKind, v: Value) -> (Value, bool) {
        let t = nullable_bool_t();
        let call = RexNode::call(kind, bool_t(), vec![input(0, t.clone())]);
        let (block, result) = compile_with_inputs(&call, &[("a", t)]);
        let out = run(&block, &result, &[("a", v.clone())]);
        let null_flag = run_is_null(&block, &result, &[("a", v)]);
        (out, null_flag)
    }

    #[test]
    fn null_operand_never_yields_null() {
        for (kind, expected) in [
            (OperatorKind::IsNull, true),
            (OperatorKind::IsNotNull, false),
            (OperatorKind::IsTrue, false),
            (OperatorKind::IsNotTrue, true),
            (OperatorKind::IsFalse, false),
            (OperatorKind::IsNotFalse, true),
        ] {
            let (out, is_null) = eval(kind, Value::Null);
            assert_eq!(out, Value::Bool(expected), "{kind}");
            assert!(!is_null, "{kind}");
        }
    }

    #[test]
    fn non_null_operand_is_tested() {
        assert_eq!(eval(OperatorKind::IsNull, Value::Bool(true)).0, Value::Bool(false));
        assert_eq!(eval(OperatorKind::IsTrue, Value::Bool(true)).0, Value::Bool(true));
        assert_eq!(eval(OperatorKind::IsNotTrue, Value::Bool(false)).0, Value::Bool(true));
        assert_eq!(eval(OperatorKind::IsFalse, Value::Bool(false)).0, Value::Bool(true));
        assert_eq!(eval(OperatorKind::IsNotFalse, Value::Bool(false)).0, Value::Bool(false));
    }

    #[test]
    fn is_null_on_a_nullable_integer() {
        let t = crate::types::RelType::nullable(crate::types::SqlTypeName::Integer);
        let call = RexNode::call(OperatorKind::IsNull, bool_t(), vec![input(0, t.clone())]);
        let (block, result) = compile_with_inputs(&call, &[("x", t)]);
        assert_eq!(result.is_null, Expr::bool(false));
        assert_eq!(run(&block, &result, &[("x", Value::Null)]), Value::Bool(true));
        assert_eq!(run(&block, &result, &[("x", Value::Int(4))]), Value::Bool(false));
    }
}
