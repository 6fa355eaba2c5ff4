use crate::error::ImpError;
use crate::implement::CallImplementor;
use crate::linq::Expr;
use crate::rex::RexCall;
use crate::translator::Translator;
use crate::types::Repr;

/// `COALESCE(a, rest...)` as `a != null ? a : COALESCE(rest...)`; the last
/// operand is taken as is.
pub struct CoalesceImplementor;

impl CoalesceImplementor {
    fn fold(translator: &Translator, args: &[Expr]) -> Expr {
        match args {
            [last] => last.clone(),
            [first, rest @ ..] => Expr::condition(
                translator.check_not_null(first),
                first.clone(),
                Self::fold(translator, rest),
            ),
            [] => Expr::null(Repr::Object),
        }
    }
}

impl CallImplementor for CoalesceImplementor {
    fn variable_name(&self) -> &str {
        "coalesce"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        if args.is_empty() {
            return Err(ImpError::invalid_call(call.op.name(), "needs at least one operand"));
        }
        Ok(Self::fold(translator, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implement::_tests::fixtures::*;
    use crate::linq::UnaryOp;
    use crate::rex::{OperatorKind, RexNode};
    use crate::runtime::Value;
    use crate::types::{RelType, SqlTypeName};

    #[test]
    fn first_non_null_wins() {
        let n = RelType::nullable(SqlTypeName::Integer);
        let call = RexNode::call(
            OperatorKind::Coalesce,
            int_t(),
            vec![RexNode::null_literal(n.clone()), RexNode::null_literal(n), lit_i(5)],
        );
        let (block, result) = compile(&call);
        assert_eq!(run(&block, &result, &[]), Value::Int(5));
    }

    #[test]
    fn single_operand_emits_no_null_check() {
        let call = RexNode::call(OperatorKind::Coalesce, int_t(), vec![lit_i(7)]);
        let (block, result) = compile(&call);
        let mut checks = 0;
        walk_all(&block, &result, &mut |e| {
            if matches!(e, Expr::Unary { op: UnaryOp::IsNull | UnaryOp::IsNotNull, .. }) {
                checks += 1;
            }
        });
        assert_eq!(checks, 0);
        assert_eq!(run(&block, &result, &[]), Value::Int(7));
    }

    #[test]
    fn inputs_are_checked_in_order() {
        let n = RelType::nullable(SqlTypeName::Integer);
        let call = RexNode::call(OperatorKind::Coalesce, n.clone(), vec![input(0, n.clone()), input(1, n.clone())]);
        let (block, result) = compile_with_inputs(&call, &[("a", n.clone()), ("b", n)]);
        assert_eq!(run(&block, &result, &[("a", Value::Int(1)), ("b", Value::Int(2))]), Value::Int(1));
        assert_eq!(run(&block, &result, &[("a", Value::Null), ("b", Value::Int(2))]), Value::Int(2));
        assert_eq!(run(&block, &result, &[("a", Value::Null), ("b", Value::Null)]), Value::Null);
    }
}
