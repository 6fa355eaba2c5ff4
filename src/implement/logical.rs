use crate::error::ImpError;
use crate::implement::{CallImplementor, ExprResult, NullPolicy};
use crate::linq::{Expr, Routine};
use crate::rex::RexCall;
use crate::translator::Translator;
use crate::types::{Primitive, Repr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// Three-valued AND / OR. Bypasses the null policy entirely.
///
/// AND is false if any operand is false, else null if any is null, else
/// true; OR is the dual.
pub struct LogicalImplementor {
    connective: Connective,
}

impl LogicalImplementor {
    pub fn new(connective: Connective) -> Self {
        Self { connective }
    }
}

impl CallImplementor for LogicalImplementor {
    fn variable_name(&self) -> &str {
        match self.connective {
            Connective::And => "logical_and",
            Connective::Or => "logical_or",
        }
    }

    fn implement_safe(&self, _translator: &mut Translator, call: &RexCall, _args: &[Expr]) -> Result<Expr, ImpError> {
        Err(ImpError::unsupported(format!("{} is implemented as a whole", call.op.name())))
    }

    fn implement(&self, translator: &mut Translator, call: &RexCall, args: &[ExprResult]) -> Result<ExprResult, ImpError> {
        let boxed = Repr::Boxed(Primitive::Bool);
        // the value a null operand stands in for while looking for the deciding value
        let neutral = self.connective == Connective::And;
        let deciding = !neutral;

        let substituted: Vec<Expr> = args
            .iter()
            .map(|a| Expr::condition(a.is_null.clone(), Expr::bool(neutral), Expr::unbox(a.value.clone())))
            .collect();
        let decided = match self.connective {
            Connective::And => Expr::not(Expr::fold_and(substituted)),
            Connective::Or => Expr::fold_or(substituted),
        };
        let has_null = Expr::fold_or(args.iter().map(|a| a.is_null.clone()).collect());

        let value = Expr::condition(
            decided,
            Expr::constant(deciding, boxed),
            Expr::condition(has_null, Expr::null(boxed), Expr::constant(neutral, boxed)),
        );
        let value = if call.ty.nullable { value } else { Expr::unbox(value) };

        let name = self.variable_name();
        let value = translator.block_mut().append(&format!("{name}_value"), value);
        let is_null = translator.check_null(&value);
        let is_null = translator.block_mut().append(&format!("{name}_isNull"), is_null);
        Ok(ExprResult::new(is_null, value))
    }
}

/// NOT through the null-aware `not` routine.
pub struct LogicalNotImplementor;

impl CallImplementor for LogicalNotImplementor {
    fn harmonize(&self) -> bool {
        true
    }

    fn variable_name(&self) -> &str {
        "logical_not"
    }

    fn implement_safe(&self, _translator: &mut Translator, _call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        Ok(Expr::call(Routine::named("not"), args.to_vec(), Repr::Boxed(Primitive::Bool)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implement::_tests::fixtures::*;
    use crate::rex::{OperatorKind, RexNode};
    use crate::runtime::Value;

    fn three(v: Option<bool>) -> Value {
        v.map(Value::Bool).unwrap_or(Value::Null)
    }

    fn eval(kind: OperatorKind, a: Option<bool>, b: Option<bool>) -> Value {
        let t = nullable_bool_t();
        let call = RexNode::call(kind, t.clone(), vec![input(0, t.clone()), input(1, t.clone())]);
        let (block, result) = compile_with_inputs(&call, &[("a", t.clone()), ("b", t)]);
        run(&block, &result, &[("a", three(a)), ("b", three(b))])
    }

    // ---- AND ----

    #[test]
    fn and_truth_table() {
        assert_eq!(eval(OperatorKind::And, Some(false), None), Value::Bool(false));
        assert_eq!(eval(OperatorKind::And, None, Some(false)), Value::Bool(false));
        assert_eq!(eval(OperatorKind::And, Some(true), None), Value::Null);
        assert_eq!(eval(OperatorKind::And, Some(true), Some(true)), Value::Bool(true));
        assert_eq!(eval(OperatorKind::And, None, None), Value::Null);
    }

    // ---- OR ----

    #[test]
    fn or_truth_table() {
        assert_eq!(eval(OperatorKind::Or, Some(true), None), Value::Bool(true));
        assert_eq!(eval(OperatorKind::Or, None, Some(true)), Value::Bool(true));
        assert_eq!(eval(OperatorKind::Or, Some(false), None), Value::Null);
        assert_eq!(eval(OperatorKind::Or, Some(false), Some(false)), Value::Bool(false));
    }

    // ---- NOT ----

    #[test]
    fn not_keeps_null() {
        let t = nullable_bool_t();
        let call = RexNode::call(OperatorKind::Not, t.clone(), vec![input(0, t.clone())]);
        let (block, result) = compile_with_inputs(&call, &[("a", t)]);
        assert!(calls_routine(&block, &result, "not"));
        assert_eq!(run(&block, &result, &[("a", Value::Null)]), Value::Null);
        assert_eq!(run(&block, &result, &[("a", Value::Bool(true))]), Value::Bool(false));
    }

    #[test]
    fn and_over_non_null_operands_is_unboxed() {
        let call = RexNode::call(OperatorKind::And, bool_t(), vec![lit_b(true), lit_b(false)]);
        let (block, result) = compile(&call);
        assert_eq!(result.is_null, Expr::bool(false));
        assert_eq!(run(&block, &result, &[]), Value::Bool(false));
    }
}
