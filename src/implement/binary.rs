use crate::error::ImpError;
use crate::implement::{CallImplementor, NullPolicy};
use crate::linq::{BinaryOp, Expr, Routine};
use crate::rex::RexCall;
use crate::translator::Translator;
use crate::types::{Primitive, Primitive::*, Repr, SqlTypeName};

/// Kinds native ordering comparisons are emitted for.
const COMPARABLE: [Primitive; 6] = [I8, I16, I32, I64, F32, F64];

/// Arithmetic and comparison operators, emitted natively on primitives and
/// through a backup routine otherwise.
pub struct BinaryImplementor {
    op: BinaryOp,
    policy: NullPolicy,
    harmonize: bool,
    backup: Option<Routine>,
}

impl BinaryImplementor {
    pub fn new(op: BinaryOp, policy: NullPolicy, harmonize: bool, backup: Option<&'static str>) -> Self {
        Self { op, policy, harmonize, backup: backup.map(Routine::named) }
    }

    fn backup_repr(&self, translator: &Translator, call: &RexCall) -> Repr {
        if self.op.is_comparison() {
            Repr::Prim(Bool)
        } else {
            translator.repr_of(&call.ty)
        }
    }
}

impl CallImplementor for BinaryImplementor {
    fn null_policy(&self) -> NullPolicy {
        self.policy
    }

    fn harmonize(&self) -> bool {
        self.harmonize
    }

    fn variable_name(&self) -> &str {
        "binary_call"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let [left, right] = args else {
            return Err(ImpError::invalid_call(call.op.name(), format!("expected 2 operands, got {}", args.len())));
        };
        if let Some(backup) = &self.backup {
            if call.operands.iter().any(|o| o.ty().name == SqlTypeName::Any) {
                let repr = if self.op.is_comparison() { Repr::Prim(Bool) } else { Repr::Object };
                let boxed = vec![Expr::box_(left.clone()), Expr::box_(right.clone())];
                return Ok(Expr::call(backup.any_variant(), boxed, repr));
            }

            let (l, r) = (left.repr(), right.repr());
            let primitive = l.primitive();
            let unsupported_comparison =
                self.op.is_ordering() && !primitive.is_some_and(|p| COMPARABLE.contains(&p));
            let boxed_equality =
                self.op.is_equality() && l.boxed_primitive().is_some() && r.boxed_primitive().is_some();
            if primitive.is_none() || r == Repr::Decimal || unsupported_comparison || boxed_equality {
                let repr = self.backup_repr(translator, call);
                return Ok(Expr::call(backup.clone(), args.to_vec(), repr));
            }
        }
        Ok(Expr::binary(self.op, left.clone(), right.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implement::_tests::fixtures::*;
    use crate::rex::{OperatorKind, RexNode};
    use crate::runtime::Value;
    use crate::types::RelType;

    #[test]
    fn int_comparison_is_native() {
        let call = call2(OperatorKind::LessThan, bool_t(), lit_i(1), lit_i(2));
        let (block, result) = compile(&call);
        let mut saw_binary = false;
        walk_all(&block, &result, &mut |e| {
            if matches!(e, Expr::Binary { op: BinaryOp::LessThan, .. }) {
                saw_binary = true;
            }
        });
        assert!(saw_binary);
        assert_eq!(run(&block, &result, &[]), Value::Bool(true));
    }

    #[test]
    fn decimal_comparison_uses_backup() {
        let dec = RelType::new(SqlTypeName::Decimal);
        let call = call2(
            OperatorKind::LessThan,
            bool_t(),
            RexNode::literal(dec_v("1.5"), dec.clone()),
            RexNode::literal(dec_v("2.5"), dec),
        );
        let (block, result) = compile(&call);
        assert!(calls_routine(&block, &result, "lt"));
        assert_eq!(run(&block, &result, &[]), Value::Bool(true));
    }

    #[test]
    fn strict_nullable_equality_unboxes_to_native() {
        let t = RelType::nullable(SqlTypeName::Integer);
        let call = call2(OperatorKind::Equals, RelType::nullable(SqlTypeName::Boolean), input(0, t.clone()), input(1, t.clone()));
        let (block, result) = compile_with_inputs(&call, &[("a", t.clone()), ("b", t)]);
        // strict unboxing leaves primitives, so the native path is taken
        assert!(!calls_routine(&block, &result, "eq"));
        assert_eq!(run(&block, &result, &[("a", Value::Int(3)), ("b", Value::Int(3))]), Value::Bool(true));
        assert_eq!(run(&block, &result, &[("a", Value::Null), ("b", Value::Int(3))]), Value::Null);
    }

    #[test]
    fn boxed_equality_never_uses_native_equals() {
        let t = RelType::nullable(SqlTypeName::Integer);
        let mut tr = translator();
        tr.add_input("a", &t);
        tr.add_input("b", &t);
        let RexNode::Call(call) = call2(OperatorKind::Equals, nullable_bool_t(), input(0, t.clone()), input(1, t)) else {
            unreachable!()
        };
        let args = tr.translate_list(&call.operands).unwrap();
        assert_eq!(args[0].value.repr(), Repr::Boxed(I32));
        let eq = BinaryImplementor::new(BinaryOp::Equal, NullPolicy::None, false, Some("eq"));
        let result = eq.implement(&mut tr, &call, &args).unwrap();
        let block = tr.into_block();
        assert!(calls_routine(&block, &result, "eq"));
        let mut native = false;
        walk_all(&block, &result, &mut |e| native |= matches!(e, Expr::Binary { op: BinaryOp::Equal, .. }));
        assert!(!native);
        assert_eq!(run(&block, &result, &[("a", Value::Int(3)), ("b", Value::Int(3))]), Value::Bool(true));
        assert_eq!(run(&block, &result, &[("a", Value::Int(3)), ("b", Value::Int(4))]), Value::Bool(false));
    }

    #[test]
    fn any_operand_routes_to_any_variant() {
        let any = RelType::nullable(SqlTypeName::Any);
        let call = call2(OperatorKind::Plus, any.clone(), input(0, any.clone()), lit_i(1));
        let (block, result) = compile_with_inputs(&call, &[("a", any)]);
        assert!(calls_routine(&block, &result, "plusAny"));
        assert_eq!(run(&block, &result, &[("a", Value::Int(41))]), Value::Int(42));
    }

    #[test]
    fn string_comparison_uses_backup() {
        let s = RelType::new(SqlTypeName::Varchar);
        let call = call2(
            OperatorKind::GreaterThan,
            bool_t(),
            RexNode::literal("b", s.clone()),
            RexNode::literal("a", s),
        );
        let (block, result) = compile(&call);
        assert!(calls_routine(&block, &result, "gt"));
        assert_eq!(run(&block, &result, &[]), Value::Bool(true));
    }

    #[test]
    fn mixed_widths_are_harmonized() {
        let call = call2(
            OperatorKind::Plus,
            RelType::new(SqlTypeName::BigInt),
            lit_i(2),
            RexNode::literal(Value::Int(40), RelType::new(SqlTypeName::BigInt)),
        );
        let (block, result) = compile(&call);
        assert_eq!(result.value.repr(), Repr::Prim(I64));
        assert_eq!(run(&block, &result, &[]), Value::Int(42));
    }
}
