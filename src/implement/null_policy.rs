use serde::{Deserialize, Serialize};

use crate::linq::Expr;

/// Which operand nulls force a call to short-circuit to its else-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullPolicy {
    /// Never short-circuits; the implementation sees nulls.
    None,
    /// Null if any operand is null.
    Strict,
    /// Null if any operand is null (operators that declare they can also
    /// return null on their own).
    Any,
    /// Null if the first operand is null.
    Arg0,
    /// Same condition as `Strict`; differs only in what gets unboxed.
    SemiStrict,
}

impl NullPolicy {
    /// The condition under which the call yields its else-value, built from
    /// the operands' null flags.
    pub fn classify(self, operand_is_null: &[Expr]) -> Expr {
        match self {
            NullPolicy::None => Expr::bool(false),
            NullPolicy::Arg0 => operand_is_null.first().cloned().unwrap_or_else(|| Expr::bool(false)),
            NullPolicy::Strict | NullPolicy::Any | NullPolicy::SemiStrict => {
                Expr::fold_or(operand_is_null.to_vec())
            }
        }
    }

    /// Unboxes the operands the policy guarantees to be non-null.
    pub fn unbox(self, operands: Vec<Expr>) -> Vec<Expr> {
        match self {
            NullPolicy::None => operands,
            NullPolicy::Arg0 => operands
                .into_iter()
                .enumerate()
                .map(|(i, e)| if i == 0 { Expr::unbox(e) } else { e })
                .collect(),
            NullPolicy::Strict | NullPolicy::Any | NullPolicy::SemiStrict => {
                operands.into_iter().map(Expr::unbox).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linq::{BinaryOp, Param};
    use crate::types::{Primitive, Repr};

    fn flag(name: &str) -> Expr {
        Param::new(name, Repr::Prim(Primitive::Bool)).expr()
    }

    #[test]
    fn none_never_short_circuits() {
        assert_eq!(NullPolicy::None.classify(&[flag("a"), flag("b")]), Expr::bool(false));
    }

    #[test]
    fn arg0_looks_at_the_first_flag_only() {
        assert_eq!(NullPolicy::Arg0.classify(&[flag("a"), flag("b")]), flag("a"));
        assert_eq!(NullPolicy::Arg0.classify(&[]), Expr::bool(false));
    }

    #[test]
    fn strict_family_shares_one_condition() {
        let flags = [flag("a"), Expr::bool(false), flag("b")];
        let expected = Expr::binary(BinaryOp::OrElse, flag("a"), flag("b"));
        assert_eq!(NullPolicy::Strict.classify(&flags), expected);
        assert_eq!(NullPolicy::SemiStrict.classify(&flags), expected);
        assert_eq!(NullPolicy::Any.classify(&flags), expected);
    }

    #[test]
    fn arg0_unboxes_only_the_first_operand() {
        let boxed = |n: &str| Param::new(n, Repr::Boxed(Primitive::I32)).expr();
        let out = NullPolicy::Arg0.unbox(vec![boxed("a"), boxed("b")]);
        assert_eq!(out[0].repr(), Repr::Prim(Primitive::I32));
        assert_eq!(out[1].repr(), Repr::Boxed(Primitive::I32));

        let out = NullPolicy::Strict.unbox(vec![boxed("a"), boxed("b")]);
        assert!(out.iter().all(|e| e.repr().is_primitive()));
    }
}
