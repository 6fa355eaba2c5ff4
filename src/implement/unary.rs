use crate::error::ImpError;
use crate::implement::{CallImplementor, NullPolicy};
use crate::linq::{Expr, UnaryOp};
use crate::rex::RexCall;
use crate::translator::Translator;

/// Unary arithmetic. The result keeps the operand's width even where the
/// native operator widens.
pub struct UnaryImplementor {
    op: UnaryOp,
    policy: NullPolicy,
}

impl UnaryImplementor {
    pub fn new(op: UnaryOp, policy: NullPolicy) -> Self {
        Self { op, policy }
    }
}

impl CallImplementor for UnaryImplementor {
    fn null_policy(&self) -> NullPolicy {
        self.policy
    }

    fn variable_name(&self) -> &str {
        "unary_call"
    }

    fn implement_safe(&self, _translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let operand = args
            .first()
            .cloned()
            .ok_or_else(|| ImpError::invalid_call(call.op.name(), "expected 1 operand"))?;
        let repr = operand.repr();
        let e = Expr::unary(self.op, operand);
        if e.repr() == repr { Ok(e) } else { Ok(Expr::convert(e, repr)) }
    }
}
