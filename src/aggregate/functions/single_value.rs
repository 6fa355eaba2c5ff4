use crate::aggregate::{AggAddContext, AggContext, AggImplementor, AggResetContext, AggResultContext};
use crate::error::{ImpError, RuntimeError};
use crate::linq::{Expr, Statement};
use crate::types::{Primitive, Repr};

/// SINGLE_VALUE: passes the only row through and fails at run time when a
/// second row arrives.
pub struct SingleValueImplementor;

impl AggImplementor for SingleValueImplementor {
    fn state_type(&self, ctx: &AggContext) -> Vec<Repr> {
        vec![Repr::Prim(Primitive::Bool), ctx.return_repr()]
    }

    fn implement_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let seen = reset.acc(0)?.clone();
        let value = reset.acc(1)?.clone();
        reset.block.assign(&seen, Expr::bool(false));
        reset.block.assign(&value, Expr::default_of(&value.repr));
        Ok(())
    }

    fn implement_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let seen = add.acc(0)?.clone();
        let value = add.acc(1)?.clone();
        let arg = Expr::convert(add.arg(0)?.value.clone(), value.repr);
        let violation = RuntimeError::CardinalityViolation("SINGLE_VALUE".to_string());
        add.block.add(Statement::if_then(seen.expr(), vec![Statement::Throw(violation)]));
        add.block.assign(&seen, Expr::bool(true));
        add.block.assign(&value, arg);
        Ok(())
    }

    fn implement_result(&self, ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        Ok(Expr::convert(result.acc(1)?.expr(), ctx.return_repr()))
    }
}
