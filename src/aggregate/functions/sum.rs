use bigdecimal::BigDecimal;

use crate::aggregate::{AggAddContext, AggContext, AggResetContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{BinaryOp, Expr};
use crate::runtime::Value;
use crate::types::Repr;

/// SUM and SUM0. They differ only in the declared return type: SUM is
/// nullable and yields null for an empty group, SUM0 yields zero.
pub struct SumImplementor;

impl StrictAggImplementor for SumImplementor {
    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        let zero = match acc.repr {
            Repr::Decimal => Expr::constant(Value::Decimal(BigDecimal::from(0)), Repr::Decimal),
            repr => Expr::default_of(&repr),
        };
        reset.block.assign(&acc, zero);
        Ok(())
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let arg = Expr::convert(add.arg(0)?.value.clone(), acc.repr);
        let next = Expr::convert(Expr::binary(BinaryOp::Add, acc.expr(), arg), acc.repr);
        add.block.assign(&acc, next);
        Ok(())
    }
}
