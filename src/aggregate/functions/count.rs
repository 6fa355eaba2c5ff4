use crate::aggregate::{AggAddContext, AggContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{BinaryOp, Expr};
use crate::types::{Primitive, Repr};

/// COUNT and REGR_COUNT: rows whose arguments are all non-null.
pub struct CountImplementor;

impl StrictAggImplementor for CountImplementor {
    fn not_null_state(&self, _ctx: &AggContext) -> Vec<Repr> {
        vec![Repr::Prim(Primitive::I64)]
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        add.block.assign(&acc, Expr::binary(BinaryOp::Add, acc.expr(), Expr::long(1)));
        Ok(())
    }
}
