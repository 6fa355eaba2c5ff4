use crate::aggregate::{AggAddContext, AggContext, AggResetContext, AggResultContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{BinaryOp, Expr, Statement};
use crate::types::{Primitive, Repr};

/// RANK and DENSE_RANK. The counter moves only when the current row's
/// ordering key differs from the previous row's; ties keep the rank.
pub struct RankImplementor {
    dense: bool,
}

impl RankImplementor {
    pub fn rank() -> Self {
        Self { dense: false }
    }

    pub fn dense_rank() -> Self {
        Self { dense: true }
    }
}

impl StrictAggImplementor for RankImplementor {
    fn not_null_state(&self, _ctx: &AggContext) -> Vec<Repr> {
        vec![Repr::Prim(Primitive::I64)]
    }

    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        let initial = if self.dense { 1 } else { 0 };
        reset.block.assign(&acc, Expr::long(initial));
        Ok(())
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let window = add.window()?;
        let position = window.index();
        let start = window.start_index();
        let previous = Expr::binary(BinaryOp::Subtract, position.clone(), Expr::long(1));
        let changed = Expr::binary(BinaryOp::LessThan, window.compare_rows(previous, position.clone()), Expr::int(0));
        let new_rank = if self.dense {
            Expr::binary(BinaryOp::Add, acc.expr(), Expr::long(1))
        } else {
            Expr::binary(BinaryOp::Subtract, position.clone(), start.clone())
        };
        let bump = Statement::if_then(changed, vec![Statement::Assign { target: acc, value: new_rank }]);
        add.block.add(Statement::if_then(Expr::binary(BinaryOp::GreaterThan, position, start), vec![bump]));
        Ok(())
    }

    fn implement_not_null_result(&self, _ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        let acc = result.acc(0)?.expr();
        Ok(if self.dense { acc } else { Expr::binary(BinaryOp::Add, acc, Expr::long(1)) })
    }

    fn needs_window(&self) -> bool {
        true
    }
}
