use crate::aggregate::{AggAddContext, AggContext, AggResultContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{BinaryOp, Expr};
use crate::types::Repr;

/// ROW_NUMBER: position within the frame, starting at 1. Keeps no state.
pub struct RowNumberImplementor;

impl StrictAggImplementor for RowNumberImplementor {
    fn not_null_state(&self, _ctx: &AggContext) -> Vec<Repr> {
        Vec::new()
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, _add: &mut AggAddContext) -> Result<(), ImpError> {
        Ok(())
    }

    fn implement_not_null_result(&self, _ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        let window = result.window()?;
        let offset = Expr::binary(BinaryOp::Subtract, window.index(), window.start_index());
        Ok(Expr::binary(BinaryOp::Add, offset, Expr::long(1)))
    }

    fn needs_window(&self) -> bool {
        true
    }
}
