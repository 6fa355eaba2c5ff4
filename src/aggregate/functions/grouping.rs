use crate::aggregate::{AggAddContext, AggContext, AggImplementor, AggResetContext, AggResultContext};
use crate::error::ImpError;
use crate::linq::{BinaryOp, Expr};
use crate::runtime::Value;
use crate::types::Repr;

/// GROUPING and GROUPING_ID. Nothing happens per row; the bit mask is read
/// from the rolled-up indicators of the group key.
pub struct GroupingImplementor;

impl AggImplementor for GroupingImplementor {
    fn state_type(&self, _ctx: &AggContext) -> Vec<Repr> {
        Vec::new()
    }

    fn implement_reset(&self, _ctx: &AggContext, _reset: &mut AggResetContext) -> Result<(), ImpError> {
        Ok(())
    }

    fn implement_add(&self, _ctx: &AggContext, _add: &mut AggAddContext) -> Result<(), ImpError> {
        Ok(())
    }

    fn implement_result(&self, ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        let repr = ctx.return_repr();
        if ctx.group_set_count <= 1 || ctx.call_args.is_empty() {
            return Ok(Expr::convert(Expr::long(0), repr));
        }
        let key_count = ctx.key_ordinals.len();
        let mut bit = u32::try_from(ctx.call_args.len() - 1)
            .ok()
            .and_then(|shift| 1i64.checked_shl(shift))
            .filter(|b| *b > 0)
            .ok_or_else(|| {
                ImpError::invalid_call("GROUPING", format!("at most 63 arguments, got {}", ctx.call_args.len()))
            })?;
        let mut mask: Option<Expr> = None;
        for arg in &ctx.call_args {
            let position = ctx
                .key_ordinals
                .iter()
                .position(|k| k == arg)
                .ok_or_else(|| ImpError::invalid_call("GROUPING", format!("{arg} is not a group key")))?;
            let indicator = result
                .keys
                .get(key_count + position)
                .cloned()
                .ok_or_else(|| ImpError::invalid_call("GROUPING", format!("no indicator for key {arg}")))?;
            let term = Expr::condition(indicator, Expr::long(bit), Expr::long(0));
            mask = Some(match mask {
                Some(m) => Expr::binary(BinaryOp::Add, m, term),
                None => term,
            });
            bit >>= 1;
        }
        let mask = mask.unwrap_or_else(|| Expr::constant(Value::Int(0), repr));
        Ok(Expr::convert(mask, repr))
    }
}
