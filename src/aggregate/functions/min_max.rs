use crate::aggregate::{AggAddContext, AggContext, AggResetContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{Expr, Routine};
use crate::rex::AggKind;

/// MIN, MAX, ANY_VALUE, SOME and EVERY.
///
/// Primitive slots start from the far end of their range so the first row
/// always wins; other slots start null and the `lesser` / `greater`
/// routines treat null as "no value yet".
pub struct MinMaxImplementor {
    is_min: bool,
}

impl MinMaxImplementor {
    pub fn new(kind: AggKind) -> Self {
        Self { is_min: matches!(kind, AggKind::Min | AggKind::Every) }
    }
}

impl StrictAggImplementor for MinMaxImplementor {
    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        let initial = match acc.repr.primitive() {
            Some(p) if acc.repr.is_primitive() => {
                let bound = if self.is_min { p.max_value() } else { p.min_value() };
                Expr::constant(bound, acc.repr)
            }
            _ => Expr::null(acc.repr),
        };
        reset.block.assign(&acc, initial);
        Ok(())
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let arg = Expr::convert(add.arg(0)?.value.clone(), acc.repr);
        let routine = Routine::named(if self.is_min { "lesser" } else { "greater" });
        add.block.assign(&acc, Expr::call(routine, vec![acc.expr(), arg], acc.repr));
        Ok(())
    }
}
