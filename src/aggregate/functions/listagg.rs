use crate::aggregate::{AggAddContext, AggContext, AggResetContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{Expr, Routine};
use crate::types::Repr;

/// LISTAGG(value [, separator]). The separator goes in front of every
/// value but the first.
pub struct ListAggImplementor;

impl StrictAggImplementor for ListAggImplementor {
    fn not_null_state(&self, _ctx: &AggContext) -> Vec<Repr> {
        vec![Repr::String]
    }

    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        reset.block.assign(&acc, Expr::null(Repr::String));
        Ok(())
    }

    fn implement_not_null_add(&self, ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let value = Expr::convert(add.arg(0)?.value.clone(), Repr::String);
        let separator = match add.arguments.get(1) {
            Some(sep) => sep.value.clone(),
            None => Expr::string(ctx.separator.as_deref().unwrap_or(",")),
        };
        let concat = |a: Expr, b: Expr| Expr::call(Routine::named("concat"), vec![a, b], Repr::String);
        let appended = concat(acc.expr(), concat(separator, value.clone()));
        let next = Expr::condition(Expr::is_null(acc.expr()), value, appended);
        add.block.assign(&acc, next);
        Ok(())
    }
}
