use crate::aggregate::{AggAddContext, AggContext, AggResetContext, AggResultContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{Expr, Routine};
use crate::types::Repr;

/// A user-defined aggregate backed by three runtime routines: `init()`
/// builds the state, `add(state, args...)` returns the next state and
/// `result(state)` projects it.
pub struct RoutineAggImplementor {
    init: Routine,
    add: Routine,
    result: Routine,
}

impl RoutineAggImplementor {
    pub fn new(init: impl Into<String>, add: impl Into<String>, result: impl Into<String>) -> Self {
        Self { init: Routine::dynamic(init), add: Routine::dynamic(add), result: Routine::dynamic(result) }
    }
}

impl StrictAggImplementor for RoutineAggImplementor {
    fn not_null_state(&self, _ctx: &AggContext) -> Vec<Repr> {
        vec![Repr::Object]
    }

    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        reset.block.assign(&acc, Expr::call(self.init.clone(), Vec::new(), Repr::Object));
        Ok(())
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let mut args = vec![acc.expr()];
        args.extend(add.arguments.iter().map(|a| Expr::box_(a.value.clone())));
        add.block.assign(&acc, Expr::call(self.add.clone(), args, Repr::Object));
        Ok(())
    }

    fn implement_not_null_result(&self, ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        let acc = result.acc(0)?.expr();
        let repr = ctx.repr_of(&ctx.return_type.with_nullability(false));
        Ok(Expr::convert(Expr::call(self.result.clone(), vec![acc], Repr::Object), repr))
    }
}
