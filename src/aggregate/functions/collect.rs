use crate::aggregate::{AggAddContext, AggContext, AggResetContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{Container, Expr, Routine, Statement};
use crate::types::Repr;

/// COLLECT gathers every value into a multiset; FUSION unions multisets.
pub struct CollectImplementor {
    routine: Routine,
}

impl CollectImplementor {
    pub fn collect() -> Self {
        Self { routine: Routine::named("collectionAdd") }
    }

    pub fn fusion() -> Self {
        Self { routine: Routine::named("collectionAddAll") }
    }
}

impl StrictAggImplementor for CollectImplementor {
    fn not_null_state(&self, _ctx: &AggContext) -> Vec<Repr> {
        vec![Repr::List]
    }

    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        reset.block.assign(&acc, Expr::New(Container::List));
        Ok(())
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let arg = Expr::box_(add.arg(0)?.value.clone());
        add.block.add(Statement::Invoke { target: acc, routine: self.routine.clone(), args: vec![arg] });
        Ok(())
    }
}
