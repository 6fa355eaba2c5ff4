use crate::aggregate::{AggAddContext, AggContext, AggResetContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{Container, Expr, Routine, Statement};
use crate::types::Repr;

/// INTERSECTION of multisets: the first one seen is copied, later ones
/// only remove elements.
pub struct IntersectionImplementor;

impl StrictAggImplementor for IntersectionImplementor {
    fn not_null_state(&self, _ctx: &AggContext) -> Vec<Repr> {
        vec![Repr::List]
    }

    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        reset.block.assign(&acc, Expr::null(Repr::List));
        Ok(())
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let arg = add.arg(0)?.value.clone();
        let first = vec![
            Statement::Assign { target: acc.clone(), value: Expr::New(Container::List) },
            Statement::Invoke { target: acc.clone(), routine: Routine::named("collectionAddAll"), args: vec![arg.clone()] },
        ];
        let later = vec![Statement::Invoke {
            target: acc.clone(),
            routine: Routine::named("collectionRetainAll"),
            args: vec![arg],
        }];
        add.block.add(Statement::If { test: Expr::is_null(acc.expr()), then: first, otherwise: later });
        Ok(())
    }
}
