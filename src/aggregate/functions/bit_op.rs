use crate::aggregate::{AggAddContext, AggContext, AggResetContext, StrictAggImplementor};
use crate::error::ImpError;
use crate::linq::{Expr, Routine};
use crate::rex::AggKind;
use crate::runtime::Value;

/// BIT_AND (starts from all ones), BIT_OR and BIT_XOR (start from zero).
pub struct BitOpImplementor {
    kind: AggKind,
}

impl BitOpImplementor {
    pub fn new(kind: AggKind) -> Self {
        Self { kind }
    }

    fn routine(&self) -> Routine {
        Routine::named(match self.kind {
            AggKind::BitAnd => "bitAnd",
            AggKind::BitOr => "bitOr",
            _ => "bitXor",
        })
    }
}

impl StrictAggImplementor for BitOpImplementor {
    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        let initial = match self.kind {
            AggKind::BitAnd => Expr::constant(Value::Int(-1), acc.repr),
            _ => Expr::default_of(&acc.repr),
        };
        reset.block.assign(&acc, initial);
        Ok(())
    }

    fn implement_not_null_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let arg = Expr::convert(add.arg(0)?.value.clone(), acc.repr);
        add.block.assign(&acc, Expr::call(self.routine(), vec![acc.expr(), arg], acc.repr));
        Ok(())
    }
}
