use crate::aggregate::{AggAddContext, AggContext, AggImplementor, AggResetContext, AggResultContext};
use crate::error::ImpError;
use crate::linq::{Container, Expr, Routine, Statement};
use crate::rex::{JsonNullClause, Symbol};
use crate::runtime::Value;
use crate::types::Repr;

/// JSON_OBJECTAGG(key, value) and JSON_ARRAYAGG(value). Null values are
/// kept or dropped by the null clause, so every row reaches `add`.
pub struct JsonAggImplementor {
    object: bool,
    null_clause: JsonNullClause,
}

impl JsonAggImplementor {
    pub fn object(null_clause: JsonNullClause) -> Self {
        Self { object: true, null_clause }
    }

    pub fn array(null_clause: JsonNullClause) -> Self {
        Self { object: false, null_clause }
    }
}

impl AggImplementor for JsonAggImplementor {
    fn state_type(&self, _ctx: &AggContext) -> Vec<Repr> {
        vec![if self.object { Repr::Map } else { Repr::List }]
    }

    fn implement_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let acc = reset.acc(0)?.clone();
        let container = if self.object { Container::Map } else { Container::List };
        reset.block.assign(&acc, Expr::New(container));
        Ok(())
    }

    fn implement_add(&self, _ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let acc = add.acc(0)?.clone();
        let clause = Expr::constant(Value::Symbol(Symbol::JsonNullClause(self.null_clause)), Repr::Symbol);
        let (routine, args) = if self.object {
            let key = add.arg(0)?.value.clone();
            let value = Expr::box_(add.arg(1)?.value.clone());
            ("jsonObjectAggAdd", vec![key, value, clause])
        } else {
            let value = Expr::box_(add.arg(0)?.value.clone());
            ("jsonArrayAggAdd", vec![value, clause])
        };
        add.block.add(Statement::Invoke { target: acc, routine: Routine::named(routine), args });
        Ok(())
    }

    fn implement_result(&self, _ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        let acc = result.acc(0)?.expr();
        Ok(Expr::call(Routine::named("jsonize"), vec![acc], Repr::String))
    }
}
