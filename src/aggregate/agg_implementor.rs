use crate::aggregate::{AggAddContext, AggContext, AggResetContext, AggResultContext};
use crate::error::ImpError;
use crate::implement::ExprResult;
use crate::linq::{Expr, Param, Statement};
use crate::types::{Primitive, Repr};

/// Accumulator layout plus the three transition phases of one aggregate.
///
/// The caller owns the accumulator slots. `reset` initializes them once per
/// group (or partition), `add` folds one row, `result` projects the slots to
/// the declared return type.
pub trait AggImplementor: Send + Sync {
    fn state_type(&self, ctx: &AggContext) -> Vec<Repr>;

    fn implement_reset(&self, ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError>;

    fn implement_add(&self, ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError>;

    fn implement_result(&self, ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError>;

    /// Reads window position context (ranks, row numbers, frame counts).
    fn needs_window(&self) -> bool {
        false
    }
}

/// Body of an aggregate that only ever folds non-null arguments. Wrap it in
/// [`Strict`] to get a full [`AggImplementor`].
pub trait StrictAggImplementor: Send + Sync {
    fn not_null_state(&self, ctx: &AggContext) -> Vec<Repr> {
        vec![ctx.repr_of(&ctx.return_type.with_nullability(false))]
    }

    fn implement_not_null_reset(&self, _ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        for slot in reset.accumulator {
            reset.block.assign(slot, Expr::default_of(&slot.repr));
        }
        Ok(())
    }

    fn implement_not_null_add(&self, ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError>;

    fn implement_not_null_result(&self, _ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        Ok(result.acc(0)?.expr())
    }

    fn needs_window(&self) -> bool {
        false
    }
}

/// Null handling shared by the strict aggregates: rows with a null argument
/// are skipped, and a nullable return type gets a trailing `has_value`
/// slot so an empty group yields null.
pub struct Strict<T>(pub T);

impl<T: StrictAggImplementor> Strict<T> {
    fn tracks_empty(ctx: &AggContext) -> bool {
        ctx.return_type.nullable
    }

    fn split(ctx: &AggContext, accumulator: &[Param]) -> usize {
        if Self::tracks_empty(ctx) {
            accumulator.len().saturating_sub(1)
        } else {
            accumulator.len()
        }
    }
}

impl<T: StrictAggImplementor> AggImplementor for Strict<T> {
    fn state_type(&self, ctx: &AggContext) -> Vec<Repr> {
        let mut state = self.0.not_null_state(ctx);
        if Self::tracks_empty(ctx) {
            state.push(Repr::Prim(Primitive::Bool));
        }
        state
    }

    fn implement_reset(&self, ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        let n = Self::split(ctx, reset.accumulator);
        if let Some(has_value) = reset.accumulator.get(n) {
            reset.block.assign(has_value, Expr::bool(false));
        }
        let mut inner = AggResetContext { block: &mut *reset.block, accumulator: &reset.accumulator[..n] };
        self.0.implement_not_null_reset(ctx, &mut inner)
    }

    fn implement_add(&self, ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        let n = Self::split(ctx, add.accumulator);
        let guard = Expr::fold_and(add.arguments.iter().map(|a| Expr::not(a.is_null.clone())).collect());
        let arguments: Vec<ExprResult> = add
            .arguments
            .iter()
            .map(|a| ExprResult::new(Expr::bool(false), Expr::unbox(a.value.clone())))
            .collect();

        let mut body = add.block.nest();
        if let Some(has_value) = add.accumulator.get(n) {
            body.assign(has_value, Expr::bool(true));
        }
        let mut inner = AggAddContext {
            block: &mut body,
            accumulator: &add.accumulator[..n],
            arguments: &arguments,
            window: add.window,
        };
        self.0.implement_not_null_add(ctx, &mut inner)?;
        let statements = add.block.exit(body);

        if guard.is_constant_bool(true) {
            statements.into_iter().for_each(|s| add.block.add(s));
        } else {
            add.block.add(Statement::if_then(guard, statements));
        }
        Ok(())
    }

    fn implement_result(&self, ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        let n = Self::split(ctx, result.accumulator);
        let has_value = result.accumulator.get(n).cloned();
        let mut inner = AggResultContext {
            block: &mut *result.block,
            accumulator: &result.accumulator[..n],
            keys: result.keys,
            window: result.window,
        };
        let value = self.0.implement_not_null_result(ctx, &mut inner)?;
        Ok(match has_value {
            Some(flag) => Expr::condition(flag.expr(), value, Expr::null(ctx.return_repr())),
            None => value,
        })
    }

    fn needs_window(&self) -> bool {
        self.0.needs_window()
    }
}
