use crate::aggregate::{AggAddContext, AggContext, AggImplementor, AggResetContext, AggResultContext, CountImplementor, Strict};
use crate::error::ImpError;
use crate::linq::Expr;
use crate::types::{Primitive, Repr};

/// Windowed COUNT. Without nullable arguments every frame row counts, so
/// the result is read off the frame size and no state is kept.
pub struct CountWinImplementor {
    counting: Strict<CountImplementor>,
}

impl CountWinImplementor {
    pub fn new() -> Self {
        Self { counting: Strict(CountImplementor) }
    }

    fn just_frame_row_count(ctx: &AggContext) -> bool {
        !ctx.has_nullable_argument()
    }
}

impl Default for CountWinImplementor {
    fn default() -> Self {
        Self::new()
    }
}

impl AggImplementor for CountWinImplementor {
    fn state_type(&self, ctx: &AggContext) -> Vec<Repr> {
        if Self::just_frame_row_count(ctx) {
            Vec::new()
        } else {
            self.counting.state_type(ctx)
        }
    }

    fn implement_reset(&self, ctx: &AggContext, reset: &mut AggResetContext) -> Result<(), ImpError> {
        if Self::just_frame_row_count(ctx) {
            return Ok(());
        }
        self.counting.implement_reset(ctx, reset)
    }

    fn implement_add(&self, ctx: &AggContext, add: &mut AggAddContext) -> Result<(), ImpError> {
        if Self::just_frame_row_count(ctx) {
            return Ok(());
        }
        self.counting.implement_add(ctx, add)
    }

    fn implement_result(&self, ctx: &AggContext, result: &mut AggResultContext) -> Result<Expr, ImpError> {
        if Self::just_frame_row_count(ctx) {
            let count = result.window()?.frame_row_count();
            return Ok(Expr::convert(count, Repr::Prim(Primitive::I64)));
        }
        self.counting.implement_result(ctx, result)
    }

    fn needs_window(&self) -> bool {
        true
    }
}
