use tracing::debug;

use crate::aggregate::{AggAddContext, AggContext, AggResetContext, AggResultContext, ParamWindowFrame, WindowFrame};
use crate::error::ImpError;
use crate::implement::ExprResult;
use crate::linq::{Block, BlockBuilder, Expr, Param};
use crate::registry::ImpTable;
use crate::rex::AggFunction;
use crate::types::{Primitive, Repr};

/// The transition functions of one compiled aggregate call, ready to be
/// wired into the caller's row loop.
///
/// The caller binds `arguments` (and, for windows, the frame slots) before
/// running `add`, runs `reset` once per group, and evaluates `value` after
/// running `result`. Accumulator slots persist between the three blocks.
#[derive(Debug, Clone)]
pub struct AggBundle {
    pub accumulator: Vec<Param>,
    pub arguments: Vec<Param>,
    /// One slot per group key followed by one "rolled up" flag per key.
    pub keys: Vec<Param>,
    pub window: Option<ParamWindowFrame>,
    pub reset: Block,
    pub add: Block,
    pub result: Block,
    pub value: Expr,
}

impl AggBundle {
    pub fn compile(table: &ImpTable, function: &AggFunction, ctx: &AggContext, for_window: bool) -> Result<Self, ImpError> {
        let implementor = table.aggregate(function, for_window)?;
        let mut ctx = ctx.clone();
        if ctx.separator.is_none() {
            ctx.separator = Some(table.config().default_listagg_separator.clone());
        }

        let mut names = BlockBuilder::new();
        let accumulator: Vec<Param> = implementor
            .state_type(&ctx)
            .into_iter()
            .enumerate()
            .map(|(i, repr)| names.new_param(&format!("acc{i}"), repr))
            .collect();
        let arguments: Vec<Param> = ctx
            .parameter_types
            .iter()
            .enumerate()
            .map(|(i, ty)| names.new_param(&format!("arg{i}"), ctx.repr_of(ty)))
            .collect();
        let mut keys: Vec<Param> = (0..ctx.key_ordinals.len())
            .map(|i| names.new_param(&format!("key{i}"), Repr::Object))
            .collect();
        let indicators: Vec<Param> = (0..ctx.key_ordinals.len())
            .map(|i| names.new_param(&format!("rolled_up{i}"), Repr::Prim(Primitive::Bool)))
            .collect();
        keys.extend(indicators);
        let window = for_window.then(|| ParamWindowFrame::new(&mut names));
        let frame = window.as_ref().map(|w| w as &dyn WindowFrame);

        let mut block = names.nest();
        implementor.implement_reset(&ctx, &mut AggResetContext { block: &mut block, accumulator: &accumulator })?;
        let reset = Block::new(names.exit(block));

        let argument_results: Vec<ExprResult> = arguments
            .iter()
            .map(|p| ExprResult::new(Expr::is_null(p.expr()), p.expr()))
            .collect();
        let mut block = names.nest();
        implementor.implement_add(
            &ctx,
            &mut AggAddContext { block: &mut block, accumulator: &accumulator, arguments: &argument_results, window: frame },
        )?;
        let add = Block::new(names.exit(block));

        let key_exprs: Vec<Expr> = keys.iter().map(Param::expr).collect();
        let mut block = names.nest();
        let value = implementor.implement_result(
            &ctx,
            &mut AggResultContext { block: &mut block, accumulator: &accumulator, keys: &key_exprs, window: frame },
        )?;
        let result = Block::new(names.exit(block));

        debug!(aggregate = %function.name(), slots = accumulator.len(), for_window, "compiled aggregate");
        Ok(Self { accumulator, arguments, keys, window, reset, add, result, value })
    }
}
