use std::sync::Arc;

use crate::error::ImpError;
use crate::implement::{ExprResult, NullPolicy};
use crate::linq::Expr;
use crate::rex::RexCall;
use crate::translator::Translator;
use crate::types::{RelType, Repr};

/// Produces code for one operator.
///
/// Implementors are built once, shared read-only, and hold no per-call state.
/// Most only supply [`implement_safe`](CallImplementor::implement_safe),
/// which sees operands already guarded by the null policy; the provided
/// [`implement`](CallImplementor::implement) wraps it.
pub trait CallImplementor: Send + Sync {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::None
    }

    /// Convert operands to their least-restrictive common type first.
    fn harmonize(&self) -> bool {
        false
    }

    /// Prefix of the `_value` / `_isNull` variables this implementor declares.
    fn variable_name(&self) -> &str;

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError>;

    /// What the call yields when the null condition holds.
    fn else_value(&self, repr: Repr) -> Expr {
        Expr::default_of(&repr)
    }

    fn implement(&self, translator: &mut Translator, call: &RexCall, args: &[ExprResult]) -> Result<ExprResult, ImpError> {
        implement_with_policy(self, translator, call, args)
    }
}

/// The null-policy wrapper every policy-driven implementor goes through.
pub fn implement_with_policy<I: CallImplementor + ?Sized>(
    implementor: &I,
    translator: &mut Translator,
    call: &RexCall,
    args: &[ExprResult],
) -> Result<ExprResult, ImpError> {
    let policy = implementor.null_policy();
    let flags: Vec<Expr> = args.iter().map(|a| a.is_null.clone()).collect();
    let condition = policy.classify(&flags);

    let mut operands: Vec<Expr> = args.iter().map(|a| a.value.clone()).collect();
    if implementor.harmonize() {
        operands = harmonize(translator, call, operands);
    }
    let operands = policy.unbox(operands);

    let safe = implementor.implement_safe(translator, call, &operands)?;
    let safe = conform(translator, call, safe);
    let else_value = implementor.else_value(safe.repr());
    Ok(materialize(translator, implementor.variable_name(), condition, else_value, safe))
}

/// Declares `name_value = condition ? else_value : safe` and a null flag
/// recomputed from that value.
///
/// The flag is derived from the value rather than copied from the
/// condition: null tests put a literal boolean in `else_value` and so
/// must come out non-null.
pub fn materialize(
    translator: &mut Translator,
    name: &str,
    condition: Expr,
    else_value: Expr,
    safe: Expr,
) -> ExprResult {
    let value = Expr::condition(condition, else_value, safe);
    let value = translator.block_mut().append(&format!("{name}_value"), value);
    let is_null = translator.check_null(&value);
    let is_null = translator.block_mut().append(&format!("{name}_isNull"), is_null);
    ExprResult::new(is_null, value)
}

/// Converts every operand to the least-restrictive type of the operand
/// types when they are not already identical.
pub fn harmonize(translator: &Translator, call: &RexCall, operands: Vec<Expr>) -> Vec<Expr> {
    let types: Vec<RelType> = call
        .operands
        .iter()
        .map(|o| o.ty().with_nullability(translator.is_nullable(o)))
        .collect();
    let Some(first) = types.first() else {
        return operands;
    };
    if types.iter().all(|t| t == first) {
        return operands;
    }
    let Some(common) = translator.type_factory().least_restrictive(&types) else {
        return operands;
    };
    let repr = translator.repr_of(&common);
    operands.into_iter().map(|e| Expr::convert(e, repr)).collect()
}

/// Brings a safe result to the call's declared representation. User
/// defined table functions and macros are left as produced.
pub fn conform(translator: &Translator, call: &RexCall, safe: Expr) -> Expr {
    let target = translator.repr_of(&call.ty);
    if safe.repr() == target || call.op.is_table_function_or_macro() {
        safe
    } else {
        Expr::convert(safe, target)
    }
}

/// A body that only ever sees non-null operands.
pub trait NotNullImplementor: Send + Sync {
    fn implement(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError>;
}

/// Lifts a [`NotNullImplementor`] into a full implementor under a policy.
pub struct NotNullAdapter {
    name: String,
    policy: NullPolicy,
    body: Arc<dyn NotNullImplementor>,
}

impl NotNullAdapter {
    pub fn new(name: impl Into<String>, policy: NullPolicy, body: Arc<dyn NotNullImplementor>) -> Self {
        Self { name: name.into(), policy, body }
    }
}

impl CallImplementor for NotNullAdapter {
    fn null_policy(&self) -> NullPolicy {
        self.policy
    }

    fn variable_name(&self) -> &str {
        &self.name
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        self.body.implement(translator, call, args)
    }
}
