use crate::error::ImpError;
use crate::implement::{CallImplementor, MethodImplementor, NullPolicy};
use crate::linq::Expr;
use crate::rex::RexCall;
use crate::translator::Translator;
use crate::types::SqlTypeName;

/// `container[key]`: array, map or dynamic lookup chosen by the static
/// type of the container. A missing element yields null, not an error.
pub struct ItemImplementor;

impl CallImplementor for ItemImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        "item"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let container = call
            .operands
            .first()
            .ok_or_else(|| ImpError::invalid_call("ITEM", "expected 2 operands"))?;
        let lookup = match container.ty().name {
            SqlTypeName::Array => MethodImplementor::new("arrayItem", NullPolicy::Strict),
            SqlTypeName::Map => MethodImplementor::new("mapItem", NullPolicy::Strict),
            _ => MethodImplementor::new("anyItem", NullPolicy::Strict),
        };
        lookup.implement_safe(translator, call, args)
    }
}
