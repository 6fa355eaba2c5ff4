use crate::error::ImpError;
use crate::implement::{CallImplementor, NullPolicy};
use crate::linq::{Expr, Routine};
use crate::rex::{JsonEmptyOrError, JsonValueBehavior, RexCall, Symbol};
use crate::translator::Translator;
use crate::types::Repr;

/// JSON_VALUE with its ON EMPTY / ON ERROR clauses normalized into the
/// fixed call `jsonValue(json, path, emptyBehavior, emptyDefault,
/// errorBehavior, errorDefault)`.
pub struct JsonValueImplementor;

impl CallImplementor for JsonValueImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Arg0
    }

    fn variable_name(&self) -> &str {
        "json_value"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let [json, path, rest @ ..] = args else {
            return Err(ImpError::invalid_call("JSON_VALUE", "expected a document and a path"));
        };
        let null = || Expr::null(Repr::Object);
        let is_default = |e: &Expr| {
            translator.literal_symbol(e) == Some(Symbol::JsonValueBehavior(JsonValueBehavior::Default))
        };

        let (mut empty_behavior, mut default_on_empty) = (null(), null());
        let (mut error_behavior, mut default_on_error) = (null(), null());
        for (i, operand) in rest.iter().enumerate() {
            let Some(Symbol::JsonEmptyOrError(which)) = translator.literal_symbol(operand) else {
                continue;
            };
            // `... ON EMPTY` is preceded by a behavior, or by DEFAULT and its value
            let previous = i
                .checked_sub(1)
                .and_then(|p| rest.get(p))
                .ok_or_else(|| ImpError::invalid_call("JSON_VALUE", "clause without a behavior"))?;
            let before_previous = i.checked_sub(2).and_then(|p| rest.get(p)).filter(|e| is_default(e));
            let (behavior, default_value) = match before_previous {
                Some(default_symbol) => (default_symbol.clone(), Expr::box_(previous.clone())),
                None => (previous.clone(), null()),
            };
            match which {
                JsonEmptyOrError::Empty => {
                    empty_behavior = behavior;
                    default_on_empty = default_value;
                }
                JsonEmptyOrError::Error => {
                    error_behavior = behavior;
                    default_on_error = default_value;
                }
            }
        }

        let operands = vec![
            json.clone(),
            path.clone(),
            empty_behavior,
            default_on_empty,
            error_behavior,
            default_on_error,
        ];
        let value = Expr::call(Routine::named("jsonValue"), operands, Repr::Object);
        Ok(Expr::convert(value, translator.repr_of(&call.ty)))
    }
}
