use std::sync::Arc;

use crate::error::ImpError;
use crate::implement::{CallImplementor, NullPolicy};
use crate::linq::{Expr, Routine};
use crate::rex::RexCall;
use crate::translator::Translator;
use crate::types::{Repr, SqlTypeName};

/// Calls one runtime routine with the (policy-guarded) operands.
pub struct MethodImplementor {
    routine: Routine,
    policy: NullPolicy,
    harmonize: bool,
}

impl MethodImplementor {
    pub fn new(routine: &'static str, policy: NullPolicy) -> Self {
        Self { routine: Routine::named(routine), policy, harmonize: false }
    }

    pub fn harmonized(routine: &'static str, policy: NullPolicy) -> Self {
        Self { routine: Routine::named(routine), policy, harmonize: true }
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }
}

impl CallImplementor for MethodImplementor {
    fn null_policy(&self) -> NullPolicy {
        self.policy
    }

    fn harmonize(&self) -> bool {
        self.harmonize
    }

    fn variable_name(&self) -> &str {
        "method_call"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        Ok(Expr::call(self.routine.clone(), args.to_vec(), translator.repr_of(&call.ty)))
    }
}

/// Picks a routine by operand count, e.g. `rand()` vs `rand(seed)`.
pub struct ArityImplementor {
    name: &'static str,
    policy: NullPolicy,
    /// Index `i` holds the routine for `min_arity + i` operands.
    routines: Vec<Routine>,
    min_arity: usize,
}

impl ArityImplementor {
    pub fn new(name: &'static str, policy: NullPolicy, min_arity: usize, routines: &[&'static str]) -> Self {
        Self { name, policy, routines: routines.iter().map(|r| Routine::named(r)).collect(), min_arity }
    }
}

impl CallImplementor for ArityImplementor {
    fn null_policy(&self) -> NullPolicy {
        self.policy
    }

    fn variable_name(&self) -> &str {
        self.name
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let routine = args
            .len()
            .checked_sub(self.min_arity)
            .and_then(|i| self.routines.get(i))
            .ok_or_else(|| ImpError::invalid_call(call.op.name(), format!("no variant takes {} operands", args.len())))?;
        Ok(Expr::call(routine.clone(), args.to_vec(), translator.repr_of(&call.ty)))
    }
}

/// Negates another implementor's safe result (NOT LIKE, NOT SIMILAR TO,
/// negated regex matches, IS NOT A SET, ...).
pub struct NotImplementor {
    inner: Arc<dyn CallImplementor>,
}

impl NotImplementor {
    pub fn of(inner: Arc<dyn CallImplementor>) -> Self {
        Self { inner }
    }
}

impl CallImplementor for NotImplementor {
    fn null_policy(&self) -> NullPolicy {
        self.inner.null_policy()
    }

    fn harmonize(&self) -> bool {
        self.inner.harmonize()
    }

    fn variable_name(&self) -> &str {
        "not"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let inner = self.inner.implement_safe(translator, call, args)?;
        Ok(Expr::not(Expr::unbox(inner)))
    }
}

/// Temporal helpers with a DATE and a TIMESTAMP flavor (LAST_DAY, DAYNAME,
/// MONTHNAME); the name functions also take the session locale.
pub struct TemporalMethodImplementor {
    name: &'static str,
    date_routine: Routine,
    timestamp_routine: Routine,
    with_locale: bool,
}

impl TemporalMethodImplementor {
    pub fn new(name: &'static str, date_routine: &'static str, timestamp_routine: &'static str, with_locale: bool) -> Self {
        Self {
            name,
            date_routine: Routine::named(date_routine),
            timestamp_routine: Routine::named(timestamp_routine),
            with_locale,
        }
    }
}

impl CallImplementor for TemporalMethodImplementor {
    fn null_policy(&self) -> NullPolicy {
        NullPolicy::Strict
    }

    fn variable_name(&self) -> &str {
        self.name
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let operand = call
            .operands
            .first()
            .ok_or_else(|| ImpError::invalid_call(call.op.name(), "expected 1 operand"))?;
        let routine = match operand.ty().name {
            SqlTypeName::Timestamp | SqlTypeName::TimestampWithLocalTimeZone => &self.timestamp_routine,
            SqlTypeName::Date => &self.date_routine,
            other => return Err(ImpError::unsupported(format!("{} of {other:?}", call.op.name()))),
        };
        let mut operands = args.to_vec();
        if self.with_locale {
            let locale = Expr::call(Routine::named("locale"), vec![translator.root()], Repr::String);
            operands.push(locale);
        }
        Ok(Expr::call(routine.clone(), operands, translator.repr_of(&call.ty)))
    }
}
