use crate::error::ImpError;
use crate::implement::CallImplementor;
use crate::linq::{Expr, Routine};
use crate::rex::{OperatorKind, RexCall};
use crate::translator::Translator;
use crate::types::{Primitive, Repr};

/// Session and clock functions; all read the evaluation context.
pub struct SystemFunctionImplementor;

impl CallImplementor for SystemFunctionImplementor {
    fn variable_name(&self) -> &str {
        "system_func"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, _args: &[Expr]) -> Result<Expr, ImpError> {
        let root = translator.root();
        let context_call = |name: &'static str, repr: Repr| Expr::call(Routine::named(name), vec![root.clone()], repr);
        let i32_ = Repr::Prim(Primitive::I32);
        let i64_ = Repr::Prim(Primitive::I64);
        match call.kind() {
            Some(OperatorKind::User | OperatorKind::CurrentUser | OperatorKind::SessionUser) => {
                Ok(context_call("user", Repr::String))
            }
            Some(OperatorKind::SystemUser) => Ok(context_call("systemUser", Repr::String)),
            Some(OperatorKind::CurrentPath | OperatorKind::CurrentRole | OperatorKind::CurrentCatalog) => {
                Ok(Expr::string(""))
            }
            Some(OperatorKind::CurrentTimestamp) => Ok(context_call("currentTimestamp", i64_)),
            Some(OperatorKind::CurrentTime) => Ok(context_call("currentTime", i32_)),
            Some(OperatorKind::CurrentDate) => Ok(context_call("currentDate", i32_)),
            Some(OperatorKind::LocalTimestamp) => Ok(context_call("localTimestamp", i64_)),
            Some(OperatorKind::LocalTime) => Ok(context_call("localTime", i32_)),
            _ => Err(ImpError::unsupported(format!("unknown system function {}", call.op.name()))),
        }
    }
}
