use crate::error::ImpError;
use crate::implement::CallImplementor;
use crate::linq::{Container, Expr, Routine, Statement};
use crate::rex::{OperatorKind, RexCall};
use crate::translator::Translator;

/// ARRAY[...] and MAP[...]: a fresh container filled in operand order.
/// Repeated map keys overwrite, so the last pair wins.
pub struct ValueConstructorImplementor;

impl CallImplementor for ValueConstructorImplementor {
    fn variable_name(&self) -> &str {
        "value_constructor"
    }

    fn implement_safe(&self, translator: &mut Translator, call: &RexCall, args: &[Expr]) -> Result<Expr, ImpError> {
        let (container, suggestion) = match call.kind() {
            Some(OperatorKind::MapValueConstructor) => (Container::Map, "map"),
            Some(OperatorKind::ArrayValueConstructor) => (Container::List, "list"),
            _ => return Err(ImpError::unsupported(format!("not a value constructor: {}", call.op.name()))),
        };
        if container == Container::Map && args.len() % 2 != 0 {
            return Err(ImpError::invalid_call(call.op.name(), "expects key/value pairs"));
        }

        let block = translator.block_mut();
        let target = block.declare(suggestion, Expr::New(container));
        let Expr::Param(param) = &target else {
            return Err(ImpError::unsupported("container declaration did not yield a variable"));
        };
        match container {
            Container::Map => {
                for pair in args.chunks(2) {
                    block.add(Statement::Invoke {
                        target: param.clone(),
                        routine: Routine::named("mapPut"),
                        args: pair.iter().cloned().map(Expr::box_).collect(),
                    });
                }
            }
            Container::List => {
                for arg in args {
                    block.add(Statement::Invoke {
                        target: param.clone(),
                        routine: Routine::named("collectionAdd"),
                        args: vec![Expr::box_(arg.clone())],
                    });
                }
            }
        }
        Ok(target)
    }
}
