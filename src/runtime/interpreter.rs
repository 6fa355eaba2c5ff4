use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::error::RuntimeError;
use crate::implement::ExprResult;
use crate::linq::{BinaryOp, Block, Container, Expr, Statement, UnaryOp};
use crate::runtime::functions::{self, operators};
use crate::runtime::{DataContext, Value};
use crate::types::Repr;

pub type UserRoutine = Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

/// Walks emitted blocks and expressions against a variable environment.
///
/// Calls resolve first to routines registered on this interpreter, then to
/// the routines that read its [`DataContext`] (users, clock, sequences,
/// random numbers), then to the shared routine library.
pub struct Interpreter {
    context: DataContext,
    env: HashMap<String, Value>,
    routines: HashMap<String, UserRoutine>,
    sequences: HashMap<String, i64>,
    seeded: HashMap<i64, StdRng>,
}

impl Interpreter {
    pub fn new(context: DataContext) -> Self {
        let mut env = HashMap::new();
        env.insert("root".to_string(), Value::Null);
        Self { context, env, routines: HashMap::new(), sequences: HashMap::new(), seeded: HashMap::new() }
    }

    pub fn context(&self) -> &DataContext {
        &self.context
    }

    pub fn bind(&mut self, name: &str, value: Value) {
        self.env.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.env.get(name)
    }

    pub fn register_routine<F>(&mut self, name: impl Into<String>, routine: F)
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.routines.insert(name.into(), Arc::new(routine));
    }

    /// Runs `block`, then reads the result: null when its null test holds.
    pub fn evaluate(&mut self, block: &Block, result: &ExprResult) -> Result<Value, RuntimeError> {
        self.run(block)?;
        if self.eval(&result.is_null)? == Value::Bool(true) {
            return Ok(Value::Null);
        }
        self.eval(&result.value)
    }

    pub fn run(&mut self, block: &Block) -> Result<(), RuntimeError> {
        self.run_statements(&block.statements)
    }

    fn run_statements(&mut self, statements: &[Statement]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        match statement {
            Statement::Declare { param, init } => {
                let value = self.eval(init)?;
                self.env.insert(param.name.clone(), value);
            }
            Statement::Assign { target, value } => {
                let value = self.eval(value)?;
                self.env.insert(target.name.clone(), value);
            }
            Statement::Invoke { target, routine, args } => {
                let args = self.eval_all(args)?;
                let mutate = functions::mutator(routine.name())
                    .ok_or_else(|| RuntimeError::UnknownRoutine(routine.name().to_string()))?;
                let slot = self
                    .env
                    .get_mut(&target.name)
                    .ok_or_else(|| RuntimeError::UnboundVariable(target.name.clone()))?;
                mutate(slot, &args)?;
            }
            Statement::If { test, then, otherwise } => {
                if self.eval(test)? == Value::Bool(true) {
                    self.run_statements(then)?;
                } else {
                    self.run_statements(otherwise)?;
                }
            }
            Statement::Throw(e) => return Err(e.clone()),
        }
        Ok(())
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Constant { value, .. } => Ok(value.clone()),
            Expr::Param(p) => self
                .env
                .get(&p.name)
                .cloned()
                .ok_or_else(|| RuntimeError::UnboundVariable(p.name.clone())),
            Expr::Call { routine, args, .. } => {
                let args = self.eval_all(args)?;
                self.call(routine.name(), &args)
            }
            Expr::Binary { op: BinaryOp::AndAlso, left, right, .. } => {
                let l = self.eval(left)?;
                if l == Value::Bool(false) {
                    return Ok(l);
                }
                let r = self.eval(right)?;
                Ok(match (l, r) {
                    (_, Value::Bool(false)) => Value::Bool(false),
                    (Value::Null, _) | (_, Value::Null) => Value::Null,
                    _ => Value::Bool(true),
                })
            }
            Expr::Binary { op: BinaryOp::OrElse, left, right, .. } => {
                let l = self.eval(left)?;
                if l == Value::Bool(true) {
                    return Ok(l);
                }
                let r = self.eval(right)?;
                Ok(match (l, r) {
                    (_, Value::Bool(true)) => Value::Bool(true),
                    (Value::Null, _) | (_, Value::Null) => Value::Null,
                    _ => Value::Bool(false),
                })
            }
            Expr::Binary { op, left, right, repr } => {
                let (l, r) = (self.eval(left)?, self.eval(right)?);
                let value = if op.is_comparison() {
                    operators::compare(*op, &l, &r)?
                } else {
                    operators::arithmetic(*op, &l, &r)?
                };
                narrow(value, repr)
            }
            Expr::Unary { op, operand, repr } => {
                let v = self.eval(operand)?;
                match op {
                    UnaryOp::IsNull => Ok(Value::Bool(v.is_null())),
                    UnaryOp::IsNotNull => Ok(Value::Bool(!v.is_null())),
                    UnaryOp::UnaryPlus => Ok(v),
                    UnaryOp::Not => match v {
                        Value::Null => Ok(Value::Null),
                        Value::Bool(b) => Ok(Value::Bool(!b)),
                        other => Err(RuntimeError::type_mismatch(format!("NOT of {}", other.type_name()))),
                    },
                    UnaryOp::Negate => narrow(negate(v)?, repr),
                }
            }
            Expr::Condition { test, if_true, if_false, .. } => {
                if self.eval(test)? == Value::Bool(true) {
                    self.eval(if_true)
                } else {
                    self.eval(if_false)
                }
            }
            Expr::Convert { operand, repr } => self.eval(operand)?.convert_to(repr),
            Expr::New(Container::List) => Ok(Value::List(Vec::new())),
            Expr::New(Container::Map) => Ok(Value::Map(Default::default())),
        }
    }

    fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        trace!(routine = name, arity = args.len(), "calling routine");
        if let Some(routine) = self.routines.get(name) {
            return routine(args);
        }
        if let Some(value) = self.context_call(name, args)? {
            return Ok(value);
        }
        match functions::builtin(name) {
            Some(routine) => routine(args),
            None => Err(RuntimeError::UnknownRoutine(name.to_string())),
        }
    }

    /// Routines that read or advance interpreter state. The first argument
    /// of the context readers is the `root` slot and is ignored.
    fn context_call(&mut self, name: &str, args: &[Value]) -> Result<Option<Value>, RuntimeError> {
        let ctx = &self.context;
        let value = match name {
            "user" => Value::str(ctx.user.clone()),
            "systemUser" => Value::str(ctx.system_user.clone()),
            "currentTimestamp" => Value::Int(ctx.current_timestamp),
            "currentTime" => Value::Int(ctx.current_time()),
            "currentDate" => Value::Int(ctx.current_date()),
            "localTimestamp" => Value::Int(ctx.local_timestamp()),
            "localTime" => Value::Int(ctx.local_time()),
            "locale" => Value::str(ctx.locale.clone()),
            "timeZone" => Value::Int(ctx.time_zone_offset),
            "sequenceNextValue" => {
                let seq = sequence_name(name, args)?;
                let next = self.sequences.entry(seq).or_insert(0);
                *next += 1;
                Value::Int(*next)
            }
            "sequenceCurrentValue" => {
                let seq = sequence_name(name, args)?;
                let current = self
                    .sequences
                    .get(&seq)
                    .ok_or_else(|| RuntimeError::invalid_argument(name, format!("sequence {seq} has no value yet")))?;
                Value::Int(*current)
            }
            "rand" => Value::float(rand::rng().random::<f64>()),
            "randSeed" => {
                let seed = seed_arg(name, args, 0)?;
                Value::float(self.seeded_rng(seed).random::<f64>())
            }
            "randInteger" => {
                let bound = bound_arg(name, args, 0)?;
                Value::Int(rand::rng().random_range(0..bound))
            }
            "randIntegerSeed" => {
                let seed = seed_arg(name, args, 0)?;
                let bound = bound_arg(name, args, 1)?;
                Value::Int(self.seeded_rng(seed).random_range(0..bound))
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn seeded_rng(&mut self, seed: i64) -> &mut StdRng {
        self.seeded.entry(seed).or_insert_with(|| StdRng::seed_from_u64(seed as u64))
    }
}

fn sequence_name(routine: &str, args: &[Value]) -> Result<String, RuntimeError> {
    match args.get(1) {
        Some(Value::Str(s)) => Ok(s.clone()),
        _ => Err(RuntimeError::invalid_argument(routine, "expected a sequence name")),
    }
}

fn seed_arg(routine: &str, args: &[Value], i: usize) -> Result<i64, RuntimeError> {
    args.get(i)
        .and_then(Value::as_i64)
        .ok_or_else(|| RuntimeError::invalid_argument(routine, "expected an integer seed"))
}

fn bound_arg(routine: &str, args: &[Value], i: usize) -> Result<i64, RuntimeError> {
    match args.get(i).and_then(Value::as_i64) {
        Some(bound) if bound > 0 => Ok(bound),
        _ => Err(RuntimeError::invalid_argument(routine, "bound must be positive")),
    }
}

fn negate(v: Value) -> Result<Value, RuntimeError> {
    match v {
        Value::Null => Ok(Value::Null),
        Value::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(|| RuntimeError::Overflow("negate".into())),
        Value::Float(f) => Ok(Value::float(-f.0)),
        Value::Decimal(d) => Ok(Value::Decimal(-d)),
        other => Err(RuntimeError::type_mismatch(format!("cannot negate {}", other.type_name()))),
    }
}

/// Fits a numeric result to the width of the node that produced it.
fn narrow(value: Value, repr: &Repr) -> Result<Value, RuntimeError> {
    match (repr, &value) {
        (_, Value::Null) => Ok(value),
        (Repr::Prim(_) | Repr::Boxed(_), _) => value.convert_to(repr),
        (Repr::Decimal, Value::Decimal(_)) => Ok(value),
        (Repr::Decimal, _) => Ok(value.as_decimal().map(Value::Decimal).unwrap_or(value)),
        _ => Ok(value),
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DataContext::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linq::{Param, Routine};
    use crate::types::Primitive;

    const I32: Repr = Repr::Prim(Primitive::I32);
    const BOOL: Repr = Repr::Boxed(Primitive::Bool);

    fn it() -> Interpreter {
        Interpreter::new(DataContext::fixed(1_710_505_845_000, 3_600_000))
    }

    fn bool_c(v: Option<bool>) -> Expr {
        Expr::Constant { value: v.map(Value::Bool).unwrap_or(Value::Null), repr: BOOL }
    }

    fn logic(op: BinaryOp, a: Option<bool>, b: Option<bool>) -> Value {
        let e = Expr::Binary { op, left: Box::new(bool_c(a)), right: Box::new(bool_c(b)), repr: BOOL };
        it().eval(&e).unwrap()
    }

    #[test]
    fn logic_is_three_valued() {
        assert_eq!(logic(BinaryOp::AndAlso, Some(false), None), Value::Bool(false));
        assert_eq!(logic(BinaryOp::AndAlso, None, Some(false)), Value::Bool(false));
        assert_eq!(logic(BinaryOp::AndAlso, Some(true), None), Value::Null);
        assert_eq!(logic(BinaryOp::OrElse, None, Some(true)), Value::Bool(true));
        assert_eq!(logic(BinaryOp::OrElse, None, Some(false)), Value::Null);
        assert_eq!(logic(BinaryOp::OrElse, Some(false), Some(false)), Value::Bool(false));
    }

    #[test]
    fn short_circuit_skips_the_right_side() {
        let failing = Expr::call(Routine::named("noSuchRoutine"), vec![], BOOL);
        let e = Expr::Binary { op: BinaryOp::AndAlso, left: Box::new(bool_c(Some(false))), right: Box::new(failing), repr: BOOL };
        assert_eq!(it().eval(&e).unwrap(), Value::Bool(false));
    }

    #[test]
    fn arithmetic_narrows_to_the_node_width() {
        let c = |i: i64| Expr::Constant { value: Value::Int(i), repr: I32 };
        let e = Expr::Binary { op: BinaryOp::Add, left: Box::new(c(i32::MAX as i64)), right: Box::new(c(1)), repr: I32 };
        assert_eq!(it().eval(&e).unwrap(), Value::Int(i32::MIN as i64));
    }

    #[test]
    fn statements_update_the_environment() {
        let acc = Param::new("acc", Repr::List);
        let x = Param::new("x", I32);
        let block = Block::new(vec![
            Statement::Declare { param: acc.clone(), init: Expr::New(Container::List) },
            Statement::Assign { target: x.clone(), value: Expr::Constant { value: Value::Int(3), repr: I32 } },
            Statement::Invoke { target: acc.clone(), routine: Routine::named("collectionAdd"), args: vec![x.expr()] },
            Statement::If {
                test: bool_c(Some(false)),
                then: vec![Statement::Throw(RuntimeError::DivisionByZero)],
                otherwise: vec![],
            },
        ]);
        let mut interpreter = it();
        interpreter.run(&block).unwrap();
        assert_eq!(interpreter.get("acc"), Some(&Value::List(vec![Value::Int(3)])));

        let failing = Block::new(vec![Statement::Throw(RuntimeError::DivisionByZero)]);
        assert_eq!(interpreter.run(&failing), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn unknown_names_are_errors() {
        let mut interpreter = it();
        let missing = Param::new("missing", I32).expr();
        assert!(matches!(interpreter.eval(&missing), Err(RuntimeError::UnboundVariable(_))));
        let call = Expr::call(Routine::named("compress"), vec![], Repr::Bytes);
        assert!(matches!(interpreter.eval(&call), Err(RuntimeError::UnknownRoutine(_))));
    }

    #[test]
    fn registered_routines_shadow_the_library() {
        let mut interpreter = it();
        interpreter.register_routine("upper", |_: &[Value]| Ok(Value::str("shadowed")));
        let call = Expr::call(Routine::named("upper"), vec![Expr::string("a")], Repr::String);
        assert_eq!(interpreter.eval(&call).unwrap(), Value::str("shadowed"));
    }

    #[test]
    fn context_routines_read_the_snapshot() {
        let mut interpreter = it();
        let root = Param::new("root", Repr::Object).expr();
        let call = |name: &'static str| Expr::call(Routine::named(name), vec![root.clone()], Repr::Object);
        assert_eq!(interpreter.eval(&call("timeZone")).unwrap(), Value::Int(3_600_000));
        assert_eq!(interpreter.eval(&call("locale")).unwrap(), Value::str("en"));
        assert_eq!(interpreter.eval(&call("localTime")).unwrap(), Value::Int(48_645_000));
        let seq = |name: &'static str| {
            Expr::call(Routine::named(name), vec![root.clone(), Expr::string("s")], Repr::Prim(Primitive::I64))
        };
        assert!(interpreter.eval(&seq("sequenceCurrentValue")).is_err());
        assert_eq!(interpreter.eval(&seq("sequenceNextValue")).unwrap(), Value::Int(1));
        assert_eq!(interpreter.eval(&seq("sequenceCurrentValue")).unwrap(), Value::Int(1));
    }

    #[test]
    fn seeded_random_numbers_repeat_per_interpreter() {
        let call = Expr::call(Routine::named("randSeed"), vec![Expr::int(42)], Repr::Prim(Primitive::F64));
        let first: Vec<Value> = {
            let mut interpreter = it();
            (0..3).map(|_| interpreter.eval(&call).unwrap()).collect()
        };
        let mut interpreter = it();
        let second: Vec<Value> = (0..3).map(|_| interpreter.eval(&call).unwrap()).collect();
        assert_eq!(first, second);
        let bad = Expr::call(Routine::named("randInteger"), vec![Expr::int(0)], I32);
        assert!(interpreter.eval(&bad).is_err());
    }
}
