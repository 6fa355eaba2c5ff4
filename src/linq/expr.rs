use crate::linq::Routine;
use crate::runtime::Value;
use crate::types::{Primitive, Repr};

/// A named, typed slot: a declared variable, an input field or an
/// accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub repr: Repr,
}

impl Param {
    pub fn new(name: impl Into<String>, repr: Repr) -> Self {
        Self { name: name.into(), repr }
    }

    pub fn expr(&self) -> Expr {
        Expr::Param(self.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
}

impl BinaryOp {
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::LessThan | BinaryOp::LessThanOrEqual | BinaryOp::GreaterThan | BinaryOp::GreaterThanOrEqual
        )
    }

    pub fn is_comparison(self) -> bool {
        self.is_equality() || self.is_ordering()
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::AndAlso | BinaryOp::OrElse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    UnaryPlus,
    Not,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    List,
    Map,
}

/// A side-effect-free code fragment. Every node knows its representation.
///
/// The constructors fold what they can (constant tests, boxing pairs,
/// trivial boolean chains), so building the same expression twice gives
/// structurally equal trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant { value: Value, repr: Repr },
    Param(Param),
    Call { routine: Routine, args: Vec<Expr>, repr: Repr },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr>, repr: Repr },
    Unary { op: UnaryOp, operand: Box<Expr>, repr: Repr },
    Condition { test: Box<Expr>, if_true: Box<Expr>, if_false: Box<Expr>, repr: Repr },
    Convert { operand: Box<Expr>, repr: Repr },
    /// A fresh, empty mutable container.
    New(Container),
}

const BOOL: Repr = Repr::Prim(Primitive::Bool);

impl Expr {
    pub fn constant(value: impl Into<Value>, repr: Repr) -> Expr {
        Expr::Constant { value: value.into(), repr }
    }

    pub fn bool(b: bool) -> Expr {
        Expr::constant(b, BOOL)
    }

    pub fn int(i: i32) -> Expr {
        Expr::constant(i, Repr::Prim(Primitive::I32))
    }

    pub fn long(i: i64) -> Expr {
        Expr::constant(i, Repr::Prim(Primitive::I64))
    }

    pub fn string(s: impl Into<String>) -> Expr {
        Expr::constant(Value::Str(s.into()), Repr::String)
    }

    pub fn null(repr: Repr) -> Expr {
        Expr::Constant { value: Value::Null, repr: repr.boxed() }
    }

    /// Zero for primitive slots, null for everything else.
    pub fn default_of(repr: &Repr) -> Expr {
        match repr {
            Repr::Prim(p) => Expr::constant(p.default_value(), *repr),
            other => Expr::null(*other),
        }
    }

    pub fn call(routine: Routine, args: Vec<Expr>, repr: Repr) -> Expr {
        Expr::Call { routine, args, repr }
    }

    pub fn repr(&self) -> Repr {
        match self {
            Expr::Constant { repr, .. }
            | Expr::Call { repr, .. }
            | Expr::Binary { repr, .. }
            | Expr::Unary { repr, .. }
            | Expr::Condition { repr, .. }
            | Expr::Convert { repr, .. } => *repr,
            Expr::Param(p) => p.repr,
            Expr::New(Container::List) => Repr::List,
            Expr::New(Container::Map) => Repr::Map,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_constant_bool(&self, b: bool) -> bool {
        matches!(self, Expr::Constant { value: Value::Bool(v), .. } if *v == b)
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self, Expr::Constant { value: Value::Null, .. })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        if op == BinaryOp::AndAlso {
            if left.is_constant_bool(false) || right.is_constant_bool(true) {
                return left;
            }
            if left.is_constant_bool(true) || right.is_constant_bool(false) {
                return right;
            }
        }
        if op == BinaryOp::OrElse {
            if left.is_constant_bool(true) || right.is_constant_bool(false) {
                return left;
            }
            if left.is_constant_bool(false) || right.is_constant_bool(true) {
                return right;
            }
        }
        let repr = if op.is_comparison() || op.is_logical() {
            BOOL
        } else {
            arithmetic_repr(left.repr(), right.repr())
        };
        Expr::Binary { op, left: Box::new(left), right: Box::new(right), repr }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        match op {
            UnaryOp::Not => {
                if let Some(Value::Bool(b)) = operand.as_constant() {
                    return Expr::bool(!b);
                }
                match operand {
                    Expr::Unary { op: UnaryOp::Not, operand: inner, .. } => *inner,
                    other => Expr::Unary { op, operand: Box::new(other), repr: BOOL },
                }
            }
            UnaryOp::IsNull | UnaryOp::IsNotNull => {
                let null = if operand.repr().is_primitive() {
                    Some(false)
                } else {
                    operand.as_constant().map(Value::is_null)
                };
                match null {
                    Some(n) => Expr::bool(if op == UnaryOp::IsNull { n } else { !n }),
                    None => Expr::Unary { op, operand: Box::new(operand), repr: BOOL },
                }
            }
            UnaryOp::Negate | UnaryOp::UnaryPlus => {
                let repr = match operand.repr() {
                    Repr::Prim(p) | Repr::Boxed(p) => Repr::Prim(Primitive::promote(p, Primitive::I32)),
                    other => other,
                };
                Expr::Unary { op, operand: Box::new(operand), repr }
            }
        }
    }

    pub fn not(e: Expr) -> Expr {
        Expr::unary(UnaryOp::Not, e)
    }

    pub fn is_null(e: Expr) -> Expr {
        Expr::unary(UnaryOp::IsNull, e)
    }

    pub fn is_not_null(e: Expr) -> Expr {
        Expr::unary(UnaryOp::IsNotNull, e)
    }

    pub fn condition(test: Expr, if_true: Expr, if_false: Expr) -> Expr {
        if let Some(Value::Bool(b)) = test.as_constant() {
            return if *b { if_true } else { if_false };
        }
        if if_true == if_false {
            return if_true;
        }
        if if_true.repr() == BOOL && if_false.repr() == BOOL {
            if if_true.is_constant_bool(true) && if_false.is_constant_bool(false) {
                return test;
            }
            if if_true.is_constant_bool(false) && if_false.is_constant_bool(true) {
                return Expr::not(test);
            }
        }
        let repr = condition_repr(&if_true, &if_false);
        Expr::Condition { test: Box::new(test), if_true: Box::new(if_true), if_false: Box::new(if_false), repr }
    }

    /// Changes representation. Constants are converted on the spot and
    /// box/unbox pairs cancel.
    pub fn convert(e: Expr, repr: Repr) -> Expr {
        if e.repr() == repr {
            return e;
        }
        if let Expr::Constant { value, .. } = &e {
            if let Ok(v) = value.convert_to(&repr) {
                return Expr::Constant { value: v, repr };
            }
        }
        if let Expr::Convert { operand, repr: middle } = &e {
            if operand.repr() == repr && middle.unboxed() == repr.unboxed() {
                return (**operand).clone();
            }
        }
        Expr::Convert { operand: Box::new(e), repr }
    }

    pub fn unbox(e: Expr) -> Expr {
        match e.repr() {
            Repr::Boxed(p) => Expr::convert(e, Repr::Prim(p)),
            _ => e,
        }
    }

    pub fn box_(e: Expr) -> Expr {
        match e.repr() {
            Repr::Prim(p) => Expr::convert(e, Repr::Boxed(p)),
            _ => e,
        }
    }

    /// Conjunction; empty is `true`.
    pub fn fold_and(items: Vec<Expr>) -> Expr {
        items.into_iter().fold(Expr::bool(true), |acc, e| Expr::binary(BinaryOp::AndAlso, acc, e))
    }

    /// Disjunction; empty is `false`.
    pub fn fold_or(items: Vec<Expr>) -> Expr {
        items.into_iter().fold(Expr::bool(false), |acc, e| Expr::binary(BinaryOp::OrElse, acc, e))
    }

    /// Visits this node and every node below it.
    pub fn walk(&self, f: &mut dyn FnMut(&Expr)) {
        f(self);
        match self {
            Expr::Constant { .. } | Expr::Param(_) | Expr::New(_) => {}
            Expr::Call { args, .. } => args.iter().for_each(|a| a.walk(f)),
            Expr::Binary { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Expr::Unary { operand, .. } | Expr::Convert { operand, .. } => operand.walk(f),
            Expr::Condition { test, if_true, if_false, .. } => {
                test.walk(f);
                if_true.walk(f);
                if_false.walk(f);
            }
        }
    }
}

fn arithmetic_repr(a: Repr, b: Repr) -> Repr {
    if a == Repr::Decimal || b == Repr::Decimal {
        return Repr::Decimal;
    }
    match (a.primitive(), b.primitive()) {
        (Some(x), Some(y)) => Repr::Prim(Primitive::promote(x, y)),
        _ => Repr::Object,
    }
}

fn condition_repr(a: &Expr, b: &Expr) -> Repr {
    let (ra, rb) = (a.repr(), b.repr());
    if ra == rb {
        return ra;
    }
    if a.is_null_constant() {
        return rb.boxed();
    }
    if b.is_null_constant() {
        return ra.boxed();
    }
    match (ra.primitive(), rb.primitive()) {
        (Some(x), Some(y)) if x == y => Repr::Boxed(x),
        _ => Repr::Object,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str, repr: Repr) -> Expr {
        Param::new(name, repr).expr()
    }

    #[test]
    fn folding_drops_constant_operands() {
        let x = p("x", BOOL);
        assert_eq!(Expr::fold_or(vec![]), Expr::bool(false));
        assert_eq!(Expr::fold_and(vec![]), Expr::bool(true));
        assert_eq!(Expr::fold_or(vec![Expr::bool(false), x.clone()]), x);
        assert_eq!(Expr::fold_or(vec![x.clone(), Expr::bool(true)]), Expr::bool(true));
        assert_eq!(Expr::fold_and(vec![x.clone(), Expr::bool(true)]), x);
        assert_eq!(Expr::fold_and(vec![Expr::bool(false), p("y", BOOL)]), Expr::bool(false));
    }

    #[test]
    fn null_tests_fold_on_primitives() {
        assert_eq!(Expr::is_null(p("x", Repr::Prim(Primitive::I32))), Expr::bool(false));
        assert_eq!(Expr::is_not_null(Expr::null(Repr::String)), Expr::bool(false));
        assert!(matches!(Expr::is_null(p("s", Repr::String)), Expr::Unary { op: UnaryOp::IsNull, .. }));
    }

    #[test]
    fn condition_folds_constant_tests_and_bool_identity() {
        let a = p("a", Repr::Prim(Primitive::I32));
        let b = p("b", Repr::Prim(Primitive::I32));
        assert_eq!(Expr::condition(Expr::bool(false), a.clone(), b.clone()), b);
        let t = p("t", BOOL);
        assert_eq!(Expr::condition(t.clone(), Expr::bool(true), Expr::bool(false)), t);
        let mixed = Expr::condition(t, Expr::null(Repr::Prim(Primitive::I32)), a);
        assert_eq!(mixed.repr(), Repr::Boxed(Primitive::I32));
    }

    #[test]
    fn convert_cancels_box_unbox_pairs() {
        let x = p("x", Repr::Prim(Primitive::I64));
        let boxed = Expr::box_(x.clone());
        assert_eq!(boxed.repr(), Repr::Boxed(Primitive::I64));
        assert_eq!(Expr::unbox(boxed), x);
        assert_eq!(Expr::convert(Expr::int(3), Repr::Prim(Primitive::I64)), Expr::long(3));
    }

    #[test]
    fn negating_a_narrow_integer_promotes() {
        let x = p("x", Repr::Prim(Primitive::I8));
        assert_eq!(Expr::unary(UnaryOp::Negate, x).repr(), Repr::Prim(Primitive::I32));
    }

    #[test]
    fn arithmetic_repr_prefers_decimal() {
        let d = p("d", Repr::Decimal);
        let i = p("i", Repr::Prim(Primitive::I32));
        assert_eq!(Expr::binary(BinaryOp::Add, d, i.clone()).repr(), Repr::Decimal);
        assert_eq!(Expr::binary(BinaryOp::Add, i.clone(), Expr::long(1)).repr(), Repr::Prim(Primitive::I64));
        assert_eq!(Expr::binary(BinaryOp::LessThan, i, Expr::int(1)).repr(), BOOL);
    }
}
