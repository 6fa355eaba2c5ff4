use crate::linq::Expr;
use crate::runtime::Value;
use crate::types::Repr;

/// Compiled outcome of one scalar expression.
///
/// `value` means something only while `is_null` evaluates to false. Both
/// are kept as straight-line fragments rather than one sum-typed value so
/// the consumer can inline them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprResult {
    pub is_null: Expr,
    pub value: Expr,
}

impl ExprResult {
    pub fn new(is_null: Expr, value: Expr) -> Self {
        Self { is_null, value }
    }

    /// A non-null constant.
    pub fn constant(value: Value, repr: Repr) -> Self {
        let is_null = Expr::bool(value.is_null());
        Self { is_null, value: Expr::constant(value, repr) }
    }

    pub fn repr(&self) -> Repr {
        self.value.repr()
    }
}
