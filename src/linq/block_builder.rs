use std::collections::HashSet;

use crate::linq::{Block, Expr, Param, Statement};
use crate::types::Repr;

/// Accumulates statements and hands out unique variable names.
///
/// Nested builders see the names already taken by their parent and give
/// their own back on [`BlockBuilder::exit`], so a name is never declared
/// twice anywhere in one compilation.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    statements: Vec<Statement>,
    names: HashSet<String>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `suggestion` if free, otherwise `suggestion0`, `suggestion1`, ...
    pub fn new_name(&mut self, suggestion: &str) -> String {
        let name = if self.names.contains(suggestion) {
            (0..)
                .map(|i| format!("{suggestion}{i}"))
                .find(|candidate| !self.names.contains(candidate))
                .unwrap_or_else(|| suggestion.to_string())
        } else {
            suggestion.to_string()
        };
        self.names.insert(name.clone());
        name
    }

    /// Reserves a name for a slot the caller stores itself.
    pub fn new_param(&mut self, suggestion: &str, repr: Repr) -> Param {
        Param::new(self.new_name(suggestion), repr)
    }

    /// Declares a final variable and returns a reference to it.
    pub fn declare(&mut self, suggestion: &str, init: Expr) -> Expr {
        let param = Param::new(self.new_name(suggestion), init.repr());
        self.statements.push(Statement::Declare { param: param.clone(), init });
        param.expr()
    }

    /// Like [`declare`](Self::declare), but constants and plain variable
    /// references are returned as they are.
    pub fn append(&mut self, suggestion: &str, init: Expr) -> Expr {
        match init {
            Expr::Constant { .. } | Expr::Param(_) => init,
            other => self.declare(suggestion, other),
        }
    }

    pub fn add(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn assign(&mut self, target: &Param, value: Expr) {
        self.statements.push(Statement::Assign { target: target.clone(), value });
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// A child builder for a branch body.
    pub fn nest(&self) -> BlockBuilder {
        BlockBuilder { statements: Vec::new(), names: self.names.clone() }
    }

    /// Takes back the names used by `child` and returns its statements.
    pub fn exit(&mut self, child: BlockBuilder) -> Vec<Statement> {
        self.names.extend(child.names);
        child.statements
    }

    pub fn to_block(self) -> Block {
        Block::new(self.statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn names_are_unique_across_nested_blocks() {
        let mut b = BlockBuilder::new();
        assert_eq!(b.new_name("x"), "x");
        assert_eq!(b.new_name("x"), "x0");
        let mut child = b.nest();
        assert_eq!(child.new_name("x"), "x1");
        assert_eq!(child.new_name("y"), "y");
        b.exit(child);
        assert_eq!(b.new_name("y"), "y0");
    }

    #[test]
    fn append_inlines_constants_and_params() {
        let mut b = BlockBuilder::new();
        let c = b.append("c", Expr::int(1));
        assert_eq!(c, Expr::int(1));
        assert!(b.is_empty());

        let sum = Expr::binary(crate::linq::BinaryOp::Add, c, Expr::int(2));
        let v = b.append("v", sum);
        assert_eq!(v, Param::new("v", Repr::Prim(Primitive::I32)).expr());
        assert_eq!(b.statements().len(), 1);
    }
}
