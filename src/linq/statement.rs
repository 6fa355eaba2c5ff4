use crate::error::RuntimeError;
use crate::linq::{Expr, Param, Routine};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Final variable declaration.
    Declare { param: Param, init: Expr },
    Assign { target: Param, value: Expr },
    /// Mutates the container held by `target` in place.
    Invoke { target: Param, routine: Routine, args: Vec<Expr> },
    If { test: Expr, then: Vec<Statement>, otherwise: Vec<Statement> },
    Throw(RuntimeError),
}

impl Statement {
    pub fn if_then(test: Expr, then: Vec<Statement>) -> Statement {
        Statement::If { test, then, otherwise: Vec::new() }
    }

    /// Visits every expression reachable from this statement.
    pub fn walk_exprs(&self, f: &mut dyn FnMut(&Expr)) {
        match self {
            Statement::Declare { init, .. } => init.walk(f),
            Statement::Assign { value, .. } => value.walk(f),
            Statement::Invoke { args, .. } => args.iter().for_each(|a| a.walk(f)),
            Statement::If { test, then, otherwise } => {
                test.walk(f);
                then.iter().chain(otherwise.iter()).for_each(|s| s.walk_exprs(f));
            }
            Statement::Throw(_) => {}
        }
    }
}

/// A finished statement list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn walk_exprs(&self, f: &mut dyn FnMut(&Expr)) {
        self.statements.iter().for_each(|s| s.walk_exprs(f));
    }
}
