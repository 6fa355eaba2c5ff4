use std::sync::Arc;

use crate::aggregate::AggImplementor;
use crate::implement::CallImplementor;

/// A scalar or table function supplied from outside the built-in table.
pub trait Function: Send + Sync {
    fn name(&self) -> &str;

    /// The capability that lets the function produce its own code. Functions
    /// without it cannot be compiled.
    fn as_implementable(&self) -> Option<&dyn ImplementableFunction> {
        None
    }
}

pub trait ImplementableFunction {
    fn implementor(&self) -> Arc<dyn CallImplementor>;
}

/// A user-defined aggregate supplied from outside the built-in table.
pub trait AggregateFunction: Send + Sync {
    fn name(&self) -> &str;

    fn as_implementable(&self) -> Option<&dyn ImplementableAggFunction> {
        None
    }
}

pub trait ImplementableAggFunction {
    fn implementor(&self, for_window: bool) -> Box<dyn AggImplementor>;
}

#[derive(Clone)]
pub struct UserDefinedFunction {
    pub function: Arc<dyn Function>,
}

impl UserDefinedFunction {
    pub fn new(function: Arc<dyn Function>) -> Self {
        Self { function }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }
}

#[derive(Clone)]
pub struct UserDefinedAggFunction {
    pub function: Arc<dyn AggregateFunction>,
}

impl UserDefinedAggFunction {
    pub fn new(function: Arc<dyn AggregateFunction>) -> Self {
        Self { function }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }
}
