use crate::aggregate::WindowFrame;
use crate::error::ImpError;
use crate::implement::ExprResult;
use crate::linq::{BlockBuilder, Expr, Param};
use crate::types::{RelType, Repr, TypeFactory};

/// Compile-time facts about one aggregate call site.
#[derive(Debug, Clone)]
pub struct AggContext {
    pub return_type: RelType,
    pub parameter_types: Vec<RelType>,
    /// LISTAGG separator when the call gives none. Filled from the
    /// compiler config when left unset.
    pub separator: Option<String>,
    /// Number of grouping sets of the enclosing aggregate.
    pub group_set_count: usize,
    /// Input ordinals of the group keys, in key order.
    pub key_ordinals: Vec<usize>,
    /// Input ordinals the call refers to (GROUPING arguments).
    pub call_args: Vec<usize>,
    pub type_factory: TypeFactory,
}

impl AggContext {
    pub fn new(return_type: RelType, parameter_types: Vec<RelType>) -> Self {
        Self {
            return_type,
            parameter_types,
            separator: None,
            group_set_count: 1,
            key_ordinals: Vec::new(),
            call_args: Vec::new(),
            type_factory: TypeFactory::new(),
        }
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = Some(separator.to_string());
        self
    }

    pub fn with_grouping(mut self, group_set_count: usize, key_ordinals: Vec<usize>, call_args: Vec<usize>) -> Self {
        self.group_set_count = group_set_count;
        self.key_ordinals = key_ordinals;
        self.call_args = call_args;
        self
    }

    pub fn repr_of(&self, ty: &RelType) -> Repr {
        self.type_factory.repr_of(ty)
    }

    pub fn return_repr(&self) -> Repr {
        self.repr_of(&self.return_type)
    }

    pub fn has_nullable_argument(&self) -> bool {
        self.parameter_types.iter().any(|t| t.nullable)
    }
}

pub struct AggResetContext<'a> {
    pub block: &'a mut BlockBuilder,
    pub accumulator: &'a [Param],
}

pub struct AggAddContext<'a> {
    pub block: &'a mut BlockBuilder,
    pub accumulator: &'a [Param],
    pub arguments: &'a [ExprResult],
    pub window: Option<&'a dyn WindowFrame>,
}

pub struct AggResultContext<'a> {
    pub block: &'a mut BlockBuilder,
    pub accumulator: &'a [Param],
    /// Group key fields followed by one "rolled up" indicator per key.
    pub keys: &'a [Expr],
    pub window: Option<&'a dyn WindowFrame>,
}

fn slot(accumulator: &[Param], i: usize) -> Result<&Param, ImpError> {
    accumulator
        .get(i)
        .ok_or_else(|| ImpError::configuration(format!("accumulator has no slot {i}")))
}

fn frame<'a>(window: Option<&'a dyn WindowFrame>) -> Result<&'a dyn WindowFrame, ImpError> {
    window.ok_or_else(|| ImpError::configuration("window function compiled outside a window"))
}

impl AggResetContext<'_> {
    pub fn acc(&self, i: usize) -> Result<&Param, ImpError> {
        slot(self.accumulator, i)
    }
}

impl AggAddContext<'_> {
    pub fn acc(&self, i: usize) -> Result<&Param, ImpError> {
        slot(self.accumulator, i)
    }

    pub fn arg(&self, i: usize) -> Result<&ExprResult, ImpError> {
        self.arguments
            .get(i)
            .ok_or_else(|| ImpError::invalid_call("aggregate", format!("missing argument {i}")))
    }

    pub fn window(&self) -> Result<&dyn WindowFrame, ImpError> {
        frame(self.window)
    }
}

impl AggResultContext<'_> {
    pub fn acc(&self, i: usize) -> Result<&Param, ImpError> {
        slot(self.accumulator, i)
    }

    pub fn window(&self) -> Result<&dyn WindowFrame, ImpError> {
        frame(self.window)
    }
}
