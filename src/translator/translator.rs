use std::collections::HashMap;

use tracing::trace;

use crate::error::ImpError;
use crate::implement::ExprResult;
use crate::linq::{Block, BlockBuilder, Expr, Param, Routine};
use crate::registry::ImpTable;
use crate::rex::{RexCall, RexLiteral, RexNode, Symbol};
use crate::runtime::Value;
use crate::translator::CompilerConfig;
use crate::types::{RelType, Repr, TypeFactory};

/// Per-compilation driver: walks a rex tree, asks the registry for an
/// implementor per call and collects the emitted statements.
///
/// A translator is owned by one compilation and is not shared.
pub struct Translator<'t> {
    table: &'t ImpTable,
    type_factory: TypeFactory,
    block: BlockBuilder,
    root: Param,
    inputs: Vec<ExprResult>,
    locals: Vec<RexNode>,
    local_results: HashMap<usize, ExprResult>,
}

impl<'t> Translator<'t> {
    pub fn new(table: &'t ImpTable) -> Self {
        let mut block = BlockBuilder::new();
        let root = block.new_param("root", Repr::Object);
        Self {
            table,
            type_factory: TypeFactory::new(),
            block,
            root,
            inputs: Vec::new(),
            locals: Vec::new(),
            local_results: HashMap::new(),
        }
    }

    /// Shared sub-expressions addressed by [`RexNode::LocalRef`].
    pub fn with_locals(mut self, locals: Vec<RexNode>) -> Self {
        self.locals = locals;
        self
    }

    /// Registers the next input field. Its slot is named after `name` and
    /// bound by whoever runs the block.
    pub fn add_input(&mut self, name: &str, ty: &RelType) -> Param {
        let repr = self.type_factory.repr_of(ty);
        let param = self.block.new_param(name, repr);
        let value = param.expr();
        let is_null = self.check_null(&value);
        self.inputs.push(ExprResult::new(is_null, value));
        param
    }

    pub fn table(&self) -> &'t ImpTable {
        self.table
    }

    pub fn config(&self) -> &'t CompilerConfig {
        self.table.config()
    }

    pub fn type_factory(&self) -> &TypeFactory {
        &self.type_factory
    }

    pub fn repr_of(&self, ty: &RelType) -> Repr {
        self.type_factory.repr_of(ty)
    }

    pub fn block(&self) -> &BlockBuilder {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut BlockBuilder {
        &mut self.block
    }

    /// The implicit evaluation-context parameter system functions read.
    pub fn root(&self) -> Expr {
        self.root.expr()
    }

    pub fn into_block(self) -> Block {
        self.block.to_block()
    }

    pub fn translate(&mut self, node: &RexNode) -> Result<ExprResult, ImpError> {
        match node {
            RexNode::Literal(lit) => Ok(self.translate_literal(lit)),
            RexNode::InputRef { index, .. } => self
                .inputs
                .get(*index)
                .cloned()
                .ok_or_else(|| ImpError::invalid_call("input", format!("no input field {index}"))),
            RexNode::LocalRef { index, .. } => {
                if let Some(done) = self.local_results.get(index) {
                    return Ok(done.clone());
                }
                let local = self
                    .locals
                    .get(*index)
                    .cloned()
                    .ok_or_else(|| ImpError::invalid_call("local", format!("no local expression {index}")))?;
                let result = self.translate(&local)?;
                self.local_results.insert(*index, result.clone());
                Ok(result)
            }
            RexNode::Call(call) => self.translate_call(call),
        }
    }

    pub fn translate_list(&mut self, nodes: &[RexNode]) -> Result<Vec<ExprResult>, ImpError> {
        nodes.iter().map(|n| self.translate(n)).collect()
    }

    pub fn translate_call(&mut self, call: &RexCall) -> Result<ExprResult, ImpError> {
        let args = self.translate_list(&call.operands)?;
        let implementor = self
            .table
            .get(&call.op)?
            .ok_or_else(|| ImpError::MissingImplementor(call.op.name()))?;
        trace!(operator = %call.op.name(), implementor = implementor.variable_name(), "implementing call");
        implementor.implement(self, call, &args)
    }

    pub fn translate_literal(&self, literal: &RexLiteral) -> ExprResult {
        let value = self.translate_literal_value(&literal.value, &literal.ty);
        ExprResult::new(Expr::bool(literal.value.is_null()), value)
    }

    /// A literal as a constant of `ty`'s representation.
    pub fn translate_literal_value(&self, value: &Value, ty: &RelType) -> Expr {
        let repr = self.repr_of(ty);
        if value.is_null() {
            return Expr::null(repr);
        }
        match value.convert_to(&repr) {
            Ok(v) => Expr::constant(v, repr),
            Err(_) => Expr::constant(value.clone(), repr),
        }
    }

    /// Runtime conversion of a non-null `operand` from `source` to `target`.
    pub fn translate_cast(&self, source: &RelType, target: &RelType, operand: Expr) -> Expr {
        let target_repr = self.repr_of(target);
        if source.name == target.name || (source.name.is_numeric() && target.name.is_numeric()) {
            return Expr::convert(operand, target_repr);
        }
        let converted = Expr::call(
            Routine::named("cast"),
            vec![
                Expr::box_(operand),
                Expr::constant(Value::Symbol(Symbol::TypeName(source.name)), Repr::Symbol),
                Expr::constant(Value::Symbol(Symbol::TypeName(target.name)), Repr::Symbol),
            ],
            target_repr.boxed(),
        );
        Expr::convert(converted, target_repr)
    }

    pub fn check_null(&self, e: &Expr) -> Expr {
        Expr::is_null(e.clone())
    }

    pub fn check_not_null(&self, e: &Expr) -> Expr {
        Expr::is_not_null(e.clone())
    }

    /// Follows local references until a non-reference node is reached.
    pub fn deref(&self, node: &RexNode) -> RexNode {
        let mut current = node.clone();
        while let RexNode::LocalRef { index, .. } = current {
            match self.locals.get(index) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        current
    }

    pub fn is_nullable(&self, node: &RexNode) -> bool {
        node.ty().nullable
    }

    /// The symbol carried by a constant operand, if it is one.
    pub fn literal_symbol(&self, e: &Expr) -> Option<Symbol> {
        match e.as_constant() {
            Some(Value::Symbol(s)) => Some(*s),
            _ => None,
        }
    }
}
