use crate::rex::{OperatorKind, SqlOperator, Symbol};
use crate::runtime::Value;
use crate::types::{RelType, SqlTypeName};

/// A typed scalar expression tree, as handed over by the validator.
#[derive(Debug, Clone)]
pub enum RexNode {
    Literal(RexLiteral),
    /// Field of the current input row.
    InputRef { index: usize, ty: RelType },
    /// Reference to a shared sub-expression of the enclosing program.
    LocalRef { index: usize, ty: RelType },
    Call(RexCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RexLiteral {
    pub value: Value,
    pub ty: RelType,
}

#[derive(Debug, Clone)]
pub struct RexCall {
    pub op: SqlOperator,
    pub ty: RelType,
    pub operands: Vec<RexNode>,
}

impl RexNode {
    pub fn ty(&self) -> &RelType {
        match self {
            RexNode::Literal(l) => &l.ty,
            RexNode::InputRef { ty, .. } | RexNode::LocalRef { ty, .. } => ty,
            RexNode::Call(c) => &c.ty,
        }
    }

    pub fn literal(value: impl Into<Value>, ty: RelType) -> RexNode {
        RexNode::Literal(RexLiteral { value: value.into(), ty })
    }

    pub fn null_literal(ty: RelType) -> RexNode {
        RexNode::Literal(RexLiteral { value: Value::Null, ty: ty.with_nullability(true) })
    }

    pub fn symbol(symbol: Symbol) -> RexNode {
        RexNode::Literal(RexLiteral { value: Value::Symbol(symbol), ty: RelType::new(SqlTypeName::Symbol) })
    }

    pub fn input(index: usize, ty: RelType) -> RexNode {
        RexNode::InputRef { index, ty }
    }

    pub fn call(op: impl Into<SqlOperator>, ty: RelType, operands: Vec<RexNode>) -> RexNode {
        RexNode::Call(RexCall { op: op.into(), ty, operands })
    }

    pub fn as_literal(&self) -> Option<&RexLiteral> {
        match self {
            RexNode::Literal(l) => Some(l),
            _ => None,
        }
    }
}

impl RexCall {
    pub fn kind(&self) -> Option<OperatorKind> {
        self.op.kind()
    }

    pub fn operand_types(&self) -> Vec<RelType> {
        self.operands.iter().map(|o| o.ty().clone()).collect()
    }
}
