use crate::linq::{BinaryOp, BlockBuilder, Expr, Param, Routine};
use crate::types::{Primitive, Repr};

/// Position context a windowed aggregate can read while folding a row.
pub trait WindowFrame {
    /// Index of the current row within its partition.
    fn index(&self) -> Expr;

    fn start_index(&self) -> Expr;

    fn end_index(&self) -> Expr;

    /// Rows between start and end, inclusive.
    fn frame_row_count(&self) -> Expr {
        let span = Expr::binary(BinaryOp::Subtract, self.end_index(), self.start_index());
        Expr::binary(BinaryOp::Add, span, Expr::long(1))
    }

    /// Negative, zero or positive as the ordering key of row `a` sorts
    /// before, with or after that of row `b`.
    fn compare_rows(&self, a: Expr, b: Expr) -> Expr;
}

/// A frame whose positions live in caller-bound slots and whose row
/// comparator is a caller-registered routine.
#[derive(Debug, Clone)]
pub struct ParamWindowFrame {
    pub index: Param,
    pub start: Param,
    pub end: Param,
    pub comparator: Routine,
}

impl ParamWindowFrame {
    pub const COMPARATOR: &'static str = "compareRows";

    pub fn new(names: &mut BlockBuilder) -> Self {
        let long = Repr::Prim(Primitive::I64);
        Self {
            index: names.new_param("index", long),
            start: names.new_param("start_index", long),
            end: names.new_param("end_index", long),
            comparator: Routine::named(Self::COMPARATOR),
        }
    }
}

impl WindowFrame for ParamWindowFrame {
    fn index(&self) -> Expr {
        self.index.expr()
    }

    fn start_index(&self) -> Expr {
        self.start.expr()
    }

    fn end_index(&self) -> Expr {
        self.end.expr()
    }

    fn compare_rows(&self, a: Expr, b: Expr) -> Expr {
        Expr::call(self.comparator.clone(), vec![a, b], Repr::Prim(Primitive::I32))
    }
}
