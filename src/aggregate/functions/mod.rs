pub mod count;
pub use count::*;

pub mod sum;
pub use sum::*;

pub mod min_max;
pub use min_max::*;

pub mod bit_op;
pub use bit_op::*;

pub mod single_value;
pub use single_value::*;

pub mod collect;
pub use collect::*;

pub mod listagg;
pub use listagg::*;

pub mod intersection;
pub use intersection::*;

pub mod grouping;
pub use grouping::*;

pub mod json_agg;
pub use json_agg::*;

pub mod user_defined;
pub use user_defined::*;
