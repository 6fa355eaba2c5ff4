pub mod symbol;
pub use symbol::*;

pub mod operator;
pub use operator::*;

pub mod agg_function;
pub use agg_function::*;

pub mod user_defined;
pub use user_defined::*;

pub mod rex_node;
pub use rex_node::*;
