pub mod routine;
pub use routine::*;

pub mod expr;
pub use expr::*;

pub mod statement;
pub use statement::*;

pub mod block_builder;
pub use block_builder::*;
