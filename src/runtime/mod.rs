pub mod value;
pub use value::*;

pub mod data_context;
pub use data_context::*;

pub mod interpreter;
pub use interpreter::*;

pub mod functions;
