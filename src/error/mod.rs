pub mod imp_error;
pub use imp_error::*;

pub mod runtime_error;
pub use runtime_error::*;
