pub mod agg_context;
pub use agg_context::*;

pub mod agg_implementor;
pub use agg_implementor::*;

pub mod agg_bundle;
pub use agg_bundle::*;

pub mod functions;
pub use functions::*;

pub mod window;
pub use window::*;
