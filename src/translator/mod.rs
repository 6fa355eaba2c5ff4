pub mod config;
pub use config::*;

pub mod translator;
pub use translator::*;
