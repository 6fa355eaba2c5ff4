pub mod null_policy;
pub mod expr_result;
pub mod call_implementor;
pub mod binary;
pub mod unary;
pub mod method;
pub mod logical;
pub mod predicates;
pub mod cast;
pub mod coalesce;
pub mod datetime;
pub mod value_constructor;
pub mod item;
pub mod system;
pub mod json;
pub mod misc;

pub use null_policy::*;
pub use expr_result::*;
pub use call_implementor::*;
pub use binary::*;
pub use unary::*;
pub use method::*;
pub use logical::*;
pub use predicates::*;
pub use cast::*;
pub use coalesce::*;
pub use datetime::*;
pub use value_constructor::*;
pub use item::*;
pub use system::*;
pub use json::*;
pub use misc::*;
