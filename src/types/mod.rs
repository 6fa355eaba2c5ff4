pub mod sql_type_name;
pub use sql_type_name::*;

pub mod rel_type;
pub use rel_type::*;

pub mod repr;
pub use repr::*;

pub mod time_unit;
pub use time_unit::*;

pub mod type_factory;
pub use type_factory::*;
