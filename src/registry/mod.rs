pub mod imp_table;
pub use imp_table::*;
