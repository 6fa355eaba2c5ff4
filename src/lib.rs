pub mod error;
pub use error::{ImpError, RuntimeError};

pub mod types;
pub use types::{RelType, Repr, SqlTypeName};

pub mod rex;
pub use rex::{AggFunction, OperatorKind, RexNode, SqlOperator};

pub mod linq;

pub mod implement;

pub mod aggregate;
pub use aggregate::AggBundle;

pub mod registry;
pub use registry::ImpTable;

pub mod translator;
pub use translator::{CompilerConfig, Translator};

pub mod runtime;
pub use runtime::{DataContext, Interpreter, Value};
