use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a runtime routine that emitted code calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Routine(Cow<'static, str>);

impl Routine {
    pub const fn named(name: &'static str) -> Self {
        Routine(Cow::Borrowed(name))
    }

    pub fn dynamic(name: impl Into<String>) -> Self {
        Routine(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The variant taking untyped operands, used when an operand is of type ANY.
    pub fn any_variant(&self) -> Routine {
        Routine::dynamic(format!("{}Any", self.0))
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
