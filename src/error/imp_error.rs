use thiserror::Error;

/// Compile-time failures raised while turning rex trees into fragments.
///
/// None of these are data errors: they point at a registration defect or at
/// an operand shape the validator should have rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpError {
    /// A function, aggregate or registry binding lacks a required capability.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An implementor was handed an operand-type combination it does not know.
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("no implementor registered for operator {0}")]
    MissingImplementor(String),
    #[error("invalid call to {name}: {reason}")]
    InvalidCall { name: String, reason: String },
}

impl ImpError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn invalid_call(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCall { name: name.into(), reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_piece() {
        let e = ImpError::configuration("User defined function f must implement ImplementableFunction");
        assert_eq!(e.to_string(), "configuration error: User defined function f must implement ImplementableFunction");

        let e = ImpError::invalid_call("EXTRACT", "expected a time unit literal");
        assert_eq!(e.to_string(), "invalid call to EXTRACT: expected a time unit literal");

        let e = ImpError::MissingImplementor("FOO".into());
        assert!(e.to_string().contains("FOO"));
    }
}
