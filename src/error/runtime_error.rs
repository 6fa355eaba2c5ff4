use thiserror::Error;

/// Failures raised by emitted code when it runs.
///
/// The compiler only emits the checks (for example a `Throw` guarded by the
/// SINGLE_VALUE flag); the evaluator is what surfaces them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("more than one value in agg {0}")]
    CardinalityViolation(String),
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("json path error: {0}")]
    JsonPath(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("null value where a non-null value is required: {0}")]
    NullValue(String),
    #[error("invalid argument for {routine}: {reason}")]
    InvalidArgument { routine: String, reason: String },
    #[error("unknown routine {0}")]
    UnknownRoutine(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("numeric overflow in {0}")]
    Overflow(String),
    #[error("unbound variable {0}")]
    UnboundVariable(String),
}

impl RuntimeError {
    pub fn invalid_argument(routine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { routine: routine.into(), reason: reason.into() }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }
}
