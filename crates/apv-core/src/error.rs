use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApvError {
    #[error("Invalid parameter: {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Undefined leverage factor: {0}")]
    UndefinedLeverageFactor(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ApvError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ApvError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        ApvError::NumericOverflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for ApvError {
    fn from(e: serde_json::Error) -> Self {
        ApvError::SerializationError(e.to_string())
    }
}
