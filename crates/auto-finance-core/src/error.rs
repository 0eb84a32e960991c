use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutoFinanceError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AutoFinanceError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AutoFinanceError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AutoFinanceError {
    fn from(e: serde_json::Error) -> Self {
        AutoFinanceError::SerializationError(e.to_string())
    }
}
