//! Error types for PredictBuddy
//!
//! Every failure in the engine is a `PredictError`. Errors are classified
//! into three kinds that drive retry and logging decisions at the service
//! boundary.

use thiserror::Error;

/// Main error type for the prediction engine
#[derive(Error, Debug)]
pub enum PredictError {
    /// Malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Too few samples for the requested analysis or model
    #[error("Insufficient data for {operation}: need at least {required} points, got {actual}")]
    InsufficientData {
        operation: String,
        required: usize,
        actual: usize,
    },

    /// Collaborator failures (persistence, metrics) that may succeed on retry
    #[error("Transient failure in {service}: {message}")]
    Transient { service: String, message: String },

    /// Lifecycle state machine errors
    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("Engine error: {0}")]
    Generic(String),
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fails fast, never retried
    Validation,
    /// Retried by the recovery policy
    Transient,
    /// Logged and rethrown unchanged
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transient => "transient",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl PredictError {
    /// Shorthand for a transient collaborator failure
    pub fn transient(service: impl Into<String>, message: impl ToString) -> Self {
        PredictError::Transient {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Shorthand for an insufficient-data validation failure
    pub fn insufficient(operation: impl Into<String>, required: usize, actual: usize) -> Self {
        PredictError::InsufficientData {
            operation: operation.into(),
            required,
            actual,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::Validation(_)
            | PredictError::InsufficientData { .. }
            | PredictError::Config(_) => ErrorKind::Validation,
            PredictError::Transient { .. } => ErrorKind::Transient,
            PredictError::InvalidTransition { .. }
            | PredictError::Serialization(_)
            | PredictError::Io(_)
            | PredictError::Generic(_) => ErrorKind::Unknown,
        }
    }

    /// Whether a recovery policy may retry this error
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PredictError>;

/// Convert anyhow errors to PredictError
impl From<anyhow::Error> for PredictError {
    fn from(err: anyhow::Error) -> Self {
        PredictError::Generic(err.to_string())
    }
}
