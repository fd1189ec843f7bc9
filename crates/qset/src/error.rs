//! Error types for qset

use thiserror::Error;

/// Result type alias for qset operations
pub type QsResult<T> = Result<T, QsError>;

/// Error types for query-set compilation, execution and projection
#[derive(Debug, Error)]
pub enum QsError {
    /// Fatal configuration problem (unknown dialect, missing result type)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No row matched where one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// More rows matched than the caller allowed
    #[error("Too many rows: expected {expected}, got {got}")]
    TooManyRows { expected: usize, got: usize },

    /// Misuse of a single-pass projector
    #[error("Projection error: {0}")]
    Projection(String),

    /// The connection or cursor collaborator failed
    #[error("Source error: {0}")]
    Source(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A query hook refused to run the statement
    #[error("Query aborted: {0}")]
    Aborted(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl QsError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a too-many-rows error
    pub fn too_many_rows(expected: usize, got: usize) -> Self {
        Self::TooManyRows { expected, got }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a projection error
    pub fn projection(message: impl Into<String>) -> Self {
        Self::Projection(message.into())
    }

    /// Wrap a collaborator failure
    pub fn source_failure(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an ambiguous (too many rows) error
    pub fn is_too_many_rows(&self) -> bool {
        matches!(self, Self::TooManyRows { .. })
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a projection error
    pub fn is_projection(&self) -> bool {
        matches!(self, Self::Projection(_))
    }
}

impl From<serde_json::Error> for QsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for QsError {
    fn from(err: std::io::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
