//! Error types for the sequence layer.
//!
//! All public APIs return `SequenceResult<T>` — no panics in library code.

use thiserror::Error;

/// Message prefix shared by every capability-gap error.
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Unified error type for all sequence operations.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The bound backend has no implementation for the operation
    #[error("Method not allowed: '{operation}' is not supported by the {backend} backend")]
    NotSupported {
        operation: &'static str,
        backend: &'static str,
    },

    /// Statement failed inside the execution collaborator
    #[error("SQL execution error: {message}\nSQL: {sql}")]
    Execution { message: String, sql: String },

    /// Result row does not carry the expected column
    #[error("column '{column}' missing from result of: {sql}")]
    MissingColumn { column: String, sql: String },

    /// Type mismatch between expected and actual values
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Invalid arguments
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for all sequence operations.
pub type SequenceResult<T> = Result<T, SequenceError>;

impl SequenceError {
    /// Shorthand used by the capability contract defaults.
    pub fn not_supported(operation: &'static str, backend: &'static str) -> Self {
        SequenceError::NotSupported { operation, backend }
    }

    /// Builds an execution error the way collaborators report them.
    pub fn execution(message: impl Into<String>, sql: impl Into<String>) -> Self {
        SequenceError::Execution {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// `true` for the "table does not exist" family of failures.
    ///
    /// Recognises the MySQL/MariaDB (`Table 'db.t' doesn't exist`), SQLite
    /// (`no such table: t`) and PostgreSQL (`relation "t" does not exist`)
    /// wordings. Only execution errors qualify.
    pub fn is_missing_table(&self) -> bool {
        match self {
            SequenceError::Execution { message, .. } => {
                let lower = message.to_ascii_lowercase();
                (lower.contains("table") && lower.contains("doesn't exist"))
                    || lower.contains("no such table")
                    || (lower.contains("relation") && lower.contains("does not exist"))
            }
            _ => false,
        }
    }

    /// `true` when PostgreSQL refuses `currval` before any `nextval` in the session.
    pub fn is_currval_undefined(&self) -> bool {
        matches!(
            self,
            SequenceError::Execution { message, .. }
                if message.contains("is not yet defined in this session")
        )
    }

    /// `true` for capability gaps.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, SequenceError::NotSupported { .. })
    }
}

// From 구현들
impl From<serde_json::Error> for SequenceError {
    fn from(err: serde_json::Error) -> Self {
        SequenceError::Serialization(err.to_string())
    }
}
