//! Error types for the power position reporting system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the power position reporting system.
#[derive(Error, Debug)]
pub enum Error {
    /// Trade source failed or returned malformed records.
    #[error("Source unavailable: {0}")]
    Source(String),

    /// A time or date field could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The normalized table violated a schema rule.
    #[error("Validation failure: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error while persisting a report.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse failure category, for callers that need to branch on the kind of
/// failure rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceUnavailable,
    Parse,
    Validation,
    Io,
    Config,
}

impl Error {
    /// Create a source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Error::Source(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Source(_) => ErrorKind::SourceUnavailable,
            // A trade file that is not valid JSON is a malformed source.
            Error::Json(_) => ErrorKind::SourceUnavailable,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Io(_) | Error::Csv(_) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}
