//! Error types for the seglog logger.

use seglog_sink::SinkError;
use thiserror::Error;

/// Result type for logger operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur while building or delivering log records.
#[derive(Debug, Error)]
pub enum LogError {
    /// The sink rejected the rendered record.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// A structured printer failed to encode the record.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A key/value list was malformed.
    #[error("invalid key/value list: {0}")]
    InvalidKeyValues(String),

    /// A level name could not be parsed.
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// A flag name could not be parsed.
    #[error("invalid flag: {0}")]
    InvalidFlag(String),
}
