//! Error types for sink operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors that can occur while writing to or maintaining a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The log directory could not be created.
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDirectory {
        /// The directory that failed to be created.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The log directory could not be read.
    #[error("failed to list log directory {}: {source}", path.display())]
    ListDirectory {
        /// The directory that failed to be read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A new segment file could not be opened.
    #[error("failed to open segment {}: {source}", path.display())]
    OpenSegment {
        /// The segment path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The writer was closed and accepts no more records.
    #[error("writer is closed")]
    Closed,

    /// A file name does not follow the `<YYYYMMDD>.<sequence>.log` layout.
    #[error("invalid segment name: {0}")]
    InvalidSegmentName(String),

    /// Background segment close, retention or link maintenance failed.
    #[error("housekeeping failed: {0}")]
    Housekeeping(String),
}
