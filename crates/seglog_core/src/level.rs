//! Severity levels.

use crate::error::LogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log entry.
///
/// Levels are totally ordered from [`Level::Trace`] to [`Level::Panic`]. A
/// logger emits an entry only when the entry's level is at least the
/// logger's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    /// Fine-grained tracing.
    Trace,
    /// Debugging detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected that the program recovered from.
    Warn,
    /// An operation failed.
    Error,
    /// The program cannot continue; the host should exit.
    Fatal,
    /// The program hit a bug; the host should panic.
    Panic,
}

impl Level {
    /// Every level, lowest first.
    pub const ALL: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    /// The rendered upper-case name, e.g. `INFO`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Panic => "PANIC",
        }
    }

    /// The three-letter name, e.g. `INF`.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Level::Trace => "TRA",
            Level::Debug => "DEB",
            Level::Info => "INF",
            Level::Warn => "WRN",
            Level::Error => "ERR",
            Level::Fatal => "FAT",
            Level::Panic => "PAN",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| {
                s.eq_ignore_ascii_case(level.as_str()) || s.eq_ignore_ascii_case(level.short_name())
            })
            .ok_or_else(|| LogError::InvalidLevel(s.to_string()))
    }
}

impl TryFrom<String> for Level {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self, LogError> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_ascii_lowercase()
    }
}
