//! Logger configuration.

use crate::flags::Flags;
use crate::level::Level;
use serde::{Deserialize, Serialize};

/// Defaults shared by a logger and everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Threshold of loggers without their own level.
    pub level: Level,

    /// Flags of loggers without their own flags.
    pub flags: Flags,

    /// Prefix removed from captured source paths.
    pub source_root: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Trace,
            flags: Flags::STD,
            source_root: None,
        }
    }
}

impl LoggerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default threshold.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the default flags.
    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the prefix removed from source paths.
    #[must_use]
    pub fn source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = Some(root.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, Level::Trace);
        assert_eq!(config.flags, Flags::STD);
        assert!(config.source_root.is_none());
    }

    #[test]
    fn builder_pattern() {
        let config = LoggerConfig::new()
            .level(Level::Warn)
            .flags(Flags::TIME | Flags::NAME)
            .source_root("/build");

        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.flags, Flags::TIME | Flags::NAME);
        assert_eq!(config.source_root.as_deref(), Some("/build"));
    }

    #[test]
    fn deserialize_partial() {
        let config: LoggerConfig = serde_json::from_str(r#"{"level":"info"}"#).unwrap();
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.flags, Flags::STD);

        let config: LoggerConfig =
            serde_json::from_str(r#"{"flags":"date|utc","source_root":"/src"}"#).unwrap();
        assert_eq!(config.flags, Flags::DATE | Flags::UTC);
        assert_eq!(config.source_root.as_deref(), Some("/src"));
    }
}
