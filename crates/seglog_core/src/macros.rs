//! Logging macros.
//!
//! The macros take a logger and `format!`-style arguments. Besides the
//! call site they record the calling module path, which the method forms
//! cannot see.

/// Logs at [`Level::Trace`](crate::Level::Trace).
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.__log_in($crate::Level::Trace, ::core::module_path!(), ::core::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.__log_in($crate::Level::Debug, ::core::module_path!(), ::core::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Info`](crate::Level::Info).
///
/// ```rust
/// use seglog_core::{info, Flags, Logger, LoggerConfig};
/// use seglog_sink::MemorySink;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = Logger::with_config(sink.clone(), LoggerConfig::new().flags(Flags::empty()));
/// info!(logger, "listening on {}", 8080);
/// assert_eq!(sink.to_string_lossy(), "[INFO] listening on 8080\n");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.__log_in($crate::Level::Info, ::core::module_path!(), ::core::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.__log_in($crate::Level::Warn, ::core::module_path!(), ::core::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.__log_in($crate::Level::Error, ::core::module_path!(), ::core::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Fatal`](crate::Level::Fatal), evaluating to an
/// [`Escalation`](crate::Escalation).
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.__escalate_in($crate::Level::Fatal, ::core::module_path!(), ::core::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Panic`](crate::Level::Panic), evaluating to an
/// [`Escalation`](crate::Escalation).
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => {
        $logger.__escalate_in($crate::Level::Panic, ::core::module_path!(), ::core::format_args!($($arg)+))
    };
}
