//! # seglog
//!
//! Leveled, structured logging.
//!
//! This crate provides:
//! - [`Logger`], an immutable logger that derives named, leveled and
//!   field-carrying children sharing one sink
//! - [`Entry`] capture with caller location through `#[track_caller]`
//! - [`TextPrinter`] and [`JsonPrinter`] renderers
//! - Explicit [`Escalation`] for fatal and panic records
//! - A thread-scoped ambient logger in [`context`]
//!
//! Sinks, including the rotating file writer, live in `seglog_sink`.
//!
//! ## Example
//!
//! ```rust
//! use seglog_core::{info, kv, Flags, Level, Logger, LoggerConfig};
//! use seglog_sink::MemorySink;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let config = LoggerConfig::new().level(Level::Info).flags(Flags::NAME);
//! let logger = Logger::with_config(sink.clone(), config).derive("api");
//!
//! logger.debug("not shown");
//! info!(logger.with(kv!["port", 8080]), "listening");
//! assert_eq!(sink.lines(), vec!["[INFO] [api] port=8080 | listening"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod context;
mod entry;
mod error;
mod field;
mod flags;
mod level;
mod logger;
mod macros;
mod printer;

pub use config::LoggerConfig;
pub use entry::{shorten_path, Caller, Entry};
pub use error::{LogError, LogResult};
pub use field::{from_key_values, Field, Value};
pub use flags::Flags;
pub use level::Level;
pub use logger::{Escalation, Logger};
pub use printer::{render_text, JsonPrinter, Printer, TextPrinter};
