//! # seglog sinks
//!
//! Byte sinks for seglog.
//!
//! This crate is the lowest layer of seglog. Sinks are **opaque byte
//! destinations** - they never interpret the records written to them.
//!
//! ## Design Principles
//!
//! - Sinks accept whole rendered records through `write`
//! - No knowledge of levels, fields, or the text layout
//! - Must be `Send + Sync`; one sink is shared by every derived logger
//! - A sink serializes its own writes so records never interleave
//!
//! ## Available Sinks
//!
//! - [`RotatingFileWriter`] - Directory of dated segment files, rotated by
//!   size and calendar day, pruned by age
//! - [`MemorySink`] - For testing and capturing output
//! - [`WriterSink`] - Pass-through to any [`std::io::Write`]
//!
//! ## Example
//!
//! ```rust
//! use seglog_sink::{MemorySink, Sink};
//!
//! let sink = MemorySink::new();
//! sink.write_all(b"hello world\n").unwrap();
//! assert_eq!(sink.lines(), vec!["hello world".to_string()]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod error;
mod housekeeping;
mod memory;
mod rotating;
mod segment;
mod sink;
mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{SinkError, SinkResult};
pub use housekeeping::{expired_segments, remove_segments, Removal};
pub use memory::MemorySink;
pub use rotating::{
    RotatingFileWriter, WriterConfig, DEFAULT_RETENTION_DAYS, DEFAULT_ROTATE_SIZE,
    MIN_ROTATE_SIZE,
};
pub use segment::{
    list_segments, retention_horizon, SegmentName, LATEST_LINK, SEGMENT_SUFFIX,
};
pub use sink::Sink;
pub use writer::WriterSink;
