//! Benchmark utilities.

use seglog_core::{fields, Field, Flags, Logger, LoggerConfig};
use seglog_sink::Sink;

/// A typical request-scoped field set.
pub fn request_fields() -> Vec<Field> {
    fields! {
        "request_id" => "7f3a9c2e",
        "user" => "tom",
        "status" => 200u16,
        "elapsed_ms" => 12.5,
        "cached" => false,
    }
}

/// A logger over `sink` with `flags` and the request fields attached.
pub fn request_logger(sink: impl Sink + 'static, flags: Flags) -> Logger {
    Logger::with_config(sink, LoggerConfig::new().flags(flags)).with_fields(request_fields())
}

/// A payload of `size` printable bytes.
pub fn payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| b'a' + (i % 26) as u8).collect()
}
