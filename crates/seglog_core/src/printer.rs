//! Record renderers.

use crate::entry::Entry;
use crate::error::LogResult;
use crate::flags::Flags;
use chrono::SecondsFormat;
use parking_lot::Mutex;
use seglog_sink::Sink;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Write;

const INITIAL_BUFFER: usize = 2048;
// Buffers grown past this by one huge record are shrunk back.
const MAX_RETAINED_BUFFER: usize = 64 * 1024;

/// Turns entries into bytes for a sink.
///
/// # Invariants
///
/// - One `print` call issues the bytes of exactly one record
/// - Concurrent `print` calls never interleave records
/// - Rendering itself never fails; only the sink can
pub trait Printer: Send + Sync {
    /// Renders `entry` and writes it to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the sink rejects the record.
    fn print(&self, entry: &Entry<'_>, sink: &dyn Sink) -> LogResult<()>;

    /// Renders `entry` into a string without writing it anywhere.
    ///
    /// The string holds exactly the bytes `print` would write.
    fn render_to_string(&self, entry: &Entry<'_>) -> String;
}

/// The line-oriented text renderer.
///
/// Records look like
///
/// ```text
/// 2024-05-01 12:30:45.123+0200 [INFO] [api] crates/s/s/login.rs(login):17 | user=tom | signed in
/// ```
///
/// Every part before the level is optional and controlled by the entry's
/// flags. The render buffer is reused between records.
#[derive(Debug)]
pub struct TextPrinter {
    buf: Mutex<Vec<u8>>,
}

impl TextPrinter {
    /// Creates a printer with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Mutex::new(Vec::with_capacity(INITIAL_BUFFER)),
        }
    }
}

impl Default for TextPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer for TextPrinter {
    fn print(&self, entry: &Entry<'_>, sink: &dyn Sink) -> LogResult<()> {
        let mut buf = self.buf.lock();
        buf.clear();
        render_text(&mut buf, entry);
        let result = sink.write_all(&buf);
        if buf.capacity() > MAX_RETAINED_BUFFER {
            buf.clear();
            buf.shrink_to(INITIAL_BUFFER);
        }
        Ok(result?)
    }

    fn render_to_string(&self, entry: &Entry<'_>) -> String {
        let mut buf = self.buf.lock();
        buf.clear();
        render_text(&mut buf, entry);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Appends the text form of `entry` to `buf`.
pub fn render_text(buf: &mut Vec<u8>, entry: &Entry<'_>) {
    // Writes into a Vec cannot fail.
    let _ = write_text(buf, entry);
}

fn write_text(buf: &mut Vec<u8>, entry: &Entry<'_>) -> std::io::Result<()> {
    let flags = entry.flags;

    if let Some(time) = &entry.time {
        if flags.contains(Flags::DATE) {
            write!(buf, "{} ", time.format("%Y-%m-%d"))?;
        }
        if flags.has_time() {
            let clock = if flags.contains(Flags::MICROSECONDS) {
                "%H:%M:%S%.6f%z"
            } else if flags.contains(Flags::MILLISECONDS) {
                "%H:%M:%S%.3f%z"
            } else {
                "%H:%M:%S%z"
            };
            write!(buf, "{} ", time.format(clock))?;
        }
    }

    write!(buf, "[{}] ", entry.level.as_str())?;

    if let Some(name) = entry.name {
        write!(buf, "[{name}] ")?;
    }

    match (&entry.file, entry.function) {
        (Some(file), Some(function)) => write!(buf, "{file}({function})")?,
        (Some(file), None) => buf.extend_from_slice(file.as_bytes()),
        (None, Some(function)) => buf.extend_from_slice(function.as_bytes()),
        (None, None) => {}
    }
    if entry.file.is_some() || entry.function.is_some() {
        write!(buf, ":{} | ", entry.line.unwrap_or(0))?;
    }

    for field in entry.fields {
        write!(buf, "{}={} ", field.key, field.value)?;
    }
    if !entry.fields.is_empty() {
        buf.extend_from_slice(b"| ");
    }

    buf.extend_from_slice(entry.message.as_bytes());
    if !entry.message.ends_with('\n') {
        buf.push(b'\n');
    }
    Ok(())
}

/// A renderer emitting one JSON object per line.
///
/// Keys are `time`, `level`, `logger`, `file`, `line`, `function`, then one
/// key per field and finally `msg`. Absent parts are omitted. When a field
/// key repeats, only the last value is written.
#[derive(Debug)]
pub struct JsonPrinter {
    buf: Mutex<Vec<u8>>,
}

impl JsonPrinter {
    /// Creates a printer with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Mutex::new(Vec::with_capacity(INITIAL_BUFFER)),
        }
    }
}

impl Default for JsonPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer for JsonPrinter {
    fn print(&self, entry: &Entry<'_>, sink: &dyn Sink) -> LogResult<()> {
        let mut buf = self.buf.lock();
        buf.clear();
        serde_json::to_writer(&mut *buf, &JsonRecord(entry))?;
        buf.push(b'\n');
        sink.write_all(&buf)?;
        Ok(())
    }

    fn render_to_string(&self, entry: &Entry<'_>) -> String {
        // Every part of a record is serializable.
        let mut line = serde_json::to_string(&JsonRecord(entry)).unwrap_or_default();
        line.push('\n');
        line
    }
}

struct JsonRecord<'e, 'a>(&'e Entry<'a>);

impl Serialize for JsonRecord<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entry = self.0;
        let mut map = serializer.serialize_map(None)?;

        if let Some(time) = &entry.time {
            let precision = if entry.flags.contains(Flags::MICROSECONDS) {
                SecondsFormat::Micros
            } else if entry.flags.contains(Flags::MILLISECONDS) {
                SecondsFormat::Millis
            } else {
                SecondsFormat::Secs
            };
            map.serialize_entry("time", &time.to_rfc3339_opts(precision, false))?;
        }
        map.serialize_entry("level", &entry.level)?;
        if let Some(name) = entry.name {
            map.serialize_entry("logger", name)?;
        }
        if let Some(file) = &entry.file {
            map.serialize_entry("file", file)?;
        }
        if let Some(line) = entry.line {
            map.serialize_entry("line", &line)?;
        }
        if let Some(function) = entry.function {
            map.serialize_entry("function", function)?;
        }

        for (i, field) in entry.fields.iter().enumerate() {
            let shadowed = entry.fields[i + 1..].iter().any(|later| later.key == field.key);
            if !shadowed {
                map.serialize_entry(&field.key, &field.value)?;
            }
        }

        map.serialize_entry("msg", entry.message.trim_end_matches('\n'))?;
        map.end()
    }
}
