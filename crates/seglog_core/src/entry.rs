//! Log entries and caller capture.

use crate::field::Field;
use crate::flags::Flags;
use crate::level::Level;
use chrono::{DateTime, FixedOffset, Local, Utc};
use std::borrow::Cow;
use std::panic::Location;

/// The source location of a log call.
///
/// Logging methods are `#[track_caller]`, so [`Caller::here`] inside them
/// reports the user's call site. The logging macros also attach the
/// calling module path as the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Source file as reported by the compiler.
    pub file: &'static str,
    /// Line number, 1-based.
    pub line: u32,
    /// Module path of the caller, when known.
    pub function: Option<&'static str>,
}

impl Caller {
    /// The location of whoever called the enclosing `#[track_caller]` chain.
    #[track_caller]
    #[must_use]
    pub fn here() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            function: None,
        }
    }

    /// An explicit location.
    #[must_use]
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self {
            file,
            line,
            function: None,
        }
    }

    /// Attaches a function or module path.
    #[must_use]
    pub const fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }

    /// Removes `root` from the front of the file path.
    #[must_use]
    pub fn strip_root(mut self, root: &str) -> Self {
        if root.is_empty() {
            return self;
        }
        if let Some(rest) = self.file.strip_prefix(root) {
            self.file = rest.trim_start_matches(['/', '\\']);
        }
        self
    }
}

/// One log occurrence, borrowed from the logger that produced it.
///
/// An entry is built per call and handed to a [`crate::Printer`]. Only the
/// parts enabled by `flags` are populated.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    /// Severity.
    pub level: Level,
    /// Capture time, when a date or time flag is set.
    pub time: Option<DateTime<FixedOffset>>,
    /// Source file, when a file flag is set.
    pub file: Option<Cow<'static, str>>,
    /// Source line, whenever a file or function is present.
    pub line: Option<u32>,
    /// Calling function, when [`Flags::FUNCTION`] is set.
    pub function: Option<&'static str>,
    /// Logger name, when [`Flags::NAME`] is set and the name is not empty.
    pub name: Option<&'a str>,
    /// Fields of the logger, in insertion order.
    pub fields: &'a [Field],
    /// The message.
    pub message: &'a str,
    /// Flags in effect when the entry was captured.
    pub flags: Flags,
}

impl<'a> Entry<'a> {
    /// Captures an entry for the current instant.
    #[must_use]
    pub fn capture(
        flags: Flags,
        level: Level,
        name: &'a str,
        fields: &'a [Field],
        message: &'a str,
        caller: Option<Caller>,
    ) -> Self {
        let mut entry = Entry {
            level,
            time: flags.captures_time().then(|| now(flags)),
            file: None,
            line: None,
            function: None,
            name: (flags.contains(Flags::NAME) && !name.is_empty()).then_some(name),
            fields,
            message,
            flags,
        };

        let Some(caller) = caller.filter(|_| flags.captures_caller()) else {
            return entry;
        };

        if flags.contains(Flags::SHORT_FILE) {
            entry.file = Some(shorten_path(caller.file));
        } else if flags.contains(Flags::LONG_FILE) {
            entry.file = Some(Cow::Borrowed(caller.file));
        }

        if flags.contains(Flags::FUNCTION) {
            entry.function = caller.function.map(|function| {
                if entry.file.is_some() {
                    last_segment(function)
                } else {
                    function
                }
            });
        }

        if entry.file.is_some() || entry.function.is_some() {
            entry.line = Some(caller.line);
        }
        entry
    }
}

fn now(flags: Flags) -> DateTime<FixedOffset> {
    if flags.contains(Flags::UTC) {
        Utc::now().fixed_offset()
    } else {
        Local::now().fixed_offset()
    }
}

fn last_segment(path: &'static str) -> &'static str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Compresses every directory between the first and the file name to its
/// first character.
///
/// `crates/seglog_core/src/logger.rs` becomes `crates/s/s/logger.rs`.
#[must_use]
pub fn shorten_path(path: &str) -> Cow<'_, str> {
    let parts: Vec<&str> = path.split(['/', '\\']).collect();
    if parts.len() <= 2 {
        return Cow::Borrowed(path);
    }

    let last = parts.len() - 1;
    let mut short = String::with_capacity(path.len());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            short.push('/');
        }
        if i == 0 || i == last {
            short.push_str(part);
        } else if let Some(first) = part.chars().next() {
            short.push(first);
        }
    }
    Cow::Owned(short)
}
