//! The logger façade and its derivations.

use crate::config::LoggerConfig;
use crate::entry::{Caller, Entry};
use crate::error::{LogError, LogResult};
use crate::field::{self, Field, Value};
use crate::flags::Flags;
use crate::level::Level;
use crate::printer::{Printer, TextPrinter};
use seglog_sink::{Sink, WriterSink};
use std::fmt;
use std::sync::Arc;

struct Shared {
    sink: Arc<dyn Sink>,
    printer: Arc<dyn Printer>,
    config: LoggerConfig,
}

/// A leveled, structured logger.
///
/// A `Logger` is an immutable configuration: a name, optional level and
/// flag overrides and a list of fields, plus a handle on the sink and
/// printer it shares with every logger derived from it. Derivation methods
/// such as [`Logger::with`] and [`Logger::derive`] return a new logger and
/// never change the parent.
///
/// Cloning is cheap and clones may be sent to other threads.
///
/// # Example
///
/// ```rust
/// use seglog_core::{kv, Flags, Logger, LoggerConfig};
/// use seglog_sink::MemorySink;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = Logger::with_config(sink.clone(), LoggerConfig::new().flags(Flags::empty()));
///
/// logger.with(kv!["user", "tom", "count", 3]).info("login");
/// assert_eq!(sink.to_string_lossy(), "[INFO] user=tom count=3 | login\n");
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    name: Arc<str>,
    level: Option<Level>,
    flags: Option<Flags>,
    fields: Arc<[Field]>,
}

impl Logger {
    /// Creates a text logger over `sink` with default configuration.
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self::with_config(sink, LoggerConfig::default())
    }

    /// Creates a text logger over `sink`.
    pub fn with_config(sink: impl Sink + 'static, config: LoggerConfig) -> Self {
        Self::from_parts(Arc::new(sink), Arc::new(TextPrinter::new()), config)
    }

    /// Creates a logger from an explicit sink and printer.
    pub fn from_parts(sink: Arc<dyn Sink>, printer: Arc<dyn Printer>, config: LoggerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                sink,
                printer,
                config,
            }),
            name: Arc::from(""),
            level: None,
            flags: None,
            fields: Arc::from(Vec::new()),
        }
    }

    /// A text logger writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(WriterSink::stderr())
    }

    /// The logger name; empty when unnamed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The effective threshold.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level.unwrap_or(self.shared.config.level)
    }

    /// The effective flags.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags.unwrap_or(self.shared.config.flags)
    }

    /// Fields attached to every record, in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The shared configuration.
    #[must_use]
    pub fn config(&self) -> &LoggerConfig {
        &self.shared.config
    }

    /// Whether a record at `level` would be emitted.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Flushes the shared sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails to flush.
    pub fn flush(&self) -> LogResult<()> {
        self.shared.sink.flush()?;
        Ok(())
    }

    fn derived(&self, fields: Arc<[Field]>) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            name: Arc::clone(&self.name),
            level: self.level,
            flags: self.flags,
            fields,
        }
    }

    /// A logger with `fields` appended after the existing ones.
    #[must_use]
    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        let combined: Vec<Field> = self.fields.iter().cloned().chain(fields).collect();
        self.derived(combined.into())
    }

    /// A logger with fields built from a flat `key, value, ...` list.
    ///
    /// ```rust
    /// use seglog_core::{kv, Logger};
    /// use seglog_sink::MemorySink;
    ///
    /// let logger = Logger::new(MemorySink::new()).with(kv!["request", 7, "path", "/"]);
    /// assert_eq!(logger.fields().len(), 2);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the list has an odd length or a key is not a string. Use
    /// [`Logger::try_with`] to handle that case.
    #[must_use]
    #[track_caller]
    pub fn with(&self, key_values: impl IntoIterator<Item = Value>) -> Self {
        match self.try_with(key_values) {
            Ok(logger) => logger,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`Logger::with`], returning malformed lists as an error.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidKeyValues`] if the list has an odd length
    /// or a key is not a string.
    pub fn try_with(&self, key_values: impl IntoIterator<Item = Value>) -> LogResult<Self> {
        Ok(self.with_fields(field::from_key_values(key_values)?))
    }

    /// A logger with a new name. An empty name keeps the current one.
    #[must_use]
    pub fn derive(&self, name: &str) -> Self {
        let mut logger = self.derived(Arc::clone(&self.fields));
        if !name.is_empty() {
            logger.name = Arc::from(name);
        }
        logger
    }

    /// A logger with its own threshold.
    #[must_use]
    pub fn with_level(&self, level: Level) -> Self {
        let mut logger = self.derived(Arc::clone(&self.fields));
        logger.level = Some(level);
        logger
    }

    /// A logger with its own flags.
    #[must_use]
    pub fn with_flags(&self, flags: Flags) -> Self {
        let mut logger = self.derived(Arc::clone(&self.fields));
        logger.flags = Some(flags);
        logger
    }

    fn entry<'a>(&'a self, level: Level, message: &'a str, caller: Caller) -> Entry<'a> {
        let caller = match &self.shared.config.source_root {
            Some(root) => caller.strip_root(root),
            None => caller,
        };
        Entry::capture(self.flags(), level, &self.name, &self.fields, message, Some(caller))
    }

    fn deliver(&self, level: Level, message: &str, caller: Caller) -> LogResult<()> {
        let entry = self.entry(level, message, caller);
        self.shared.printer.print(&entry, &*self.shared.sink)
    }

    fn emit(&self, level: Level, message: &dyn fmt::Display, caller: Caller) {
        if !self.enabled(level) {
            return;
        }
        if let Err(err) = self.deliver(level, &message.to_string(), caller) {
            report_delivery_failure(level, &err);
        }
    }

    fn escalate(&self, level: Level, message: &dyn fmt::Display, caller: Caller) -> Escalation {
        let message = message.to_string();
        let entry = self.entry(level, &message, caller);
        let rendered = self.shared.printer.render_to_string(&entry);

        let delivery = if self.enabled(level) {
            let sink = &*self.shared.sink;
            self.shared
                .printer
                .print(&entry, sink)
                .and_then(|()| Ok(sink.flush()?))
        } else {
            Ok(())
        };
        if let Err(err) = &delivery {
            report_delivery_failure(level, err);
        }
        let delivered = self.enabled(level) && delivery.is_ok();

        Escalation {
            level,
            rendered,
            delivered,
            delivery,
            sink: Arc::clone(&self.shared.sink),
        }
    }

    /// Logs `message` at `level`, returning delivery errors.
    ///
    /// Unlike the level methods, [`Level::Fatal`] and [`Level::Panic`] are
    /// written like any other level and do not escalate.
    ///
    /// # Errors
    ///
    /// Returns an error if the printer or sink fails.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) -> LogResult<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.deliver(level, &message.to_string(), Caller::here())
    }

    /// Logs at [`Level::Trace`].
    #[track_caller]
    pub fn trace(&self, message: impl fmt::Display) {
        self.emit(Level::Trace, &message, Caller::here());
    }

    /// Logs at [`Level::Debug`].
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::Debug, &message, Caller::here());
    }

    /// Logs at [`Level::Info`].
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::Info, &message, Caller::here());
    }

    /// Logs at [`Level::Warn`].
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::Warn, &message, Caller::here());
    }

    /// Logs at [`Level::Error`].
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::Error, &message, Caller::here());
    }

    /// Logs at [`Level::Fatal`] and hands the exit decision to the caller.
    ///
    /// The record is flushed before this returns. Call
    /// [`Escalation::raise`] to exit the process.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> Escalation {
        self.escalate(Level::Fatal, &message, Caller::here())
    }

    /// Logs at [`Level::Panic`] and hands the panic decision to the caller.
    ///
    /// ```rust,should_panic
    /// use seglog_core::Logger;
    /// use seglog_sink::MemorySink;
    ///
    /// let logger = Logger::new(MemorySink::new());
    /// logger.panic("invariant broken").raise();
    /// ```
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> Escalation {
        self.escalate(Level::Panic, &message, Caller::here())
    }

    /// Logs formatted arguments at [`Level::Trace`].
    #[track_caller]
    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Trace, &args, Caller::here());
    }

    /// Logs formatted arguments at [`Level::Debug`].
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, &args, Caller::here());
    }

    /// Logs formatted arguments at [`Level::Info`].
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, &args, Caller::here());
    }

    /// Logs formatted arguments at [`Level::Warn`].
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, &args, Caller::here());
    }

    /// Logs formatted arguments at [`Level::Error`].
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, &args, Caller::here());
    }

    /// Logs formatted arguments at [`Level::Fatal`]. See [`Logger::fatal`].
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> Escalation {
        self.escalate(Level::Fatal, &args, Caller::here())
    }

    /// Logs formatted arguments at [`Level::Panic`]. See [`Logger::panic`].
    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> Escalation {
        self.escalate(Level::Panic, &args, Caller::here())
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __log_in(&self, level: Level, module: &'static str, args: fmt::Arguments<'_>) {
        self.emit(level, &args, Caller::here().with_function(module));
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __escalate_in(
        &self,
        level: Level,
        module: &'static str,
        args: fmt::Arguments<'_>,
    ) -> Escalation {
        self.escalate(level, &args, Caller::here().with_function(module))
    }
}

fn report_delivery_failure(level: Level, err: &LogError) {
    tracing::error!(target: "seglog", %level, error = %err, "failed to deliver log record");
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("flags", &self.flags())
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// The outcome of a fatal or panic record.
///
/// The record has already been rendered and, unless the level gate
/// suppressed it, written and flushed. What happens next is up to the
/// caller: [`Escalation::raise`] applies the conventional meaning of the
/// level, or the value can be inspected and dropped.
#[must_use = "a fatal or panic record should be raised or handled"]
pub struct Escalation {
    level: Level,
    rendered: String,
    delivered: bool,
    delivery: LogResult<()>,
    sink: Arc<dyn Sink>,
}

impl Escalation {
    /// [`Level::Fatal`] or [`Level::Panic`].
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The rendered record.
    #[must_use]
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Whether the record passed the level gate and was written.
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.delivered
    }

    /// The error from writing the record, if any.
    #[must_use]
    pub fn delivery_error(&self) -> Option<&LogError> {
        self.delivery.as_ref().err()
    }

    /// Consumes the escalation, returning the delivery result.
    ///
    /// # Errors
    ///
    /// Returns the error from writing the record, if any.
    pub fn into_result(self) -> LogResult<()> {
        self.delivery
    }

    /// Panics with the rendered record, or syncs the sink and exits with
    /// status 1 for [`Level::Fatal`].
    pub fn raise(self) -> ! {
        if self.level == Level::Fatal {
            if let Err(err) = self.sink.sync() {
                report_delivery_failure(self.level, &LogError::Sink(err));
            }
            std::process::exit(1);
        }
        std::panic::panic_any(self.rendered)
    }
}

impl fmt::Debug for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Escalation")
            .field("level", &self.level)
            .field("rendered", &self.rendered)
            .field("delivered", &self.delivered)
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}
