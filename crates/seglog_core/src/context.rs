//! Scoped ambient logger.
//!
//! Code that has no logger parameter can pick up the one installed by an
//! enclosing [`scope`] on the same thread. Scopes nest; the innermost wins.

use crate::logger::Logger;
use std::cell::RefCell;

thread_local! {
    static STACK: RefCell<Vec<Logger>> = const { RefCell::new(Vec::new()) };
}

struct Restore;

impl Drop for Restore {
    fn drop(&mut self) {
        STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Runs `f` with `logger` installed as the current logger of this thread.
///
/// ```rust
/// use seglog_core::{context, Logger};
/// use seglog_sink::MemorySink;
///
/// let logger = Logger::new(MemorySink::new()).derive("job");
/// context::scope(logger, || {
///     assert_eq!(context::current().unwrap().name(), "job");
/// });
/// assert!(context::current().is_none());
/// ```
pub fn scope<R>(logger: Logger, f: impl FnOnce() -> R) -> R {
    STACK.with(|stack| stack.borrow_mut().push(logger));
    let _restore = Restore;
    f()
}

/// The logger installed by the innermost enclosing [`scope`], if any.
#[must_use]
pub fn current() -> Option<Logger> {
    STACK.with(|stack| stack.borrow().last().cloned())
}

/// The current logger, or `fallback` outside any scope.
#[must_use]
pub fn current_or(fallback: &Logger) -> Logger {
    current().unwrap_or_else(|| fallback.clone())
}
