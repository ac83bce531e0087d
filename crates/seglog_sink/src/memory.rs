//! In-memory sink for testing.

use crate::error::SinkResult;
use crate::sink::Sink;
use parking_lot::RwLock;

/// An in-memory sink.
///
/// Every accepted byte is appended to a growable buffer. Suitable for:
/// - Unit tests asserting on rendered output
/// - Capturing log output for later inspection
///
/// # Example
///
/// ```rust
/// use seglog_sink::{MemorySink, Sink};
///
/// let sink = MemorySink::new();
/// sink.write_all(b"[INFO] started\n").unwrap();
/// assert_eq!(sink.len(), 15);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    data: RwLock<Vec<u8>>,
}

impl MemorySink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose buffer is preallocated to `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Returns the contents decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data.read()).into_owned()
    }

    /// Returns the contents split into lines, without line terminators.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.to_string_lossy().lines().map(str::to_owned).collect()
    }

    /// Returns the number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, data: &[u8]) -> SinkResult<usize> {
        self.data.write().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&self) -> SinkResult<()> {
        // Nothing is buffered outside `data`
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn memory_new_is_empty() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn memory_write_accepts_everything() {
        let sink = MemorySink::new();
        assert_eq!(sink.write(b"hello").unwrap(), 5);
        assert_eq!(sink.write(b" world").unwrap(), 6);
        assert_eq!(sink.contents(), b"hello world");
    }

    #[test]
    fn memory_lines() {
        let sink = MemorySink::new();
        sink.write_all(b"one\ntwo\n").unwrap();
        assert_eq!(sink.lines(), vec!["one", "two"]);
    }

    #[test]
    fn memory_clear() {
        let sink = MemorySink::with_capacity(64);
        sink.write_all(b"data").unwrap();
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn memory_shared_across_threads() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..100 {
                        sink.write_all(b"abcdefgh\n").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 800);
        assert!(lines.iter().all(|line| line == "abcdefgh"));
    }
}
