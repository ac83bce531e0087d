//! Sink trait definition.

use crate::error::{SinkError, SinkResult};
use std::io;
use std::sync::Arc;

/// A destination for rendered log records.
///
/// Sinks are **opaque byte stores**. The printer hands each record over as
/// one byte slice; the sink decides where the bytes end up.
///
/// # Invariants
///
/// - `write` returns the number of bytes accepted, which may be fewer than
///   offered
/// - Concurrent `write` calls never interleave bytes of different calls
/// - `flush` pushes accepted bytes to the next layer (OS, stream)
/// - Sinks must be `Send + Sync`; they are shared by every derived logger
///
/// # Implementors
///
/// - [`super::RotatingFileWriter`] - Rotating segment files
/// - [`super::MemorySink`] - For testing
/// - [`super::WriterSink`] - Any `io::Write`
pub trait Sink: Send + Sync {
    /// Writes `data`, returning how many bytes were accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink is closed or an I/O error occurs.
    fn write(&self, data: &[u8]) -> SinkResult<usize>;

    /// Flushes accepted bytes to the underlying destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&self) -> SinkResult<()>;

    /// Makes accepted bytes durable.
    ///
    /// This is a stronger guarantee than `flush`. Sinks without durable
    /// storage fall back to `flush`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> SinkResult<()> {
        self.flush()
    }

    /// Writes all of `data`, looping on short writes.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `write`, or a `WriteZero` I/O
    /// error if the sink stops accepting bytes.
    fn write_all(&self, mut data: &[u8]) -> SinkResult<()> {
        while !data.is_empty() {
            match self.write(data)? {
                0 => {
                    return Err(SinkError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "sink accepted zero bytes",
                    )))
                }
                n => data = &data[n..],
            }
        }
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, data: &[u8]) -> SinkResult<usize> {
        (**self).write(data)
    }

    fn flush(&self) -> SinkResult<()> {
        (**self).flush()
    }

    fn sync(&self) -> SinkResult<()> {
        (**self).sync()
    }
}

impl<S: Sink + ?Sized> Sink for &S {
    fn write(&self, data: &[u8]) -> SinkResult<usize> {
        (**self).write(data)
    }

    fn flush(&self) -> SinkResult<()> {
        (**self).flush()
    }

    fn sync(&self) -> SinkResult<()> {
        (**self).sync()
    }
}
