//! Pass-through sink over any `io::Write`.

use crate::error::SinkResult;
use crate::sink::Sink;
use parking_lot::Mutex;
use std::io::{self, Write};

/// A sink forwarding to an [`io::Write`] such as stderr or a socket.
///
/// The writer is held behind a mutex so that shared use from many loggers
/// keeps records whole.
#[derive(Debug)]
pub struct WriterSink<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    /// Unwraps the sink, returning the inner writer.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl WriterSink<io::Stderr> {
    /// A sink writing to the process's standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl WriterSink<io::Stdout> {
    /// A sink writing to the process's standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    /// Writes the whole of `data` under one lock hold.
    ///
    /// Short writes of the inner writer are retried before the lock is
    /// released, so records from loggers sharing the sink never interleave.
    fn write(&self, data: &[u8]) -> SinkResult<usize> {
        let mut inner = self.inner.lock();
        let mut written = 0;
        while written < data.len() {
            match inner.write(&data[written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "writer accepted zero bytes",
                    )
                    .into())
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(written)
    }

    fn flush(&self) -> SinkResult<()> {
        self.inner.lock().flush()?;
        Ok(())
    }
}
