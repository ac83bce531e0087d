//! Size and date rotating file writer.

use crate::clock::{Clock, SystemClock};
use crate::error::{SinkError, SinkResult};
use crate::housekeeping::{self, Housekeeper, LatestLink};
use crate::segment::{self, SegmentName};
use crate::sink::Sink;
use chrono::{Datelike, NaiveDate};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Smallest accepted rotation size: 1 MiB.
pub const MIN_ROTATE_SIZE: u64 = 1 << 20;

/// Default rotation size: 64 MiB.
pub const DEFAULT_ROTATE_SIZE: u64 = 64 << 20;

/// Default number of days a segment is kept.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Configuration for a [`RotatingFileWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Segment size in bytes after which the next write rotates.
    pub max_size: u64,

    /// Segments dated more than this many days before today are deleted.
    pub retention_days: u32,

    /// Whether to maintain a `latest.log` link to the active segment.
    pub latest_link: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_ROTATE_SIZE,
            retention_days: DEFAULT_RETENTION_DAYS,
            latest_link: true,
        }
    }
}

impl WriterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rotation size in bytes, raised to [`MIN_ROTATE_SIZE`].
    #[must_use]
    pub const fn max_size(mut self, size: u64) -> Self {
        self.max_size = if size < MIN_ROTATE_SIZE {
            MIN_ROTATE_SIZE
        } else {
            size
        };
        self
    }

    /// Sets the rotation size in mebibytes.
    #[must_use]
    pub const fn max_size_mib(self, mib: u64) -> Self {
        self.max_size(mib.saturating_mul(1 << 20))
    }

    /// Sets how many days of segments are kept.
    #[must_use]
    pub const fn retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Sets whether the `latest.log` link is maintained.
    #[must_use]
    pub const fn latest_link(mut self, value: bool) -> Self {
        self.latest_link = value;
        self
    }

    /// The rotation size actually applied, which is never below the floor.
    #[must_use]
    pub const fn effective_max_size(&self) -> u64 {
        if self.max_size < MIN_ROTATE_SIZE {
            MIN_ROTATE_SIZE
        } else {
            self.max_size
        }
    }
}

struct ActiveSegment {
    file: File,
    name: SegmentName,
    path: PathBuf,
}

#[derive(Default)]
struct State {
    active: Option<ActiveSegment>,
    closed: bool,
}

/// Writes log records into a directory of dated segment files.
///
/// Segment files are named `<YYYYMMDD>.<sequence>.log`. The writer rolls to
/// a new segment when the active one has grown past the configured size or
/// the calendar day has changed. After each rotation a background task
/// closes the superseded file, deletes segments older than the retention
/// horizon and refreshes the `latest.log` link.
///
/// # Thread Safety
///
/// The writer is shared by reference across threads. Every write and every
/// rotation happens under one internal lock, so records never interleave.
/// The rotation check first reads atomics without the lock and only locks
/// when a rotation looks necessary.
///
/// # Example
///
/// ```no_run
/// use seglog_sink::{RotatingFileWriter, Sink, WriterConfig};
///
/// let writer = RotatingFileWriter::open(
///     "/var/log/myapp",
///     WriterConfig::new().max_size_mib(16).retention_days(7),
/// )
/// .unwrap();
/// writer.write_all(b"[INFO] started\n").unwrap();
/// ```
pub struct RotatingFileWriter {
    dir: PathBuf,
    config: WriterConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
    /// Bytes written to the active segment.
    size: AtomicU64,
    /// Active segment day as `YYYYMMDD`; 0 when no segment is open.
    day: AtomicU32,
    housekeeper: Housekeeper,
    latest: Arc<LatestLink>,
}

impl RotatingFileWriter {
    /// Opens a writer over `dir`, creating the directory if needed.
    ///
    /// A fresh segment is always started; existing segments are left in
    /// place and numbering continues after the newest one of today.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or read, or the
    /// first segment cannot be opened.
    pub fn open(dir: impl AsRef<Path>, config: WriterConfig) -> SinkResult<Self> {
        Self::open_with_clock(dir, config, Arc::new(SystemClock))
    }

    /// Opens a writer that takes the current day from `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`RotatingFileWriter::open`].
    pub fn open_with_clock(
        dir: impl AsRef<Path>,
        mut config: WriterConfig,
        clock: Arc<dyn Clock>,
    ) -> SinkResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| SinkError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        let dir = fs::canonicalize(dir).map_err(|source| SinkError::ListDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        config.max_size = config.effective_max_size();

        let writer = Self {
            dir,
            config,
            clock,
            state: Mutex::new(State::default()),
            size: AtomicU64::new(0),
            day: AtomicU32::new(0),
            housekeeper: Housekeeper::new(),
            latest: Arc::new(LatestLink::default()),
        };
        let today = writer.clock.today();
        writer.rotate(today)?;
        Ok(writer)
    }

    /// The directory holding the segments.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The applied configuration.
    #[must_use]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Name of the segment currently written to, if any.
    #[must_use]
    pub fn active_segment(&self) -> Option<SegmentName> {
        self.state
            .lock()
            .active
            .as_ref()
            .map(|active| active.name.clone())
    }

    /// Bytes written to the active segment.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Relaxed)
    }

    /// Lists the segments in the directory, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn segments(&self) -> SinkResult<Vec<SegmentName>> {
        segment::list_segments(&self.dir)
    }

    /// Deletes expired segments now, returning how many were removed.
    ///
    /// Individual delete failures are reported like background ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn sweep(&self) -> SinkResult<usize> {
        let segments = self.segments()?;
        Ok(housekeeping::remove_expired(
            &self.dir,
            &segments,
            self.clock.today(),
            self.config.retention_days,
            &self.housekeeper.reporter(),
        ))
    }

    /// Waits for every in-flight housekeeping task.
    pub fn drain(&self) {
        self.housekeeper.drain();
    }

    /// Takes every housekeeping error reported since the last call.
    pub fn housekeeping_errors(&self) -> Vec<SinkError> {
        self.housekeeper.take_errors()
    }

    /// Closes the active segment.
    ///
    /// Every later write fails with [`SinkError::Closed`]; a closed writer
    /// cannot be reopened. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush to disk fails.
    pub fn close(&self) -> SinkResult<()> {
        let active = {
            let mut state = self.state.lock();
            state.closed = true;
            self.size.store(0, Ordering::Relaxed);
            self.day.store(0, Ordering::Relaxed);
            state.active.take()
        };

        match active {
            Some(mut active) => {
                active.file.flush()?;
                active.file.sync_all()?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn needs_rotation(&self, today: NaiveDate) -> bool {
        let day = self.day.load(Ordering::Relaxed);
        day == 0 || day != day_key(today) || self.size.load(Ordering::Relaxed) > self.config.max_size
    }

    fn rotate(&self, today: NaiveDate) -> SinkResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SinkError::Closed);
        }
        // Another writer may have rotated while we waited for the lock.
        if !self.needs_rotation(today) {
            return Ok(());
        }

        let segments = segment::list_segments(&self.dir)?;
        let mut sequence = segment::next_sequence(today, &segments);
        let (name, path, file) = loop {
            let name = SegmentName::new(today, sequence);
            let path = self.dir.join(name.file_name());
            match OpenOptions::new().create_new(true).append(true).open(&path) {
                Ok(file) => break (name, path, file),
                // Taken since the scan; never reopen an existing segment.
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    sequence = sequence
                        .checked_add(1)
                        .ok_or(SinkError::OpenSegment { path, source: err })?;
                }
                Err(source) => return Err(SinkError::OpenSegment { path, source }),
            }
        };

        debug!(segment = %path.display(), sequence = name.sequence(), "rotated log segment");
        let previous = state.active.replace(ActiveSegment {
            file,
            name: name.clone(),
            path,
        });
        self.size.store(0, Ordering::Relaxed);
        self.day.store(day_key(today), Ordering::Relaxed);
        drop(state);

        let dir = self.dir.clone();
        let retention_days = self.config.retention_days;
        let latest = self.config.latest_link.then(|| Arc::clone(&self.latest));
        self.housekeeper.spawn(move |reporter| {
            if let Some(previous) = previous {
                housekeeping::close_segment(previous.file, &previous.path, reporter);
            }
            housekeeping::remove_expired(&dir, &segments, today, retention_days, reporter);
            if let Some(latest) = latest {
                latest.refresh(&dir, &name, reporter);
            }
        });
        Ok(())
    }
}

impl Sink for RotatingFileWriter {
    fn write(&self, data: &[u8]) -> SinkResult<usize> {
        let today = self.clock.today();
        if self.needs_rotation(today) {
            self.rotate(today)?;
        }

        let mut state = self.state.lock();
        let active = state.active.as_mut().ok_or(SinkError::Closed)?;

        let mut written = 0;
        let result = loop {
            if written == data.len() {
                break Ok(());
            }
            match active.file.write(&data[written..]) {
                Ok(0) => {
                    break Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "segment accepted zero bytes",
                    ))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };
        self.size.fetch_add(written as u64, Ordering::Relaxed);

        result?;
        Ok(written)
    }

    fn flush(&self) -> SinkResult<()> {
        if let Some(active) = self.state.lock().active.as_mut() {
            active.file.flush()?;
        }
        Ok(())
    }

    fn sync(&self) -> SinkResult<()> {
        if let Some(active) = self.state.lock().active.as_mut() {
            active.file.flush()?;
            active.file.sync_data()?;
        }
        Ok(())
    }
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        // Flush before the handle goes away
        let _ = Sink::flush(self);
        self.housekeeper.drain();
    }
}

impl std::fmt::Debug for RotatingFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileWriter")
            .field("dir", &self.dir)
            .field("config", &self.config)
            .field("active", &self.active_segment())
            .field("size", &self.size())
            .finish()
    }
}

fn day_key(date: NaiveDate) -> u32 {
    u32::try_from(date.year()).unwrap_or(0) * 10_000 + date.month() * 100 + date.day()
}
