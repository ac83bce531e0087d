//! Background segment close, retention and link maintenance.
//!
//! Housekeeping never fails a write. Every failure is logged and queued on
//! an error channel the owner can drain.

use crate::error::{SinkError, SinkResult};
use crate::segment::{self, SegmentName, LATEST_LINK};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

#[cfg(unix)]
const STAGED_LINK: &str = ".latest.log.tmp";

/// Reports housekeeping failures to the owning writer.
#[derive(Debug, Clone)]
pub(crate) struct Reporter {
    tx: Sender<SinkError>,
}

impl Reporter {
    pub(crate) fn report(&self, err: SinkError) {
        warn!(error = %err, "log housekeeping failed");
        // The receiver lives as long as the writer; a send after drop is moot.
        let _ = self.tx.send(err);
    }
}

/// Tracks spawned housekeeping tasks and the errors they report.
#[derive(Debug)]
pub(crate) struct Housekeeper {
    tasks: Mutex<Vec<JoinHandle<()>>>,
    reporter: Reporter,
    errors: Mutex<Receiver<SinkError>>,
}

impl Housekeeper {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tasks: Mutex::new(Vec::new()),
            reporter: Reporter { tx },
            errors: Mutex::new(rx),
        }
    }

    pub(crate) fn reporter(&self) -> Reporter {
        self.reporter.clone()
    }

    /// Runs `job` on a background thread.
    ///
    /// If no thread can be spawned the job runs inline.
    pub(crate) fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&Reporter) + Send + 'static,
    {
        let reporter = self.reporter();
        let job = Arc::new(Mutex::new(Some(job)));
        let spawned = {
            let job = Arc::clone(&job);
            let reporter = reporter.clone();
            thread::Builder::new()
                .name("seglog-housekeeping".into())
                .spawn(move || {
                    if let Some(job) = job.lock().take() {
                        job(&reporter);
                    }
                })
        };

        match spawned {
            Ok(handle) => {
                let mut tasks = self.tasks.lock();
                tasks.retain(|task| !task.is_finished());
                tasks.push(handle);
            }
            Err(err) => {
                reporter.report(SinkError::Housekeeping(format!(
                    "spawn housekeeping thread: {err}"
                )));
                if let Some(job) = job.lock().take() {
                    job(&reporter);
                }
            }
        }
    }

    /// Waits until every spawned task has finished.
    pub(crate) fn drain(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if task.join().is_err() {
                self.reporter
                    .report(SinkError::Housekeeping("housekeeping task panicked".into()));
            }
        }
    }

    /// Takes every error reported so far.
    pub(crate) fn take_errors(&self) -> Vec<SinkError> {
        self.errors.lock().try_iter().collect()
    }
}

/// Flushes a superseded segment to disk before its handle is dropped.
pub(crate) fn close_segment(file: File, path: &Path, reporter: &Reporter) {
    if let Err(err) = file.sync_all() {
        reporter.report(SinkError::Housekeeping(format!(
            "close {}: {err}",
            path.display()
        )));
    }
}

/// Result of deleting a batch of segment files.
#[derive(Debug, Default)]
pub struct Removal {
    /// Segments that were deleted.
    pub removed: Vec<SegmentName>,
    /// One error per segment that could not be deleted.
    pub failures: Vec<SinkError>,
}

/// Lists the segments of `dir` dated before the retention horizon.
///
/// # Errors
///
/// Returns [`SinkError::ListDirectory`] if the directory cannot be read.
pub fn expired_segments(
    dir: &Path,
    today: NaiveDate,
    retention_days: u32,
) -> SinkResult<Vec<SegmentName>> {
    Ok(segment::list_segments(dir)?
        .into_iter()
        .filter(|name| name.is_expired(today, retention_days))
        .collect())
}

/// Deletes `segments` from `dir`.
///
/// Segments that are already gone count as neither removed nor failed.
pub fn remove_segments(dir: &Path, segments: &[SegmentName]) -> Removal {
    let mut removal = Removal::default();
    for name in segments {
        let path = dir.join(name.file_name());
        match fs::remove_file(&path) {
            Ok(()) => removal.removed.push(name.clone()),
            // A concurrent sweep already got it.
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => removal.failures.push(SinkError::Housekeeping(format!(
                "remove {}: {err}",
                path.display()
            ))),
        }
    }
    removal
}

/// Deletes every segment dated strictly before `today - retention_days`.
///
/// Returns the number of files removed.
pub(crate) fn remove_expired(
    dir: &Path,
    segments: &[SegmentName],
    today: NaiveDate,
    retention_days: u32,
    reporter: &Reporter,
) -> usize {
    let expired: Vec<SegmentName> = segments
        .iter()
        .filter(|name| name.is_expired(today, retention_days))
        .cloned()
        .collect();
    let removal = remove_segments(dir, &expired);
    for err in removal.failures {
        reporter.report(err);
    }
    removal.removed.len()
}

/// Owner of the [`LATEST_LINK`] of one directory.
///
/// Refreshes from concurrent housekeeping tasks are serialized and the
/// link never moves back to an older segment.
#[derive(Debug, Default)]
pub(crate) struct LatestLink {
    target: Mutex<Option<SegmentName>>,
}

impl LatestLink {
    /// Points the link at `active` unless it already names a newer segment.
    pub(crate) fn refresh(&self, dir: &Path, active: &SegmentName, reporter: &Reporter) {
        let mut target = self.target.lock();
        if target.as_ref().is_some_and(|current| current >= active) {
            return;
        }
        if relink(dir, active, reporter) {
            *target = Some(active.clone());
        }
    }
}

/// Stages a link to `active` and renames it over [`LATEST_LINK`].
#[cfg(unix)]
fn relink(dir: &Path, active: &SegmentName, reporter: &Reporter) -> bool {
    let link = dir.join(LATEST_LINK);
    let staged = dir.join(STAGED_LINK);
    let fail = |what: &str, path: &Path, err: io::Error| {
        reporter.report(SinkError::Housekeeping(format!(
            "{what} {}: {err}",
            path.display()
        )));
        false
    };

    match fs::remove_file(&staged) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return fail("unlink", &staged, err),
    }
    if let Err(err) = std::os::unix::fs::symlink(active.file_name(), &staged) {
        return fail("link", &staged, err);
    }
    if let Err(err) = fs::rename(&staged, &link) {
        return fail("rename", &link, err);
    }
    true
}

#[cfg(not(unix))]
fn relink(_dir: &Path, _active: &SegmentName, _reporter: &Reporter) -> bool {
    true
}
