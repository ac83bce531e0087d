//! Sweep command implementation.

use chrono::NaiveDate;
use seglog_sink::{
    expired_segments, remove_segments, retention_horizon, Clock, SegmentName, SystemClock,
};
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of a sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Oldest date kept.
    pub horizon: Option<NaiveDate>,
    /// Expired segment files.
    pub expired: Vec<String>,
    /// Files actually deleted.
    pub removed: usize,
}

/// Deletes segments of `dir` dated before the horizon for `today`.
///
/// With `dry_run` nothing is deleted.
pub fn sweep(
    dir: &Path,
    today: NaiveDate,
    retention_days: u32,
    dry_run: bool,
) -> Result<SweepReport, Box<dyn std::error::Error>> {
    let expired = expired_segments(dir, today, retention_days)?;
    let mut report = SweepReport {
        horizon: retention_horizon(today, retention_days),
        expired: expired.iter().map(SegmentName::file_name).collect(),
        removed: 0,
    };

    if !dry_run {
        let removal = remove_segments(dir, &expired);
        for name in &removal.removed {
            debug!(segment = %name, "removed expired segment");
        }
        for err in &removal.failures {
            warn!(error = %err, "failed to remove segment");
        }
        report.removed = removal.removed.len();
    }
    Ok(report)
}

/// Runs the sweep command.
pub fn run(
    dir: &Path,
    retention_days: u32,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = sweep(dir, SystemClock.today(), retention_days, dry_run)?;

    if let Some(horizon) = report.horizon {
        println!("Keeping segments dated {horizon} or later");
    }
    if report.expired.is_empty() {
        println!("Nothing to delete");
        return Ok(());
    }

    let verb = if dry_run { "Would delete" } else { "Deleted" };
    for name in &report.expired {
        println!("  {verb} {name}");
    }
    if dry_run {
        println!("{} segments expired", report.expired.len());
    } else {
        println!("{} of {} expired segments deleted", report.removed, report.expired.len());
    }
    Ok(())
}
