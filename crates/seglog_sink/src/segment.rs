//! Segment file naming and directory scanning.
//!
//! A segment file is named `<YYYYMMDD>.<sequence>.log`. Sequence numbers
//! restart at 1 for every date and are written without zero padding.
//! Digits are kept as text so overlong sequences still order correctly:
//! ordering compares the number of significant digits, then the digits.

use crate::error::{SinkError, SinkResult};
use chrono::{Days, NaiveDate};
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Fixed file suffix of every segment.
pub const SEGMENT_SUFFIX: &str = "log";

/// Name of the link pointing at the active segment.
pub const LATEST_LINK: &str = "latest.log";

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_LEN: usize = 8;

/// The parsed name of one segment file.
///
/// `Ord` sorts by date, then by the numeric value of the sequence. Names
/// that differ only in leading zeros sort the shorter spelling first.
/// [`list_segments`] returns names newest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentName {
    date: NaiveDate,
    digits: String,
}

impl SegmentName {
    /// Creates the name of segment `sequence` for `date`.
    #[must_use]
    pub fn new(date: NaiveDate, sequence: u64) -> Self {
        Self {
            date,
            digits: sequence.to_string(),
        }
    }

    /// The calendar day embedded in the name.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The sequence number within the day.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        // Digits were validated on construction; overlong values saturate.
        self.digits.parse().unwrap_or(u64::MAX)
    }

    /// Whether the segment is dated before the retention horizon.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate, retention_days: u32) -> bool {
        retention_horizon(today, retention_days).is_some_and(|horizon| self.date < horizon)
    }

    /// The sequence digits without leading zeros.
    fn significant(&self) -> &str {
        self.digits.trim_start_matches('0')
    }

    /// The file name, e.g. `20240131.2.log`.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SegmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.date.format(DATE_FORMAT),
            self.digits,
            SEGMENT_SUFFIX
        )
    }
}

impl FromStr for SegmentName {
    type Err = SinkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || SinkError::InvalidSegmentName(name.to_string());

        let mut parts = name.split('.');
        let (Some(date), Some(digits), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if suffix != SEGMENT_SUFFIX
            || date.len() != DATE_LEN
            || !date.bytes().all(|b| b.is_ascii_digit())
            || digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;
        Ok(Self {
            date,
            digits: digits.to_string(),
        })
    }
}

impl Ord for SegmentName {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, right) = (self.significant(), other.significant());
        self.date
            .cmp(&other.date)
            .then_with(|| left.len().cmp(&right.len()))
            .then_with(|| left.cmp(right))
            .then_with(|| self.digits.len().cmp(&other.digits.len()))
    }
}

impl PartialOrd for SegmentName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The oldest date kept when segments are retained for `retention_days`.
///
/// Segments dated strictly before the horizon are deleted.
#[must_use]
pub fn retention_horizon(today: NaiveDate, retention_days: u32) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(u64::from(retention_days)))
}

/// Lists the segment files in `dir`, newest first.
///
/// Entries that are not segment files (including [`LATEST_LINK`]) are
/// ignored.
///
/// # Errors
///
/// Returns [`SinkError::ListDirectory`] if the directory cannot be read.
pub fn list_segments(dir: &Path) -> SinkResult<Vec<SegmentName>> {
    let list_err = |source| SinkError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if let Ok(name) = file_name.parse::<SegmentName>() {
            names.push(name);
        }
    }

    names.sort_by(|a, b| b.cmp(a));
    Ok(names)
}

/// The sequence number the next segment for `today` should use.
///
/// `sorted` must be newest first, as returned by [`list_segments`].
pub(crate) fn next_sequence(today: NaiveDate, sorted: &[SegmentName]) -> u64 {
    sorted
        .iter()
        .find(|name| name.date == today)
        .map_or(1, |latest| latest.sequence().saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn name_round_trip() {
        let name = SegmentName::new(day(2024, 1, 31), 12);
        assert_eq!(name.file_name(), "20240131.12.log");

        let parsed: SegmentName = "20240131.12.log".parse().unwrap();
        assert_eq!(parsed, name);
        assert_eq!(parsed.sequence(), 12);
        assert_eq!(parsed.date(), day(2024, 1, 31));
    }

    #[test]
    fn rejects_foreign_names() {
        for name in [
            "latest.log",
            "20240131.log",
            "20240131.1.txt",
            "2024013.1.log",
            "20240131..log",
            "20240131.1a.log",
            "20241399.1.log",
            "20240131.1.log.gz",
        ] {
            assert!(name.parse::<SegmentName>().is_err(), "{name} parsed");
        }
    }

    #[test]
    fn digit_length_sorts_before_value() {
        let two: SegmentName = "20240101.2.log".parse().unwrap();
        let ten: SegmentName = "20240101.10.log".parse().unwrap();
        assert!(ten > two);
    }

    #[test]
    fn zero_padding_orders_by_value() {
        let padded: SegmentName = "20240501.01.log".parse().unwrap();
        let two: SegmentName = "20240501.2.log".parse().unwrap();
        let padded_two: SegmentName = "20240501.002.log".parse().unwrap();
        assert!(padded < two);
        assert!(padded_two > two);
        assert_ne!(padded_two, two);
        assert_eq!(padded_two.sequence(), 2);

        let mut names = vec![padded, two];
        names.sort_by(|a, b| b.cmp(a));
        assert_eq!(next_sequence(names[0].date(), &names), 3);
    }

    #[test]
    fn date_sorts_before_sequence() {
        let old: SegmentName = "20231231.99.log".parse().unwrap();
        let new: SegmentName = "20240101.1.log".parse().unwrap();
        assert!(new > old);
    }

    #[test]
    fn list_segments_newest_first() {
        let dir = tempdir().unwrap();
        for name in [
            "20240101.1.log",
            "20240102.2.log",
            "20240102.10.log",
            "20240102.1.log",
            "latest.log",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let names: Vec<String> = list_segments(dir.path())
            .unwrap()
            .iter()
            .map(SegmentName::file_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "20240102.10.log",
                "20240102.2.log",
                "20240102.1.log",
                "20240101.1.log",
            ]
        );
    }

    #[test]
    fn list_segments_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let result = list_segments(&dir.path().join("missing"));
        assert!(matches!(result, Err(SinkError::ListDirectory { .. })));
    }

    #[test]
    fn next_sequence_starts_at_one() {
        assert_eq!(next_sequence(day(2024, 1, 2), &[]), 1);

        let yesterday = vec![SegmentName::new(day(2024, 1, 1), 7)];
        assert_eq!(next_sequence(day(2024, 1, 2), &yesterday), 1);
    }

    #[test]
    fn next_sequence_follows_latest_today() {
        let mut names = vec![
            SegmentName::new(day(2024, 1, 2), 9),
            SegmentName::new(day(2024, 1, 2), 10),
            SegmentName::new(day(2024, 1, 1), 40),
        ];
        names.sort_by(|a, b| b.cmp(a));
        assert_eq!(next_sequence(day(2024, 1, 2), &names), 11);
    }

    #[test]
    fn next_sequence_ignores_future_dates() {
        let mut names = vec![
            SegmentName::new(day(2024, 1, 3), 1),
            SegmentName::new(day(2024, 1, 2), 4),
        ];
        names.sort_by(|a, b| b.cmp(a));
        assert_eq!(next_sequence(day(2024, 1, 2), &names), 5);
    }

    #[test]
    fn expiry_is_strictly_before_horizon() {
        let today = day(2024, 3, 10);
        assert_eq!(retention_horizon(today, 3), Some(day(2024, 3, 7)));
        assert!(!SegmentName::new(day(2024, 3, 7), 1).is_expired(today, 3));
        assert!(SegmentName::new(day(2024, 3, 6), 1).is_expired(today, 3));
        assert!(!SegmentName::new(today, 1).is_expired(today, 0));
    }

    proptest! {
        #[test]
        fn ordering_matches_numeric_sequence(a in 1u64..1_000_000, b in 1u64..1_000_000) {
            let date = day(2024, 5, 5);
            let left = SegmentName::new(date, a);
            let right = SegmentName::new(date, b);
            prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        }
    }
}
