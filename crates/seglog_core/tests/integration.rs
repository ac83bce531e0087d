//! Integration tests for loggers writing through the rotating file writer.

use chrono::{Days, NaiveDate};
use seglog_core::{kv, Flags, Level, Logger, LoggerConfig};
use seglog_sink::{
    ManualClock, RotatingFileWriter, SegmentName, WriterConfig, WriterSink, MIN_ROTATE_SIZE,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plain_config() -> LoggerConfig {
    LoggerConfig::new().flags(Flags::empty())
}

fn read_segments(dir: &Path, writer: &RotatingFileWriter) -> Vec<String> {
    writer
        .segments()
        .unwrap()
        .iter()
        .rev()
        .map(|name| fs::read_to_string(dir.join(name.file_name())).unwrap())
        .collect()
}

/// Parses `[INFO] thread=NNN | record=NNNN payload=...`.
fn parse_record(line: &str) -> Option<(usize, usize)> {
    let rest = line.strip_prefix("[INFO] thread=")?;
    let (thread, rest) = rest.split_once(" | record=")?;
    let (record, payload) = rest.split_once(" payload=")?;
    if payload.len() != 16 || !payload.bytes().all(|b| b == b'x') {
        return None;
    }
    Some((thread.parse().ok()?, record.parse().ok()?))
}

#[test]
fn concurrent_loggers_write_whole_records() {
    const THREADS: usize = 100;
    const RECORDS: usize = 1000;

    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 6, 1)));
    let writer = Arc::new(
        RotatingFileWriter::open_with_clock(
            dir.path(),
            WriterConfig::new().max_size(MIN_ROTATE_SIZE),
            clock,
        )
        .unwrap(),
    );
    let logger = Logger::with_config(writer.clone(), plain_config());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.with(kv!["thread", format!("{t:03}")]);
            thread::spawn(move || {
                for i in 0..RECORDS {
                    logger.infof(format_args!("record={i:04} payload=xxxxxxxxxxxxxxxx"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush().unwrap();
    writer.drain();

    let record_len = "[INFO] thread=000 | record=0000 payload=xxxxxxxxxxxxxxxx\n".len();
    let contents = read_segments(dir.path(), &writer);
    assert!(contents.len() > 1, "expected size rotation");

    let total: usize = contents.iter().map(String::len).sum();
    assert_eq!(total, THREADS * RECORDS * record_len);

    let mut seen = vec![0usize; THREADS];
    let mut next = vec![0usize; THREADS];
    for content in &contents {
        for line in content.lines() {
            let (thread, record) =
                parse_record(line).unwrap_or_else(|| panic!("malformed record: {line:?}"));
            // Each thread's records stay in order across segments.
            assert_eq!(record, next[thread]);
            next[thread] += 1;
            seen[thread] += 1;
        }
    }
    assert!(seen.iter().all(|&n| n == RECORDS));
    assert!(writer.housekeeping_errors().is_empty());
}

#[test]
fn size_rotation_adds_exactly_one_segment() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 6, 1)));
    fs::write(dir.path().join("20240601.4.log"), b"earlier run\n").unwrap();

    let writer = Arc::new(
        RotatingFileWriter::open_with_clock(
            dir.path(),
            WriterConfig::new().max_size(MIN_ROTATE_SIZE),
            clock,
        )
        .unwrap(),
    );
    let logger = Logger::with_config(writer.clone(), plain_config());

    let message = "y".repeat(1000);
    let record_len = "[INFO] \n".len() + message.len();
    let fill = MIN_ROTATE_SIZE as usize / record_len + 1;
    for _ in 0..fill {
        logger.info(&message);
    }
    assert_eq!(writer.active_segment().unwrap().sequence(), 5);

    logger.info("overflow");
    writer.drain();

    let names: Vec<String> = writer.segments().unwrap().iter().map(SegmentName::file_name).collect();
    assert_eq!(names, vec!["20240601.6.log", "20240601.5.log", "20240601.4.log"]);
    let active = fs::read_to_string(dir.path().join("20240601.6.log")).unwrap();
    assert_eq!(active, "[INFO] overflow\n");
}

#[test]
fn date_boundary_rotates_below_size() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 12, 31)));
    let writer = Arc::new(
        RotatingFileWriter::open_with_clock(dir.path(), WriterConfig::new(), clock.clone()).unwrap(),
    );
    let logger = Logger::with_config(writer.clone(), plain_config());

    logger.info("old year");
    clock.advance_days(1);
    logger.info("new year");
    writer.drain();

    let names: Vec<String> = writer.segments().unwrap().iter().map(SegmentName::file_name).collect();
    assert_eq!(names, vec!["20250101.1.log", "20241231.1.log"]);
    assert_eq!(read_segments(dir.path(), &writer), vec!["[INFO] old year\n", "[INFO] new year\n"]);
}

#[test]
fn retention_keeps_horizon() {
    const KEEP: u32 = 5;

    let dir = tempdir().unwrap();
    let today = day(2024, 3, 20);
    for back in 0..=u64::from(KEEP) + 1 {
        let date = today.checked_sub_days(Days::new(back)).unwrap();
        fs::write(dir.path().join(SegmentName::new(date, 1).file_name()), b"x\n").unwrap();
    }

    let clock = Arc::new(ManualClock::new(today));
    let writer =
        RotatingFileWriter::open_with_clock(dir.path(), WriterConfig::new().retention_days(KEEP), clock)
            .unwrap();
    writer.drain();

    let horizon = today.checked_sub_days(Days::new(u64::from(KEEP))).unwrap();
    let segments = writer.segments().unwrap();
    assert!(segments.iter().all(|name| name.date() >= horizon));
    // today (old and new segment) plus the KEEP days before it
    assert_eq!(segments.len(), KEEP as usize + 2);
    assert!(!dir.path().join(SegmentName::new(day(2024, 3, 14), 1).file_name()).exists());
}

#[test]
fn level_gate_keeps_sink_untouched() {
    let dir = tempdir().unwrap();
    let writer = Arc::new(RotatingFileWriter::open(dir.path(), WriterConfig::new()).unwrap());
    let logger = Logger::with_config(writer.clone(), plain_config().level(Level::Error));

    logger.trace("t");
    logger.debug("d");
    logger.info("i");
    logger.warn("w");
    logger.flush().unwrap();

    assert_eq!(writer.size(), 0);
    logger.error("e");
    assert_eq!(writer.size(), "[ERROR] e\n".len() as u64);
}

#[test]
fn closed_writer_surfaces_through_log() {
    let dir = tempdir().unwrap();
    let writer = Arc::new(RotatingFileWriter::open(dir.path(), WriterConfig::new()).unwrap());
    let logger = Logger::with_config(writer.clone(), plain_config());

    logger.log(Level::Info, "before").unwrap();
    writer.close().unwrap();
    assert!(logger.log(Level::Info, "after").is_err());

    let escalation = logger.fatal("gone");
    assert!(!escalation.delivered());
    assert!(escalation.delivery_error().is_some());
}

/// A writer accepting at most three bytes per call, like a busy pipe.
#[derive(Debug)]
struct Trickle(Vec<u8>);

impl Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(3);
        self.0.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn separate_loggers_on_short_writing_sink_keep_records_whole() {
    let sink = Arc::new(WriterSink::new(Trickle(Vec::new())));
    let per_logger = 2_000;

    // Independently built loggers share the sink but not a printer.
    let handles: Vec<_> = (0..2)
        .map(|t| {
            let logger = Logger::with_config(Arc::clone(&sink), plain_config());
            thread::spawn(move || {
                for i in 0..per_logger {
                    logger
                        .with(kv!["thread", t])
                        .infof(format_args!("record={i:04} payload=xxxxxxxxxxxxxxxx"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let sink = Arc::try_unwrap(sink).unwrap();
    let content = String::from_utf8(sink.into_inner().0).unwrap();
    let mut count = 0;
    for line in content.lines() {
        assert!(parse_record(line).is_some(), "torn record: {line}");
        count += 1;
    }
    assert_eq!(count, 2 * per_logger);
}
