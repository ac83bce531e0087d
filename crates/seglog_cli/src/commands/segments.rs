//! Segments command implementation.

use super::format_size;
use crate::Format;
use seglog_sink::{list_segments, LATEST_LINK};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One segment file of a log directory.
#[derive(Debug, Serialize)]
pub struct SegmentInfo {
    /// File name.
    pub name: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Sequence within the day.
    pub sequence: u64,
    /// File size in bytes.
    pub size: u64,
    /// Whether `latest.log` points at this file.
    pub latest: bool,
}

/// Collects the segments of `dir`, newest first.
pub fn collect(dir: &Path) -> Result<Vec<SegmentInfo>, Box<dyn std::error::Error>> {
    let latest = fs::read_link(dir.join(LATEST_LINK))
        .ok()
        .and_then(|target| target.file_name().map(|name| name.to_string_lossy().into_owned()));

    let mut infos = Vec::new();
    for segment in list_segments(dir)? {
        let name = segment.file_name();
        // Deleted by a concurrent sweep between listing and stat.
        let Ok(meta) = fs::metadata(dir.join(&name)) else {
            continue;
        };
        infos.push(SegmentInfo {
            latest: latest.as_deref() == Some(name.as_str()),
            date: segment.date().format("%Y-%m-%d").to_string(),
            sequence: segment.sequence(),
            size: meta.len(),
            name,
        });
    }
    Ok(infos)
}

/// Runs the segments command.
pub fn run(dir: &Path, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let infos = collect(dir)?;

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        Format::Text => print_text_output(dir, &infos),
    }
    Ok(())
}

fn print_text_output(dir: &Path, infos: &[SegmentInfo]) {
    println!("Log directory: {}", dir.display());
    println!();
    if infos.is_empty() {
        println!("No segments");
        return;
    }

    for info in infos {
        let marker = if info.latest { " <- latest" } else { "" };
        println!("  {:<24} {:>10}{marker}", info.name, format_size(info.size));
    }

    let total: u64 = infos.iter().map(|info| info.size).sum();
    println!();
    println!("Segments: {}", infos.len());
    println!("Total:    {}", format_size(total));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn collect_lists_newest_first_with_sizes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("20240101.1.log"), b"abc").unwrap();
        fs::write(dir.path().join("20240102.1.log"), b"abcdef").unwrap();
        fs::write(dir.path().join("readme.txt"), b"not a segment").unwrap();

        let infos = collect(dir.path()).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].name, "20240102.1.log");
        assert_eq!(infos[0].date, "2024-01-02");
        assert_eq!(infos[0].size, 6);
        assert_eq!(infos[1].sequence, 1);
    }

    #[cfg(unix)]
    #[test]
    fn collect_marks_latest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("20240101.1.log"), b"").unwrap();
        fs::write(dir.path().join("20240101.2.log"), b"").unwrap();
        std::os::unix::fs::symlink("20240101.2.log", dir.path().join(LATEST_LINK)).unwrap();

        let infos = collect(dir.path()).unwrap();
        assert!(infos[0].latest);
        assert!(!infos[1].latest);
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 << 20), "3.0 MB");
    }
}
