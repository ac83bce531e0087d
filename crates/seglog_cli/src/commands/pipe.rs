//! Pipe command implementation.

use seglog_core::{Flags, JsonPrinter, Level, Logger, LoggerConfig, Printer, TextPrinter};
use seglog_sink::{RotatingFileWriter, WriterConfig};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Options of the pipe command.
#[derive(Debug, Clone)]
pub struct PipeOptions {
    /// Level of every record.
    pub level: Level,
    /// Output flags.
    pub flags: Flags,
    /// Logger name; empty for none.
    pub name: String,
    /// Rotation size in MiB.
    pub max_size_mib: u64,
    /// Days of segments to keep.
    pub retention_days: u32,
    /// Whether to maintain the latest.log link.
    pub latest_link: bool,
    /// Whether to write JSON records.
    pub json: bool,
}

impl PipeOptions {
    fn writer_config(&self) -> WriterConfig {
        WriterConfig::new()
            .max_size_mib(self.max_size_mib)
            .retention_days(self.retention_days)
            .latest_link(self.latest_link)
    }

    fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::new().level(Level::Trace).flags(self.flags)
    }
}

/// Runs the pipe command.
pub fn run(
    dir: &Path,
    options: &PipeOptions,
    input: impl BufRead,
) -> Result<(), Box<dyn std::error::Error>> {
    let writer = Arc::new(RotatingFileWriter::open(dir, options.writer_config())?);
    let printer: Arc<dyn Printer> = if options.json {
        Arc::new(JsonPrinter::new())
    } else {
        Arc::new(TextPrinter::new())
    };
    let logger = Logger::from_parts(writer.clone(), printer, options.logger_config())
        .derive(&options.name);

    let records = pipe_lines(&logger, options.level, input)?;
    logger.flush()?;
    writer.drain();
    for err in writer.housekeeping_errors() {
        warn!(error = %err, "housekeeping failed during pipe");
    }

    info!(records, dir = %dir.display(), "pipe finished");
    Ok(())
}

/// Logs each line of `input` at `level`, returning the number of records.
fn pipe_lines(
    logger: &Logger,
    level: Level,
    input: impl BufRead,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut records = 0;
    for line in input.lines() {
        logger.log(level, line?)?;
        records += 1;
    }
    Ok(records)
}
