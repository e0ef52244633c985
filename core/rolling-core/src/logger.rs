//! Logger lifecycle and the bridge into `tracing-subscriber`.
//!
//! A [`Logger`] is built once from validated settings and shared behind an
//! `Arc`. [`LoggerWriter`] hands it to a `fmt` layer, picking the severity of
//! each record from the event metadata. [`Logger::shutdown`] closes every
//! open file; records written afterwards are rejected.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::Metadata;
use tracing_subscriber::fmt::MakeWriter;

use crate::clock::{Clock, SystemClock};
use crate::config::LogSettings;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::sink::Sink;

#[derive(Debug)]
pub struct Logger {
    settings: LogSettings,
    sink: Sink,
    shut_down: AtomicBool,
}

impl Logger {
    pub fn new(settings: &LogSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock::new(settings.zone)))
    }

    pub fn with_clock(settings: &LogSettings, clock: Arc<dyn Clock>) -> Self {
        tracing::debug!(
            output = %settings.output,
            rotation = %settings.rotation,
            streams = settings.streams.len(),
            "Building logger"
        );
        Self {
            sink: Sink::from_settings(settings, clock),
            settings: settings.clone(),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn min_level(&self) -> Level {
        self.settings.min_level()
    }

    /// Writes one complete, already formatted record.
    pub fn write(&self, level: Level, record: &[u8]) -> Result<usize> {
        if self.is_shut_down() {
            return Err(Error::Closed);
        }
        self.sink.write(level, record)
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    /// Closes all outputs. Only the first call does any work.
    pub fn shutdown(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.sink.close()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

/// `MakeWriter` over a shared [`Logger`].
#[derive(Debug, Clone)]
pub struct LoggerWriter {
    logger: Arc<Logger>,
}

impl LoggerWriter {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

/// One record's worth of output at a fixed severity.
#[derive(Debug)]
pub struct RecordWriter<'a> {
    logger: &'a Logger,
    level: Level,
}

impl io::Write for RecordWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.logger.write(self.level, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.logger.flush().map_err(io::Error::from)
    }
}

impl<'a> MakeWriter<'a> for LoggerWriter {
    type Writer = RecordWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RecordWriter {
            logger: &self.logger,
            level: Level::Info,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        RecordWriter {
            logger: &self.logger,
            level: Level::from(meta.level()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RawLogConfig;
    use chrono::NaiveDate;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    fn logger(dir: &Path) -> Logger {
        let settings = RawLogConfig {
            log_output: "file".to_string(),
            log_info_dir: dir.display().to_string(),
            log_rotation_time: "day".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let clock = ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 7, 4)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        Logger::with_clock(&settings, Arc::new(clock))
    }

    #[test]
    fn test_write_respects_configured_range() {
        let temp = tempdir().unwrap();
        let logger = logger(temp.path());

        logger.write(Level::Warn, b"kept\n").unwrap();
        logger.write(Level::Debug, b"dropped\n").unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("2024-07-04.logger.log")).unwrap(),
            "kept\n"
        );
    }

    #[test]
    fn test_shutdown_is_idempotent_and_rejects_writes() {
        let temp = tempdir().unwrap();
        let logger = logger(temp.path());
        logger.write(Level::Info, b"a\n").unwrap();

        logger.shutdown().unwrap();
        logger.shutdown().unwrap();

        assert!(logger.is_shut_down());
        assert!(matches!(logger.write(Level::Info, b"b\n"), Err(Error::Closed)));
    }

    #[test]
    fn test_make_writer_for_uses_event_level() {
        let temp = tempdir().unwrap();
        let writer = LoggerWriter::new(Arc::new(logger(temp.path())));

        let mut info = writer.make_writer();
        info.write_all(b"default\n").unwrap();

        assert_eq!(info.level, Level::Info);
        assert_eq!(
            fs::read_to_string(temp.path().join("2024-07-04.logger.log")).unwrap(),
            "default\n"
        );
    }

    #[test]
    fn test_record_writer_surfaces_shutdown() {
        let temp = tempdir().unwrap();
        let logger = Arc::new(logger(temp.path()));
        logger.shutdown().unwrap();

        let writer = LoggerWriter::new(logger);
        let err = writer.make_writer().write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
