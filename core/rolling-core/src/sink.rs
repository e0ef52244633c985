//! Output selection: standard output, or rotating files routed by severity.

use std::io::{self, Write};
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{LogSettings, Output};
use crate::error::Result;
use crate::level::{Level, LevelRange};
use crate::router::{LevelRouter, Route};
use crate::writer::RotatingWriter;

#[derive(Debug)]
pub enum Sink {
    /// Records in `range` go to stdout; nothing touches the filesystem.
    Console { range: LevelRange },
    Files(LevelRouter<RotatingWriter>),
}

impl Sink {
    /// Builds the sink for already validated settings. No file is opened
    /// until the first record arrives.
    pub fn from_settings(settings: &LogSettings, clock: Arc<dyn Clock>) -> Self {
        match settings.output {
            Output::Console => Sink::Console {
                range: settings.range,
            },
            Output::File => {
                let mut router = LevelRouter::new();
                for stream in &settings.streams {
                    let writer = RotatingWriter::new(
                        stream.pattern.clone(),
                        stream.alias.clone(),
                        Arc::clone(&clock),
                    );
                    router.push(stream.name.clone(), stream.range, writer);
                }
                Sink::Files(router)
            }
        }
    }

    /// Writes one complete record to every output that accepts `level`.
    ///
    /// A failing stream does not stop the others; the first error is
    /// returned once all have been tried. Records no output accepts are
    /// dropped and reported as written.
    pub fn write(&self, level: Level, buf: &[u8]) -> Result<usize> {
        match self {
            Sink::Console { range } => {
                if range.contains(level) {
                    io::stdout().lock().write_all(buf)?;
                }
                Ok(buf.len())
            }
            Sink::Files(router) => {
                let mut first_err = None;
                for route in router.route(level) {
                    if let Err(e) = route.target().write(buf) {
                        first_err.get_or_insert(e);
                    }
                }
                match first_err {
                    Some(e) => Err(e),
                    None => Ok(buf.len()),
                }
            }
        }
    }

    pub fn accepts(&self, level: Level) -> bool {
        match self {
            Sink::Console { range } => range.contains(level),
            Sink::Files(router) => router.accepts(level),
        }
    }

    pub fn flush(&self) -> Result<()> {
        match self {
            Sink::Console { .. } => Ok(io::stdout().lock().flush()?),
            Sink::Files(router) => first_error(router.routes(), |w| w.flush()),
        }
    }

    /// Closes every file stream, attempting all of them.
    pub fn close(&self) -> Result<()> {
        match self {
            Sink::Console { .. } => Ok(io::stdout().lock().flush()?),
            Sink::Files(router) => first_error(router.routes(), |w| w.close()),
        }
    }

    /// File streams in routing order; empty for console output.
    pub fn streams(&self) -> &[Route<RotatingWriter>] {
        match self {
            Sink::Console { .. } => &[],
            Sink::Files(router) => router.routes(),
        }
    }
}

fn first_error<F>(routes: &[Route<RotatingWriter>], mut op: F) -> Result<()>
where
    F: FnMut(&RotatingWriter) -> Result<()>,
{
    let mut first_err = None;
    for route in routes {
        if let Err(e) = op(route.target()) {
            tracing::warn!(stream = %route.name(), error = %e, "Log stream operation failed");
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RawLogConfig;
    use crate::error::Error;
    use chrono::NaiveDate;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ))
    }

    fn split_settings(dir: &Path) -> LogSettings {
        RawLogConfig {
            log_output: "file".to_string(),
            log_level_min: "debug".to_string(),
            log_split_debug: true,
            log_info_dir: dir.display().to_string(),
            log_info_symlink: Some(String::new()),
            log_debug_symlink: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_console_sink_touches_no_files() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("log");
        let settings = RawLogConfig {
            log_output: "console".to_string(),
            log_level_min: "trace".to_string(),
            log_split_debug: true,
            log_info_dir: dir.display().to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let clock = clock();
        let sink = Sink::from_settings(&settings, clock.clone());

        for i in 0..100 {
            clock.advance(chrono::Duration::minutes(37));
            for level in Level::ALL {
                let record = format!("console record {} at {}\n", i, level);
                assert_eq!(sink.write(level, record.as_bytes()).unwrap(), record.len());
            }
        }
        sink.flush().unwrap();
        sink.close().unwrap();

        assert!(sink.streams().is_empty());
        assert!(!dir.exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_split_sink_routes_by_severity() {
        let temp = tempdir().unwrap();
        let sink = Sink::from_settings(&split_settings(temp.path()), clock());

        sink.write(Level::Info, b"info\n").unwrap();
        sink.write(Level::Error, b"error\n").unwrap();
        sink.write(Level::Debug, b"debug\n").unwrap();
        sink.write(Level::Trace, b"trace\n").unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("2024-03-01-12.logger.log")).unwrap(),
            "info\nerror\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("2024-03-01-12.logger-debug.log")).unwrap(),
            "debug\n"
        );
        assert!(!sink.accepts(Level::Trace));
    }

    #[test]
    fn test_unmatched_level_creates_nothing() {
        let temp = tempdir().unwrap();
        let sink = Sink::from_settings(&split_settings(temp.path()), clock());

        assert_eq!(sink.write(Level::Trace, b"dropped").unwrap(), 7);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_close_closes_every_stream() {
        let temp = tempdir().unwrap();
        let sink = Sink::from_settings(&split_settings(temp.path()), clock());
        sink.write(Level::Info, b"a").unwrap();

        sink.close().unwrap();

        assert!(sink.streams().iter().all(|r| r.target().is_closed()));
        assert!(matches!(sink.write(Level::Info, b"b"), Err(Error::Closed)));
    }
}
