//! `tracing-subscriber` layer that renders events into a [`Logger`].
//!
//! Records carry a `%Y-%m-%d %H:%M:%S` timestamp in the configured zone,
//! the level, the message, structured fields and the call site. ANSI colour
//! is always off since output usually lands in files.

use std::fmt;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::clock::Zone;
use crate::config::{Encoding, LogSettings};
use crate::logger::{Logger, LoggerWriter};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default)]
pub struct ZonedTimer {
    zone: Zone,
}

impl ZonedTimer {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }
}

impl FormatTime for ZonedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", self.zone.now().format(TIMESTAMP_FORMAT))
    }
}

/// Formatting layer writing through `logger`, JSON or text per the settings.
pub fn layer<S>(logger: Arc<Logger>) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let settings = logger.settings();
    let timer = ZonedTimer::new(settings.zone);
    let encoding = settings.encoding;

    let base = tracing_subscriber::fmt::layer()
        .with_timer(timer)
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(LoggerWriter::new(logger));

    match encoding {
        Encoding::Json => base.json().flatten_event(true).boxed(),
        Encoding::Text => base.boxed(),
    }
}

pub fn level_filter(settings: &LogSettings) -> LevelFilter {
    LevelFilter::from_level(settings.min_level().to_tracing())
}

/// `RUST_LOG` when set and valid, otherwise the configured minimum severity.
pub fn env_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level_filter(settings).into()))
}
