//! Time-bucketed rotating log files.
//!
//! Records are appended to `<dir>/<bucket>.<base>` where the bucket is the
//! current minute, hour or day. Rotation is lazy: each write checks the clock
//! and switches files when the bucket changed. A symlink named after the base
//! file always points at the newest file.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rolling_core::{subscriber, Logger, RawLogConfig};
//! use tracing_subscriber::prelude::*;
//!
//! let mut raw = RawLogConfig::load("config.yaml".as_ref())?;
//! raw.apply_process_env();
//! let settings = raw.validate()?;
//!
//! let logger = Arc::new(Logger::new(&settings));
//! tracing_subscriber::registry()
//!     .with(subscriber::env_filter(&settings))
//!     .with(subscriber::layer(Arc::clone(&logger)))
//!     .init();
//!
//! tracing::info!(name = "demo", "hello logger");
//! logger.shutdown()?;
//! # Ok::<(), rolling_core::Error>(())
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod level;
pub mod logger;
pub mod pattern;
pub mod router;
pub mod sink;
pub mod subscriber;
pub mod symlink;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, Granularity, ManualClock, SystemClock, Zone};
pub use config::{Encoding, LogSettings, Output, RawLogConfig, StreamSettings};
pub use error::{Error, Result};
pub use level::{Level, LevelRange};
pub use logger::{Logger, LoggerWriter, RecordWriter};
pub use pattern::FilenamePattern;
pub use router::{LevelRouter, Route};
pub use sink::Sink;
pub use symlink::Symlink;
pub use writer::RotatingWriter;
