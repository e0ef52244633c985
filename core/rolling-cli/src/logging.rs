//! Global subscriber for the binary.
//!
//! Every event, including the library's own diagnostics, goes through the
//! configured logger. `RUST_LOG` narrows what is recorded; without it the
//! configured minimum severity applies.

use std::sync::Arc;

use rolling_core::{subscriber, Logger};
use tracing::Subscriber;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

pub fn build(logger: &Arc<Logger>) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(subscriber::env_filter(logger.settings()))
        .with(subscriber::layer(Arc::clone(logger)))
}

pub fn init(logger: &Arc<Logger>) -> Result<(), TryInitError> {
    build(logger).try_init()
}

/// First records after the subscriber is live: warnings deferred from
/// validation, then a readiness line.
pub fn announce(logger: &Logger) {
    let settings = logger.settings();
    settings.report_warnings();
    tracing::debug!(
        output = %settings.output,
        rotation = %settings.rotation,
        min = %settings.range.min(),
        max = %settings.range.max(),
        "Logger ready"
    );
}
