//! `rolling-log`: writes heartbeat records through the rotating logger.
//!
//! Configuration is read from `config.yaml` (or `--config`), then overridden
//! by `LOG_*` environment variables, optionally seeded from a dotenv file.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rolling_core::config::DEFAULT_CONFIG_FILE;
use rolling_core::{LogSettings, Logger, RawLogConfig};
use thiserror::Error;

mod emit;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "rolling-log")]
#[command(about = "Emits heartbeat records into time-bucketed rotating log files")]
struct Args {
    /// YAML configuration file [default: config.yaml, skipped when missing]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dotenv file loaded before environment overrides [default: .env, if present]
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Milliseconds between heartbeats
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Heartbeats to emit before exiting; 0 runs until killed
    #[arg(long, default_value_t = 0)]
    count: u64,

    /// Value of the `name` field on info records
    #[arg(long, default_value = "rolling-log")]
    name: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Log(#[from] rolling_core::Error),

    #[error("Failed to load env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rolling-log: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    load_env_file(args.env_file.as_deref())?;
    let settings = load_settings(args.config.as_deref())?;

    let logger = Arc::new(Logger::new(&settings));
    logging::init(&logger)?;
    logging::announce(&logger);

    emit::run(&args.name, Duration::from_millis(args.interval_ms), args.count);

    logger.shutdown()?;
    Ok(())
}

fn load_env_file(path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|_| ())
            .map_err(|source| CliError::EnvFile {
                path: path.to_path_buf(),
                source,
            }),
        None => {
            // A missing default .env is normal.
            let _ = dotenvy::dotenv();
            Ok(())
        }
    }
}

fn load_settings(config: Option<&Path>) -> Result<LogSettings, CliError> {
    let mut raw = read_config(config)?;
    raw.apply_process_env();
    Ok(raw.validate()?)
}

/// An explicit path must exist; the default file is optional.
fn read_config(config: Option<&Path>) -> Result<RawLogConfig, CliError> {
    let (path, explicit) = match config {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    match RawLogConfig::load(path) {
        Ok(raw) => Ok(raw),
        Err(rolling_core::Error::ConfigRead { ref source, .. })
            if !explicit && source.kind() == io::ErrorKind::NotFound =>
        {
            Ok(RawLogConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
