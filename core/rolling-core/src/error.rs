//! Error types for the rotating writer and its configuration.
//!
//! Only [`Error::DirectoryCreate`], [`Error::FileOpen`], [`Error::Io`] and
//! [`Error::Closed`] ever come back from a write. Symlink and close failures
//! are logged by the writer and swallowed.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Unknown output mode, unknown severity, or an unusable name.
    #[error("Invalid logging configuration: {0}")]
    ConfigValidation(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to create log directory {path}: {source}")]
    DirectoryCreate { path: PathBuf, source: io::Error },

    #[error("Failed to open log file {path}: {source}")]
    FileOpen { path: PathBuf, source: io::Error },

    #[error("Failed to point {link} at {target}: {source}")]
    Symlink {
        link: PathBuf,
        target: String,
        source: io::Error,
    },

    #[error("Failed to close log file {path}: {source}")]
    Close { path: PathBuf, source: io::Error },

    #[error("Logger has been shut down")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::Io(source)
            | Error::DirectoryCreate { source, .. }
            | Error::FileOpen { source, .. } => source.kind(),
            Error::Closed => io::ErrorKind::BrokenPipe,
            Error::ConfigValidation(_) => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
