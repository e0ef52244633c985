//! Logging configuration: loading, overrides and validation.
//!
//! Settings come from a YAML file with a top-level `log:` map:
//!
//! ```yaml
//! log:
//!   log_output: file          # console | file
//!   log_level_min: debug
//!   log_level_max: error
//!   log_rotation_time: hour   # day | hour | min
//!   log_split_debug: true     # info-and-above and below-info in separate files
//!   log_info_dir: log
//!   log_info_name: logger.log
//!   log_debug_name: logger-debug.log
//! ```
//!
//! Every key can be overridden by the upper-cased environment variable of the
//! same name (`LOG_ROTATION_TIME`, `LOG_INFO_DIR`, ...). Empty values count as
//! unset. [`RawLogConfig::validate`] turns the raw strings into
//! [`LogSettings`]; nothing downstream reads the environment.

use fs_err as fs;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::clock::{Granularity, Zone};
use crate::error::{Error, Result};
use crate::level::{Level, LevelRange};
use crate::pattern::FilenamePattern;
use crate::symlink::Symlink;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_DIR: &str = "log";
pub const DEFAULT_INFO_NAME: &str = "logger.log";
pub const DEFAULT_DEBUG_NAME: &str = "logger-debug.log";

/// Where records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Console,
    File,
}

impl FromStr for Output {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "console" => Ok(Output::Console),
            "file" => Ok(Output::File),
            other => Err(Error::ConfigValidation(format!(
                "unknown output mode '{}' (expected console or file)",
                other
            ))),
        }
    }
}

/// How a tracing event becomes bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Json,
    Text,
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "json" => Ok(Encoding::Json),
            "text" => Ok(Encoding::Text),
            other => Err(Error::ConfigValidation(format!(
                "unknown encoding '{}' (expected json or text)",
                other
            ))),
        }
    }
}

/// Configuration exactly as written in the file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawLogConfig {
    pub log_output: String,
    pub log_level_min: String,
    pub log_level_max: String,
    pub log_rotation_time: String,
    pub log_timezone: String,
    pub log_encoding: String,
    pub log_split_debug: bool,
    pub log_info_dir: String,
    pub log_info_name: String,
    /// `None` aliases the stream under its base name; `Some("")` disables the alias.
    pub log_info_symlink: Option<String>,
    pub log_debug_dir: String,
    pub log_debug_name: String,
    pub log_debug_symlink: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    log: RawLogConfig,
}

impl RawLogConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile =
            serde_yaml::from_str(content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(file.log)
    }

    /// Overrides fields from `lookup(KEY)` for every non-empty value.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let strings: [(&str, &mut String); 10] = [
            ("LOG_OUTPUT", &mut self.log_output),
            ("LOG_LEVEL_MIN", &mut self.log_level_min),
            ("LOG_LEVEL_MAX", &mut self.log_level_max),
            ("LOG_ROTATION_TIME", &mut self.log_rotation_time),
            ("LOG_TIMEZONE", &mut self.log_timezone),
            ("LOG_ENCODING", &mut self.log_encoding),
            ("LOG_INFO_DIR", &mut self.log_info_dir),
            ("LOG_INFO_NAME", &mut self.log_info_name),
            ("LOG_DEBUG_DIR", &mut self.log_debug_dir),
            ("LOG_DEBUG_NAME", &mut self.log_debug_name),
        ];
        for (key, field) in strings {
            if let Some(value) = get(key) {
                *field = value;
            }
        }

        if let Some(value) = get("LOG_INFO_SYMLINK") {
            self.log_info_symlink = Some(value);
        }
        if let Some(value) = get("LOG_DEBUG_SYMLINK") {
            self.log_debug_symlink = Some(value);
        }
        if let Some(value) = get("LOG_SPLIT_DEBUG") {
            self.log_split_debug = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Checks every setting and resolves defaults.
    ///
    /// Nothing is logged here, since no subscriber may exist yet. Recoverable
    /// problems end up in [`LogSettings::warnings`].
    pub fn validate(&self) -> Result<LogSettings> {
        let output: Output = self.log_output.parse()?;
        let min = parse_level(&self.log_level_min, Level::Info)?;
        let max = parse_level(&self.log_level_max, Level::Error)?;
        let range = LevelRange::new(min, max)?;
        let (rotation, rotation_warning) = Granularity::resolve(&self.log_rotation_time);
        let zone: Zone = self.log_timezone.parse()?;
        let encoding: Encoding = self.log_encoding.parse()?;

        let streams = match output {
            Output::Console => Vec::new(),
            Output::File => self.streams(range, rotation)?,
        };

        Ok(LogSettings {
            output,
            range,
            rotation,
            zone,
            encoding,
            streams,
            warnings: rotation_warning.into_iter().collect(),
        })
    }

    fn streams(&self, range: LevelRange, rotation: Granularity) -> Result<Vec<StreamSettings>> {
        let info_dir = resolve_dir(&self.log_info_dir, None);
        let info = StreamDraft {
            name: "info",
            dir: info_dir.clone(),
            file_name: or_default(&self.log_info_name, DEFAULT_INFO_NAME),
            symlink: self.log_info_symlink.as_deref(),
        };

        if !self.log_split_debug {
            return Ok(vec![info.build(range, rotation)?]);
        }

        let debug = StreamDraft {
            name: "debug",
            dir: resolve_dir(&self.log_debug_dir, Some(info_dir)),
            file_name: or_default(&self.log_debug_name, DEFAULT_DEBUG_NAME),
            symlink: self.log_debug_symlink.as_deref(),
        };
        if info.dir == debug.dir && info.file_name == debug.file_name {
            return Err(Error::ConfigValidation(format!(
                "info and debug streams both write {}",
                info.dir.join(info.file_name).display()
            )));
        }

        let mut streams = Vec::with_capacity(2);
        if let Ok(upper) = LevelRange::new(range.min().max(Level::Info), range.max()) {
            streams.push(info.build(upper, rotation)?);
        }
        if let Ok(lower) = LevelRange::new(range.min(), range.max().min(Level::Debug)) {
            streams.push(debug.build(lower, rotation)?);
        }

        if let [a, b] = streams.as_slice() {
            if a.alias.is_some() && a.alias == b.alias {
                return Err(Error::ConfigValidation(format!(
                    "info and debug streams share the alias {}",
                    a.pattern.dir().join(a.alias_name().unwrap_or_default()).display()
                )));
            }
        }
        Ok(streams)
    }
}

struct StreamDraft<'a> {
    name: &'static str,
    dir: PathBuf,
    file_name: &'a str,
    symlink: Option<&'a str>,
}

impl StreamDraft<'_> {
    fn build(&self, range: LevelRange, rotation: Granularity) -> Result<StreamSettings> {
        let pattern = FilenamePattern::new(self.dir.clone(), rotation, self.file_name)?;
        let alias = match self.symlink.map(str::trim) {
            None => Some(self.file_name),
            Some("") => None,
            Some(name) => Some(name),
        };
        let alias = alias
            .map(|name| Symlink::new(self.dir.clone(), name))
            .transpose()?;
        Ok(StreamSettings {
            name: self.name.to_string(),
            range,
            pattern,
            alias,
        })
    }
}

/// One validated output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub name: String,
    pub range: LevelRange,
    pub pattern: FilenamePattern,
    pub alias: Option<Symlink>,
}

impl StreamSettings {
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_ref().map(Symlink::name)
    }
}

/// Fully validated settings; the only input the sink selector accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub output: Output,
    pub range: LevelRange,
    pub rotation: Granularity,
    pub zone: Zone,
    pub encoding: Encoding,
    pub streams: Vec<StreamSettings>,
    /// Fallbacks taken during validation, for [`report_warnings`](Self::report_warnings).
    pub warnings: Vec<String>,
}

impl LogSettings {
    pub fn console() -> Self {
        Self {
            output: Output::Console,
            range: LevelRange::all(),
            rotation: Granularity::default(),
            zone: Zone::default(),
            encoding: Encoding::default(),
            streams: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Logs the validation warnings. Call once the subscriber is installed.
    pub fn report_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }

    /// Least severe level that reaches any output.
    pub fn min_level(&self) -> Level {
        match self.output {
            Output::Console => self.range.min(),
            Output::File => self
                .streams
                .iter()
                .map(|s| s.range.min())
                .min()
                .unwrap_or(self.range.min()),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Output::Console => "console",
            Output::File => "file",
        })
    }
}

fn parse_level(value: &str, default: Level) -> Result<Level> {
    if value.trim().is_empty() {
        Ok(default)
    } else {
        value.parse()
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    match value.trim() {
        "" => default,
        trimmed => trimmed,
    }
}

fn resolve_dir(value: &str, fallback: Option<PathBuf>) -> PathBuf {
    match value.trim() {
        "" => fallback.unwrap_or_else(|| PathBuf::from(DEFAULT_DIR)),
        trimmed => expand_home(trimmed),
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
