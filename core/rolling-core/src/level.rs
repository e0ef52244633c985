//! Record severity and inclusive severity ranges.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    pub fn to_tracing(self) -> tracing::Level {
        match self {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        Level::ALL
            .into_iter()
            .find(|candidate| candidate.to_tracing() == *level)
            .unwrap_or(Level::Trace)
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(Error::ConfigValidation(format!(
                "unknown severity '{}' (expected trace, debug, info, warn or error)",
                other
            ))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `[min, max]` severity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelRange {
    min: Level,
    max: Level,
}

impl LevelRange {
    pub fn new(min: Level, max: Level) -> Result<Self, Error> {
        if min > max {
            return Err(Error::ConfigValidation(format!(
                "minimum severity {} is above maximum severity {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn all() -> Self {
        Self {
            min: Level::Trace,
            max: Level::Error,
        }
    }

    pub fn only(level: Level) -> Self {
        Self {
            min: level,
            max: level,
        }
    }

    pub fn min(&self) -> Level {
        self.min
    }

    pub fn max(&self) -> Level {
        self.max
    }

    pub fn contains(&self, level: Level) -> bool {
        self.min <= level && level <= self.max
    }

    pub fn overlaps(&self, other: &LevelRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

impl fmt::Display for LevelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_order_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!(" Debug ".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
    }

    #[test]
    fn test_unknown_severity_is_a_validation_error() {
        let err = "verbose".parse::<Level>().unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }

    #[test]
    fn test_tracing_round_trip() {
        for level in Level::ALL {
            assert_eq!(Level::from(&level.to_tracing()), level);
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = LevelRange::new(Level::Info, Level::Error).unwrap();
        assert!(!range.contains(Level::Debug));
        assert!(range.contains(Level::Info));
        assert!(range.contains(Level::Error));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(LevelRange::new(Level::Error, Level::Debug).is_err());
    }

    #[test]
    fn test_overlap_detection() {
        let upper = LevelRange::new(Level::Info, Level::Error).unwrap();
        let debug = LevelRange::only(Level::Debug);
        let warn_up = LevelRange::new(Level::Warn, Level::Error).unwrap();
        assert!(!upper.overlaps(&debug));
        assert!(upper.overlaps(&warn_up));
    }
}
