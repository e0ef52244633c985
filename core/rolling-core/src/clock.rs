//! Rotation clock: maps an instant onto the start of its rotation bucket.
//!
//! All arithmetic happens on wall-clock [`NaiveDateTime`] values read from a
//! single [`Zone`], so a process never mixes local and UTC buckets.
//!
//! | Granularity | Bucket start        | Rendered fragment  |
//! |-------------|---------------------|--------------------|
//! | `Day`       | `00:00:00` that day | `YYYY-MM-DD`       |
//! | `Hour`      | `HH:00:00`          | `YYYY-MM-DD-HH`    |
//! | `Minute`    | `HH:MM:00`          | `YYYY-MM-DD-HH-mm` |

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    Minute,
    #[default]
    Hour,
    Day,
}

impl Granularity {
    /// strftime fragment used in rotated filenames.
    pub fn time_format(self) -> &'static str {
        match self {
            Granularity::Minute => "%Y-%m-%d-%H-%M",
            Granularity::Hour => "%Y-%m-%d-%H",
            Granularity::Day => "%Y-%m-%d",
        }
    }

    pub fn bucket_start(self, t: NaiveDateTime) -> NaiveDateTime {
        let time = match self {
            Granularity::Minute => NaiveTime::from_hms_opt(t.hour(), t.minute(), 0),
            Granularity::Hour => NaiveTime::from_hms_opt(t.hour(), 0, 0),
            Granularity::Day => NaiveTime::from_hms_opt(0, 0, 0),
        };
        t.date().and_time(time.unwrap_or_default())
    }

    /// Renders the bucket containing `t` with this granularity's fragment.
    pub fn render(self, t: NaiveDateTime) -> String {
        self.bucket_start(t).format(self.time_format()).to_string()
    }

    /// Parses a configured rotation setting.
    ///
    /// Empty means "not configured" and yields `Hour` quietly. Anything
    /// unrecognised also yields `Hour`, but with a warning.
    pub fn from_setting(value: &str) -> Self {
        let (granularity, warning) = Self::resolve(value);
        if let Some(warning) = warning {
            tracing::warn!(rotation = %value.trim(), "{}", warning);
        }
        granularity
    }

    /// Like [`from_setting`](Self::from_setting), but hands the fallback
    /// warning back instead of logging it, for callers that run before a
    /// subscriber exists.
    pub fn resolve(value: &str) -> (Self, Option<String>) {
        let value = value.trim();
        if value.is_empty() {
            return (Granularity::default(), None);
        }
        match value.parse() {
            Ok(granularity) => (granularity, None),
            Err(_) => (
                Granularity::Hour,
                Some(format!(
                    "Unknown rotation granularity '{}', falling back to hourly rotation",
                    value
                )),
            ),
        }
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" | "minute" => Ok(Granularity::Minute),
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            other => Err(Error::ConfigValidation(format!(
                "unknown rotation granularity '{}' (expected day, hour or min)",
                other
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Minute => "min",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
        })
    }
}

/// The single time zone a process rotates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    #[default]
    Local,
    Utc,
}

impl Zone {
    pub fn now(self) -> NaiveDateTime {
        match self {
            Zone::Local => Local::now().naive_local(),
            Zone::Utc => Utc::now().naive_utc(),
        }
    }
}

impl FromStr for Zone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "local" => Ok(Zone::Local),
            "utc" => Ok(Zone::Utc),
            other => Err(Error::ConfigValidation(format!(
                "unknown timezone '{}' (expected local or utc)",
                other
            ))),
        }
    }
}

/// Source of "now" for rotation decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        self.zone.now()
    }
}

/// A clock that only moves when told to.
///
/// Share it through an `Arc` to drive a writer across bucket boundaries
/// without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
