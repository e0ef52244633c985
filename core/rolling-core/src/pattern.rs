//! Target filename pattern: `<dir>/<time-bucket>.<base-filename>`.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;

use crate::clock::Granularity;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePattern {
    dir: PathBuf,
    base: String,
    granularity: Granularity,
    format: String,
}

impl FilenamePattern {
    /// Compiles the pattern, rejecting names that would escape `dir`.
    pub fn new(dir: impl Into<PathBuf>, granularity: Granularity, base: &str) -> Result<Self> {
        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            return Err(Error::ConfigValidation(
                "log directory must not be empty".to_string(),
            ));
        }
        validate_file_name("base filename", base)?;

        // The base name is literal text, not strftime input.
        let format = format!("{}.{}", granularity.time_format(), base.replace('%', "%%"));
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::ConfigValidation(format!(
                "filename pattern '{}' does not compile",
                format
            )));
        }

        Ok(Self {
            dir,
            base: base.to_string(),
            granularity,
            format,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Filename (relative to [`dir`](Self::dir)) of the bucket containing `now`.
    pub fn filename_for(&self, now: NaiveDateTime) -> String {
        self.granularity
            .bucket_start(now)
            .format(&self.format)
            .to_string()
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

/// A plain file name: non-empty, no separators, not `.` or `..`.
pub(crate) fn validate_file_name(what: &str, name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.trim() != name;
    if bad {
        return Err(Error::ConfigValidation(format!(
            "{} '{}' must be a plain file name",
            what, name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_filename_prefixes_bucket_to_base() {
        let pattern = FilenamePattern::new("log", Granularity::Hour, "logger.log").unwrap();
        assert_eq!(pattern.filename_for(at(10, 59, 58)), "2024-01-31-10.logger.log");
        assert_eq!(
            pattern.path_of("2024-01-31-10.logger.log"),
            PathBuf::from("log/2024-01-31-10.logger.log")
        );
    }

    #[test]
    fn test_day_and_minute_patterns() {
        let day = FilenamePattern::new("d", Granularity::Day, "app.log").unwrap();
        let min = FilenamePattern::new("d", Granularity::Minute, "app.log").unwrap();
        assert_eq!(day.filename_for(at(23, 1, 1)), "2024-01-31.app.log");
        assert_eq!(min.filename_for(at(23, 1, 1)), "2024-01-31-23-01.app.log");
    }

    #[test]
    fn test_percent_in_base_is_literal() {
        let pattern = FilenamePattern::new("log", Granularity::Day, "100%.log").unwrap();
        assert_eq!(pattern.filename_for(at(0, 0, 0)), "2024-01-31.100%.log");
    }

    #[test]
    fn test_rejects_path_like_base_names() {
        for base in ["", ".", "..", "a/b.log", "a\\b.log", " padded.log"] {
            let err = FilenamePattern::new("log", Granularity::Hour, base).unwrap_err();
            assert!(matches!(err, Error::ConfigValidation(_)), "accepted {:?}", base);
        }
    }

    #[test]
    fn test_rejects_empty_directory() {
        let err = FilenamePattern::new("", Granularity::Hour, "x.log").unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }
}
