//! Sink configuration types
//!
//! Configuration is a plain typed struct with a closed set of fields,
//! validated at construction time. Deserializable from TOML:
//!
//! ```toml
//! [sink]
//! directory = "log"
//! base_name = "app.log"
//! rotation = "day"
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::error::ConfigurationError;

/// Granularity of the rotation time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationUnit {
    /// One file per calendar day (bucket key `YYYYMMDD`)
    Day,
    /// One file per calendar month (bucket key `YYYYMM`)
    Month,
}

impl RotationUnit {
    /// Date format string for this unit's bucket key
    fn date_format(&self) -> &'static str {
        match self {
            RotationUnit::Day => "%Y%m%d",
            RotationUnit::Month => "%Y%m",
        }
    }

    /// Compute the bucket key for the given time
    pub(crate) fn bucket_key(&self, now: DateTime<Local>) -> String {
        now.format(self.date_format()).to_string()
    }

    /// Check whether the given bucket is stale at the given time
    pub(crate) fn needs_rotation(&self, current_bucket: &str, now: DateTime<Local>) -> bool {
        current_bucket != self.bucket_key(now)
    }
}

/// Configuration for a [`RotatingFileSink`](crate::RotatingFileSink)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RotatingSinkConfig {
    /// Target directory for log files (created recursively if missing)
    pub directory: PathBuf,

    /// Fixed suffix of the per-bucket filename
    /// (e.g. `app.log` -> `20240115_app.log`)
    pub base_name: String,

    /// Rotation granularity
    pub rotation: RotationUnit,
}

impl Default for RotatingSinkConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("log"),
            base_name: "app.log".into(),
            rotation: RotationUnit::Day,
        }
    }
}

impl RotatingSinkConfig {
    /// Create config with a custom directory
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Create config with a custom base name
    #[must_use]
    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    /// Create config with daily rotation
    #[must_use]
    pub fn with_daily_rotation(mut self) -> Self {
        self.rotation = RotationUnit::Day;
        self
    }

    /// Create config with monthly rotation
    #[must_use]
    pub fn with_monthly_rotation(mut self) -> Self {
        self.rotation = RotationUnit::Month;
        self
    }

    /// Validate the configuration
    ///
    /// The base name must be a plain filename suffix: non-empty and free of
    /// path separators, so the bucket prefix cannot be escaped into another
    /// directory.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.base_name.is_empty() {
            return Err(ConfigurationError::InvalidBaseName {
                name: self.base_name.clone(),
                reason: "base name must not be empty",
            });
        }
        if self.base_name.contains(['/', '\\']) {
            return Err(ConfigurationError::InvalidBaseName {
                name: self.base_name.clone(),
                reason: "base name must not contain path separators",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).single().unwrap()
    }

    #[test]
    fn day_bucket_key_format() {
        assert_eq!(RotationUnit::Day.bucket_key(at(2024, 1, 15, 23, 59, 59)), "20240115");
    }

    #[test]
    fn month_bucket_key_format() {
        assert_eq!(RotationUnit::Month.bucket_key(at(2024, 1, 15, 0, 0, 0)), "202401");
    }

    #[test]
    fn same_bucket_needs_no_rotation() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let bucket = RotationUnit::Day.bucket_key(now);
        assert!(!RotationUnit::Day.needs_rotation(&bucket, now));
    }

    #[test]
    fn stale_bucket_needs_rotation() {
        let now = at(2024, 1, 16, 0, 0, 1);
        assert!(RotationUnit::Day.needs_rotation("20240115", now));
        assert!(RotationUnit::Month.needs_rotation("202312", now));
    }

    #[test]
    fn config_defaults() {
        let config = RotatingSinkConfig::default();
        assert_eq!(config.directory, PathBuf::from("log"));
        assert_eq!(config.base_name, "app.log");
        assert_eq!(config.rotation, RotationUnit::Day);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builders() {
        let config = RotatingSinkConfig::default()
            .with_directory("/var/log/myapp")
            .with_base_name("worker.log")
            .with_monthly_rotation();
        assert_eq!(config.directory, PathBuf::from("/var/log/myapp"));
        assert_eq!(config.base_name, "worker.log");
        assert_eq!(config.rotation, RotationUnit::Month);
    }

    #[test]
    fn config_rejects_empty_base_name() {
        let config = RotatingSinkConfig::default().with_base_name("");
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidBaseName { .. })
        ));
    }

    #[test]
    fn config_rejects_path_separators() {
        let config = RotatingSinkConfig::default().with_base_name("../escape.log");
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidBaseName { .. })
        ));
    }

    #[test]
    fn config_deserializes_from_toml() {
        let config: RotatingSinkConfig = toml::from_str(
            r#"
            directory = "out/logs"
            base_name = "svc.log"
            rotation = "month"
            "#,
        )
        .unwrap();
        assert_eq!(config.directory, PathBuf::from("out/logs"));
        assert_eq!(config.base_name, "svc.log");
        assert_eq!(config.rotation, RotationUnit::Month);
    }

    #[test]
    fn config_toml_defaults_for_omitted_keys() {
        let config: RotatingSinkConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_name, "app.log");
        assert_eq!(config.rotation, RotationUnit::Day);
    }
}
