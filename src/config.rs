//! Importer configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `METEO_*` environment variables. Command-line flags are applied on top by
//! the CLI.

use chrono::FixedOffset;
use clap::ValueEnum;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_DATABASE_PATH, DEFAULT_DATE_FORMATS, DEFAULT_FILE_TIMEOUT_SECS,
    DEFAULT_HEADER_ROWS, DEFAULT_STATION_UTC_OFFSET,
};

/// Which sheets of a workbook are imported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SheetSelection {
    #[default]
    All,
    First,
}

/// Storage uniqueness rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// (date, time) is the primary key; re-imports report conflicts
    #[default]
    Natural,
    /// Autoincrement id; duplicate observations are stored again
    Surrogate,
}

/// What happens to rows that fail range validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRowPolicy {
    #[default]
    Drop,
    /// Keep a diagnostic per rejected row
    Collect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MonthLocale {
    #[default]
    Ru,
    En,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub database_path: PathBuf,
    pub header_rows: u32,
    pub sheets: SheetSelection,
    pub key_policy: KeyPolicy,
    pub invalid_rows: InvalidRowPolicy,
    pub date_formats: Vec<String>,
    /// Offset the observation times are recorded in, e.g. "+03:00"
    pub station_utc_offset: String,
    pub month_locale: MonthLocale,
    pub file_timeout_secs: u64,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            header_rows: DEFAULT_HEADER_ROWS,
            sheets: SheetSelection::default(),
            key_policy: KeyPolicy::default(),
            invalid_rows: InvalidRowPolicy::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            station_utc_offset: DEFAULT_STATION_UTC_OFFSET.to_string(),
            month_locale: MonthLocale::default(),
            file_timeout_secs: DEFAULT_FILE_TIMEOUT_SECS,
        }
    }
}

impl ImporterConfig {
    /// Load configuration from `path` (required when given) or from
    /// `meteo-archive.toml` in the working directory if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("METEO").try_parsing(true))
            .build()?;

        let config: ImporterConfig = settings.try_deserialize()?;
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_formats.is_empty() {
            return Err(ProcessingError::Config(
                "date_formats must list at least one pattern".to_string(),
            ));
        }

        if self.file_timeout_secs == 0 {
            return Err(ProcessingError::Config(
                "file_timeout_secs must be positive".to_string(),
            ));
        }

        self.utc_offset()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(&self.station_utc_offset).ok_or_else(|| {
            ProcessingError::Config(format!(
                "Invalid station_utc_offset '{}'. Expected format: '+HH:MM'",
                self.station_utc_offset
            ))
        })
    }
}

/// Parse "+HH:MM", "-HH:MM", "+HH", "Z" or "UTC"
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (rest.parse::<i32>().ok()?, 0),
    };

    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
