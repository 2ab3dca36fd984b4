pub mod sqlite_store;

pub use sqlite_store::SqliteStore;

use serde::{Deserialize, Serialize};

use crate::config::MonthLocale;
use crate::error::{ProcessingError, Result};
use crate::models::WeatherRecord;
use crate::utils::constants::{MONTH_NAMES_EN, MONTH_NAMES_RU};

/// Result of storing one record. Each insert commits on its own, so an
/// outcome never affects records stored before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same key is already stored
    Conflict(String),
    Failed(String),
}

/// Durable sink for imported records
pub trait RecordStore {
    fn insert(&mut self, record: &WeatherRecord) -> InsertOutcome;
}

/// Year/month selection; 0 in either field matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherFilter {
    pub year: i32,
    pub month: u32,
}

impl WeatherFilter {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if month > 12 {
            return Err(ProcessingError::InvalidFilter(format!(
                "month must be between 1 and 12 (or 0 for all), got {}",
                month
            )));
        }
        if year < 0 {
            return Err(ProcessingError::InvalidFilter(format!(
                "year must not be negative, got {}",
                year
            )));
        }
        Ok(Self { year, month })
    }

    pub fn all() -> Self {
        Self::default()
    }
}

/// Display names for months 1 through 12
pub fn month_names(locale: MonthLocale) -> [&'static str; 12] {
    match locale {
        MonthLocale::Ru => MONTH_NAMES_RU,
        MonthLocale::En => MONTH_NAMES_EN,
    }
}
