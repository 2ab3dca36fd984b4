use validator::Validate;

use crate::error::Result;
use crate::models::WeatherRecord;

/// Applies the physical range rules to candidate records.
///
/// Every rule is evaluated; a record is accepted only when none is violated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_valid(&self, record: &WeatherRecord) -> bool {
        record.validate().is_ok()
    }

    /// Names of the violated fields, sorted
    pub fn violations(&self, record: &WeatherRecord) -> Vec<String> {
        match record.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort_unstable();
                fields
            }
        }
    }

    pub fn check(&self, record: &WeatherRecord) -> Result<()> {
        record.validate()?;
        Ok(())
    }
}
