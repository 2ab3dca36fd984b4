use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{MAX_VALID_TEMP, MIN_VALID_TEMP};

/// One station observation: a single row of the archive spreadsheet.
///
/// Range rules live on the fields and are checked together by
/// [`Validate::validate`]; a record either passes all of them or is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub time_of_day: NaiveTime,

    // Air temperature, 0.1°C resolution
    #[validate(custom(function = "validate_celsius"))]
    pub temperature: Decimal,

    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: f64,

    // Dew point, 0.1°C resolution
    #[validate(custom(function = "validate_celsius"))]
    pub dew_point: Decimal,

    // Station pressure, mm Hg
    #[validate(range(min = 600, max = 900))]
    pub pressure: i32,

    #[validate(custom(function = "validate_wind_direction"))]
    pub wind_direction: String,

    // m/s
    #[validate(range(min = 0))]
    pub wind_speed: i32,

    // Total cloud cover, %
    #[validate(range(min = 0.0, max = 100.0))]
    pub cloudiness: Option<f64>,

    // Precipitation amount (H), mm
    #[validate(range(exclusive_min = 0.0))]
    pub precipitation: f64,

    // Horizontal visibility (VV), km
    pub visibility: Option<f64>,

    pub weather_phenomena: String,
}

fn validate_celsius(value: &Decimal) -> std::result::Result<(), ValidationError> {
    let min = Decimal::from_f64_retain(MIN_VALID_TEMP).unwrap_or(Decimal::MIN);
    let max = Decimal::from_f64_retain(MAX_VALID_TEMP).unwrap_or(Decimal::MAX);

    if *value < min || *value > max {
        return Err(ValidationError::new("range"));
    }
    Ok(())
}

fn validate_wind_direction(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl WeatherRecord {
    pub fn builder() -> WeatherRecordBuilder {
        WeatherRecordBuilder::new()
    }

    /// Uniqueness key in storage
    pub fn natural_key(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.time_of_day)
    }

    pub fn key_label(&self) -> String {
        format!("{} {}", self.date, self.time_of_day.format("%H:%M:%S"))
    }

    /// Observation instant, reading date and time in the station's offset.
    pub fn observed_at(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        self.date
            .and_time(self.time_of_day)
            .and_local_timezone(offset)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Default)]
pub struct WeatherRecordBuilder {
    date: Option<NaiveDate>,
    time_of_day: Option<NaiveTime>,
    temperature: Decimal,
    humidity: f64,
    dew_point: Decimal,
    pressure: i32,
    wind_direction: String,
    wind_speed: i32,
    cloudiness: Option<f64>,
    precipitation: f64,
    visibility: Option<f64>,
    weather_phenomena: String,
}

impl WeatherRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn time_of_day(mut self, time: NaiveTime) -> Self {
        self.time_of_day = Some(time);
        self
    }

    pub fn temperature(mut self, temperature: Decimal) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn humidity(mut self, humidity: f64) -> Self {
        self.humidity = humidity;
        self
    }

    pub fn dew_point(mut self, dew_point: Decimal) -> Self {
        self.dew_point = dew_point;
        self
    }

    pub fn pressure(mut self, pressure: i32) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn wind(mut self, direction: impl Into<String>, speed: i32) -> Self {
        self.wind_direction = direction.into();
        self.wind_speed = speed;
        self
    }

    pub fn cloudiness(mut self, cloudiness: Option<f64>) -> Self {
        self.cloudiness = cloudiness;
        self
    }

    pub fn precipitation(mut self, precipitation: f64) -> Self {
        self.precipitation = precipitation;
        self
    }

    pub fn visibility(mut self, visibility: Option<f64>) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn weather_phenomena(mut self, phenomena: impl Into<String>) -> Self {
        self.weather_phenomena = phenomena.into();
        self
    }

    /// Assemble the record without range checks; those belong to the validator.
    pub fn build(self) -> Result<WeatherRecord> {
        Ok(WeatherRecord {
            date: self
                .date
                .ok_or_else(|| ProcessingError::MissingData("date".to_string()))?,
            time_of_day: self
                .time_of_day
                .ok_or_else(|| ProcessingError::MissingData("time_of_day".to_string()))?,
            temperature: self.temperature,
            humidity: self.humidity,
            dew_point: self.dew_point,
            pressure: self.pressure,
            wind_direction: self.wind_direction,
            wind_speed: self.wind_speed,
            cloudiness: self.cloudiness,
            precipitation: self.precipitation,
            visibility: self.visibility,
            weather_phenomena: self.weather_phenomena,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeatherRecord {
        WeatherRecord::builder()
            .date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
            .time_of_day(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
            .temperature(Decimal::new(-34, 1))
            .humidity(86.0)
            .dew_point(Decimal::new(-56, 1))
            .pressure(745)
            .wind("Ветер, дующий с северо-запада", 3)
            .cloudiness(Some(100.0))
            .precipitation(0.3)
            .visibility(Some(10.0))
            .weather_phenomena("Снег")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_pattern() {
        let record = sample();

        assert_eq!(record.key_label(), "2024-12-31 12:00:00");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_builder_requires_key_fields() {
        let missing_time = WeatherRecord::builder()
            .date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .build();
        assert!(missing_time.is_err());

        let missing_date = WeatherRecord::builder()
            .time_of_day(NaiveTime::from_hms_opt(0, 0, 0).unwrap())
            .build();
        assert!(missing_date.is_err());
    }

    #[test]
    fn test_observed_at_applies_station_offset() {
        let record = sample();
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();

        let utc = record.observed_at(moscow).unwrap();
        assert_eq!(utc.to_rfc3339(), "2024-12-31T09:00:00+00:00");
    }

    #[test]
    fn test_temperature_bounds_are_inclusive() {
        let mut record = sample();

        record.temperature = Decimal::new(500, 1);
        assert!(record.validate().is_ok());

        record.temperature = Decimal::new(-500, 1);
        assert!(record.validate().is_ok());

        record.temperature = Decimal::new(501, 1);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_blank_wind_direction_is_invalid() {
        let mut record = sample();
        record.wind_direction = "   ".to_string();

        let errors = record.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("wind_direction"));
    }
}
