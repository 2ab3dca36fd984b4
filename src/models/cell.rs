use calamine::{Data, DataType};
use chrono::{NaiveDateTime, NaiveTime};

/// A spreadsheet cell reduced to the encodings the importer understands,
/// or nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Numbers, untyped serial dates and day fractions
    Numeric(f64),
    Text(String),
    /// Date-formatted cells, with the workbook's epoch already applied
    DateTime(NaiveDateTime),
    /// Time-of-day or duration cells without a date part
    Time(NaiveTime),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Raw value as shown in diagnostics
    pub fn describe(&self) -> String {
        match self {
            CellValue::Numeric(n) => n.to_string(),
            CellValue::Text(s) => format!("'{}'", s),
            CellValue::DateTime(dt) => dt.to_string(),
            CellValue::Time(t) => t.to_string(),
            CellValue::Empty => "<empty>".to_string(),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Float(f) => CellValue::Numeric(*f),
            Data::Int(i) => CellValue::Numeric(*i as f64),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map_or(CellValue::Numeric(dt.as_f64()), CellValue::DateTime),
            // ODS date-value cells and xlsx `t="d"` cells
            Data::DateTimeIso(s) => data
                .as_datetime()
                .or_else(|| data.as_date().map(|d| d.and_time(NaiveTime::MIN)))
                .map(CellValue::DateTime)
                .or_else(|| data.as_time().map(CellValue::Time))
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            // ODS time-value cells, e.g. PT12H00M00S
            Data::DurationIso(s) => data
                .as_time()
                .map_or_else(|| CellValue::Text(s.clone()), CellValue::Time),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::Error(e) => CellValue::Text(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }
}

impl From<Option<&Data>> for CellValue {
    fn from(data: Option<&Data>) -> Self {
        data.map_or(CellValue::Empty, CellValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;

    fn datetime(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_numeric_encodings() {
        assert_eq!(CellValue::from(&Data::Float(12.5)), CellValue::Numeric(12.5));
        assert_eq!(CellValue::from(&Data::Int(745)), CellValue::Numeric(745.0));
    }

    #[test]
    fn test_text_encodings() {
        assert_eq!(
            CellValue::from(&Data::String("31.12.2024".to_string())),
            CellValue::text("31.12.2024")
        );
        assert_eq!(CellValue::from(&Data::Bool(true)), CellValue::text("true"));
        assert!(matches!(
            CellValue::from(&Data::Error(CellErrorType::Div0)),
            CellValue::Text(_)
        ));
    }

    #[test]
    fn test_formatted_serials_use_the_workbook_epoch() {
        let serial = |value, is_1904| {
            CellValue::from(&Data::DateTime(ExcelDateTime::new(
                value,
                ExcelDateTimeType::DateTime,
                is_1904,
            )))
        };

        assert_eq!(serial(45657.5, false), CellValue::DateTime(datetime(2024, 12, 31, 12)));
        // Same day in a workbook saved with the 1904 date system
        assert_eq!(serial(44195.0, true), CellValue::DateTime(datetime(2024, 12, 31, 0)));
    }

    #[test]
    fn test_iso_dates_and_durations() {
        assert_eq!(
            CellValue::from(&Data::DateTimeIso("2024-12-31".to_string())),
            CellValue::DateTime(datetime(2024, 12, 31, 0))
        );
        assert_eq!(
            CellValue::from(&Data::DateTimeIso("2024-12-31T21:00:00".to_string())),
            CellValue::DateTime(datetime(2024, 12, 31, 21))
        );
        assert_eq!(
            CellValue::from(&Data::DurationIso("PT12H00M00S".to_string())),
            CellValue::Time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
        );
        assert_eq!(
            CellValue::from(&Data::DurationIso("P2D".to_string())),
            CellValue::text("P2D")
        );
    }

    #[test]
    fn test_missing_cells_are_empty() {
        assert!(CellValue::from(&Data::Empty).is_empty());
        assert!(CellValue::from(None::<&Data>).is_empty());
    }

    #[test]
    fn test_describe() {
        assert_eq!(CellValue::Numeric(0.5).describe(), "0.5");
        assert_eq!(CellValue::text("abc").describe(), "'abc'");
        assert_eq!(
            CellValue::DateTime(datetime(2024, 1, 2, 6)).describe(),
            "2024-01-02 06:00:00"
        );
        assert_eq!(CellValue::Empty.describe(), "<empty>");
    }
}
