use tracing::debug_span;

use crate::models::{CellValue, WeatherRecord};
use crate::readers::cell_parser::CellParser;
use crate::readers::workbook_reader::Worksheet;
use crate::utils::constants::*;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Turns one worksheet row into a candidate record using the fixed
/// twelve-column layout.
#[derive(Debug, Clone, Default)]
pub struct RowParser {
    cells: CellParser,
}

impl RowParser {
    pub fn new(cells: CellParser) -> Self {
        Self { cells }
    }

    pub fn cell_parser(&self) -> &CellParser {
        &self.cells
    }

    /// `None` for structurally empty rows; otherwise exactly one record,
    /// possibly made of fallback values.
    pub fn parse_row(&self, sheet: &Worksheet, index: u32) -> Option<WeatherRecord> {
        let cells = sheet.row(index)?;
        let _span = debug_span!("row", sheet = sheet.name(), row = index + 1).entered();
        Some(self.parse_cells(&cells))
    }

    pub fn parse_cells(&self, cells: &[CellValue]) -> WeatherRecord {
        let cell = |col: u32| cells.get(col as usize).unwrap_or(&EMPTY_CELL);
        let p = &self.cells;

        WeatherRecord {
            date: p.parse_date(cell(COL_DATE)),
            time_of_day: p.parse_time(cell(COL_TIME)),
            temperature: p.parse_decimal(cell(COL_TEMPERATURE)),
            humidity: p.parse_f64(cell(COL_HUMIDITY)),
            dew_point: p.parse_decimal(cell(COL_DEW_POINT)),
            pressure: p.parse_i32(cell(COL_PRESSURE)),
            wind_direction: p.parse_string(cell(COL_WIND_DIRECTION)),
            wind_speed: p.parse_i32(cell(COL_WIND_SPEED)),
            cloudiness: p.parse_optional_f64(cell(COL_CLOUDINESS)),
            precipitation: p.parse_f64(cell(COL_PRECIPITATION)),
            visibility: p.parse_optional_f64(cell(COL_VISIBILITY)),
            weather_phenomena: p.parse_string(cell(COL_PHENOMENA)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Range};
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    fn observation_cells() -> Vec<CellValue> {
        vec![
            CellValue::text("31.12.2024"),
            CellValue::Numeric(0.875),
            CellValue::Numeric(-3.4),
            CellValue::Numeric(86.0),
            CellValue::text("-5.6"),
            CellValue::Numeric(745.0),
            CellValue::text("Ветер, дующий с северо-запада"),
            CellValue::Numeric(3.0),
            CellValue::Empty,
            CellValue::Numeric(0.3),
            CellValue::text("10.0"),
            CellValue::text("Снег"),
        ]
    }

    #[test]
    fn test_parse_cells_maps_every_column() {
        let parser = RowParser::default();
        let record = parser.parse_cells(&observation_cells());

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(record.time_of_day, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(record.temperature, Decimal::new(-34, 1));
        assert_eq!(record.humidity, 86.0);
        assert_eq!(record.dew_point, Decimal::new(-56, 1));
        assert_eq!(record.pressure, 745);
        assert_eq!(record.wind_direction, "Ветер, дующий с северо-запада");
        assert_eq!(record.wind_speed, 3);
        assert_eq!(record.cloudiness, None);
        assert_eq!(record.precipitation, 0.3);
        assert_eq!(record.visibility, Some(10.0));
        assert_eq!(record.weather_phenomena, "Снег");
        assert_eq!(parser.cell_parser().fallback_count(), 0);
    }

    #[test]
    fn test_short_rows_read_missing_columns_as_empty() {
        let parser = RowParser::default();
        let record = parser.parse_cells(&observation_cells()[..3]);

        assert_eq!(record.temperature, Decimal::new(-34, 1));
        assert_eq!(record.pressure, 0);
        assert_eq!(record.weather_phenomena, "");
    }

    #[test]
    fn test_parse_row_skips_structurally_empty_rows() {
        let mut range = Range::new((0, 0), (6, 11));
        range.set_value((5, 0), Data::Float(45657.0));
        let sheet = Worksheet::new("2024", range);
        let parser = RowParser::default();

        assert!(parser.parse_row(&sheet, 4).is_none());

        let record = parser.parse_row(&sheet, 5).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        // Every other column fell back to its default
        assert_eq!(record.pressure, 0);
        assert!(parser.cell_parser().fallback_count() > 0);
    }
}
