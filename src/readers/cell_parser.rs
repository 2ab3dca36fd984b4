use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::models::CellValue;
use crate::utils::constants::{DEFAULT_DATE_FORMATS, TIME_FORMATS};
use crate::utils::{serial_to_date, serial_to_time};

/// Logical type a cell is being read as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Date,
    Time,
    Integer,
    Decimal,
    Double,
    OptionalDouble,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Date => "date",
            CellKind::Time => "time",
            CellKind::Integer => "integer",
            CellKind::Decimal => "decimal",
            CellKind::Double => "number",
            CellKind::OptionalDouble => "optional number",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConversionFailure {
    Missing,
    Unparseable,
}

/// Converts untyped cells into typed values.
///
/// Never fails: a cell that cannot be read as the requested type yields that
/// type's default (or `None` for optional numbers), a diagnostic event, and a
/// bump of the fallback counter.
#[derive(Debug, Clone)]
pub struct CellParser {
    date_formats: Vec<String>,
    fallbacks: Cell<usize>,
}

impl CellParser {
    pub fn new() -> Self {
        Self::with_date_formats(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }

    /// Text date patterns are tried in the given order; first match wins.
    pub fn with_date_formats(date_formats: Vec<String>) -> Self {
        Self {
            date_formats,
            fallbacks: Cell::new(0),
        }
    }

    /// Sentinel returned for dates that cannot be read
    pub fn min_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn fallback_count(&self) -> usize {
        self.fallbacks.get()
    }

    /// Return the fallback count and reset it to zero
    pub fn take_fallbacks(&self) -> usize {
        self.fallbacks.replace(0)
    }

    /// Typed date cells are taken as-is; the time part is ignored.
    pub fn parse_date(&self, cell: &CellValue) -> NaiveDate {
        let parsed = match cell {
            CellValue::DateTime(dt) => Ok(dt.date()),
            _ => self.convert(cell, serial_to_date, |text| {
                self.date_formats
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            }),
        };
        parsed.unwrap_or_else(|failure| {
            self.fallback(cell, CellKind::Date, failure, Self::min_date())
        })
    }

    pub fn parse_time(&self, cell: &CellValue) -> NaiveTime {
        let parsed = match cell {
            CellValue::DateTime(dt) => Ok(dt.time()),
            CellValue::Time(time) => Ok(*time),
            _ => self.convert(cell, serial_to_time, |text| {
                TIME_FORMATS
                    .iter()
                    .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
            }),
        };
        parsed.unwrap_or_else(|failure| {
            self.fallback(cell, CellKind::Time, failure, NaiveTime::MIN)
        })
    }

    /// One fractional digit, midpoint rounded away from zero
    pub fn parse_decimal(&self, cell: &CellValue) -> Decimal {
        self.convert(cell, Decimal::from_f64, parse_decimal_text)
            .map(|value| value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
            .unwrap_or_else(|failure| {
                self.fallback(cell, CellKind::Decimal, failure, Decimal::ZERO)
            })
    }

    pub fn parse_f64(&self, cell: &CellValue) -> f64 {
        self.convert(cell, finite, parse_f64_text)
            .unwrap_or_else(|failure| self.fallback(cell, CellKind::Double, failure, 0.0))
    }

    /// Empty cells are absent without a diagnostic; unreadable text is absent with one.
    pub fn parse_optional_f64(&self, cell: &CellValue) -> Option<f64> {
        match self.convert(cell, finite, parse_f64_text) {
            Ok(value) => Some(value),
            Err(ConversionFailure::Missing) => None,
            Err(failure) => self.fallback(cell, CellKind::OptionalDouble, failure, None),
        }
    }

    /// Numeric cells round half to even before narrowing to `i32`.
    pub fn parse_i32(&self, cell: &CellValue) -> i32 {
        self.convert(cell, round_to_i32, |text| text.parse::<i32>().ok())
            .unwrap_or_else(|failure| self.fallback(cell, CellKind::Integer, failure, 0))
    }

    pub fn parse_string(&self, cell: &CellValue) -> String {
        match cell {
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Numeric(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Numeric(n) => n.to_string(),
            CellValue::DateTime(dt) if dt.time() == NaiveTime::MIN => dt.date().to_string(),
            CellValue::DateTime(dt) => dt.to_string(),
            CellValue::Time(time) => time.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Date and time cells are never read as numbers.
    fn convert<T>(
        &self,
        cell: &CellValue,
        from_numeric: impl FnOnce(f64) -> Option<T>,
        from_text: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, ConversionFailure> {
        match cell {
            CellValue::Numeric(n) => from_numeric(*n).ok_or(ConversionFailure::Unparseable),
            CellValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(ConversionFailure::Missing);
                }
                from_text(text).ok_or(ConversionFailure::Unparseable)
            }
            CellValue::DateTime(_) | CellValue::Time(_) => Err(ConversionFailure::Unparseable),
            CellValue::Empty => Err(ConversionFailure::Missing),
        }
    }

    fn fallback<T: fmt::Debug>(
        &self,
        cell: &CellValue,
        kind: CellKind,
        failure: ConversionFailure,
        default: T,
    ) -> T {
        self.fallbacks.set(self.fallbacks.get() + 1);

        match failure {
            ConversionFailure::Missing => {
                debug!("Empty cell read as {}, using {:?}", kind, default);
            }
            ConversionFailure::Unparseable => {
                warn!(
                    "Could not convert {} to {}, using {:?}",
                    cell.describe(),
                    kind,
                    default
                );
            }
        }

        default
    }
}

impl Default for CellParser {
    fn default() -> Self {
        Self::new()
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn round_to_i32(value: f64) -> Option<i32> {
    let rounded = value.round_ties_even();
    if rounded.is_finite() && rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64 {
        Some(rounded as i32)
    } else {
        None
    }
}

fn parse_f64_text(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().and_then(finite)
}

fn parse_decimal_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
