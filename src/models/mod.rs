pub mod cell;
pub mod weather;

pub use cell::CellValue;
pub use weather::{WeatherRecord, WeatherRecordBuilder};
