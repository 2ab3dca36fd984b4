//! Weather station archive: imports hourly observation workbooks, validates
//! each row against physical ranges and stores the result in SQLite.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod store;
pub mod utils;

pub use config::ImporterConfig;
pub use error::{ProcessingError, Result};
pub use models::WeatherRecord;
