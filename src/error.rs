use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Reading {file} exceeded the {seconds}s timeout")]
    Timeout { file: String, seconds: u64 },

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
