use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{ImporterConfig, InvalidRowPolicy, KeyPolicy, MonthLocale, SheetSelection};

#[derive(Parser)]
#[command(name = "meteo-archive")]
#[command(about = "Weather station spreadsheet importer and archive")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Configuration file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "SQLite database path")]
    pub database: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import workbooks into the archive
    Import {
        #[arg(required = true, help = "Workbook files (xlsx, xls, xlsb, ods)")]
        files: Vec<PathBuf>,

        #[arg(long, value_enum)]
        sheets: Option<SheetSelection>,

        #[arg(long, value_enum)]
        key_policy: Option<KeyPolicy>,

        #[arg(long, value_enum, help = "Report rows that fail range checks")]
        invalid_rows: Option<InvalidRowPolicy>,

        #[arg(long, help = "Exit with an error if any diagnostic was produced")]
        strict: bool,

        #[arg(long, help = "Per-file read timeout in seconds")]
        timeout_secs: Option<u64>,
    },

    /// Parse and validate workbooks without storing anything
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long, value_enum)]
        sheets: Option<SheetSelection>,
    },

    /// List stored observations
    List {
        #[arg(short, long, default_value = "0", help = "Year (0 = all years)")]
        year: i32,

        #[arg(short, long, default_value = "0", help = "Month 1-12 (0 = all months)")]
        month: u32,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Years present in the archive
    Years,

    /// Month names for the period selector
    Months {
        #[arg(long, value_enum)]
        locale: Option<MonthLocale>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl Cli {
    /// Apply global flags on top of file and environment configuration
    pub fn apply_overrides(&self, config: &mut ImporterConfig) {
        if let Some(ref database) = self.database {
            config.database_path = database.clone();
        }

        match &self.command {
            Commands::Import {
                sheets,
                key_policy,
                invalid_rows,
                timeout_secs,
                ..
            } => {
                if let Some(sheets) = sheets {
                    config.sheets = *sheets;
                }
                if let Some(policy) = key_policy {
                    config.key_policy = *policy;
                }
                if let Some(policy) = invalid_rows {
                    config.invalid_rows = *policy;
                }
                if let Some(secs) = timeout_secs {
                    config.file_timeout_secs = *secs;
                }
            }
            Commands::Check {
                sheets: Some(sheets),
                ..
            } => config.sheets = *sheets,
            Commands::Months {
                locale: Some(locale),
            } => config.month_locale = *locale,
            _ => {}
        }
    }
}
