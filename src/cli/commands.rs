use anyhow::{bail, Context, Result};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::config::{ImporterConfig, InvalidRowPolicy};
use crate::models::WeatherRecord;
use crate::processors::batch_importer::source_name;
use crate::processors::{BatchImporter, ImportPipeline, ImportReport, PipelineStats};
use crate::store::{month_names, SqliteStore, WeatherFilter};
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet);

    let mut config = ImporterConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Import { files, strict, .. } => {
            let report = import(&config, files, cli.quiet).await?;
            println!("\n{}", report.summary());

            if strict && report.has_diagnostics() {
                bail!(
                    "Import finished with {} diagnostic(s) in strict mode",
                    report.diagnostics.len()
                );
            }
        }

        Commands::Check { files, .. } => {
            check(&config, &files, cli.quiet);
        }

        Commands::List {
            year,
            month,
            format,
        } => {
            let filter = WeatherFilter::new(year, month)?;
            let store = open_store(&config)?;
            let records = store.filter(filter)?;
            print_records(&records, format)?;
        }

        Commands::Years => {
            let store = open_store(&config)?;
            for year in store.distinct_years()? {
                println!("{}", year);
            }
        }

        Commands::Months { .. } => {
            for (i, name) in month_names(config.month_locale).iter().enumerate() {
                println!("{:>2}  {}", i + 1, name);
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("meteo_archive={}", level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn open_store(config: &ImporterConfig) -> Result<SqliteStore> {
    let offset = config.utc_offset()?;
    SqliteStore::open(&config.database_path, offset, config.key_policy).with_context(|| {
        format!(
            "Failed to open database {}",
            config.database_path.display()
        )
    })
}

/// Import files one by one. Each workbook is parsed on the blocking pool
/// under the configured timeout; its records are then stored in order.
async fn import(config: &ImporterConfig, files: Vec<PathBuf>, quiet: bool) -> Result<ImportReport> {
    let mut store = open_store(config)?;
    let importer = BatchImporter::new(ImportPipeline::from_config(config));
    let limit = Duration::from_secs(config.file_timeout_secs);

    info!(
        "Importing {} file(s) into {} ({:?} keys)",
        files.len(),
        config.database_path.display(),
        store.key_policy()
    );

    let progress = ProgressReporter::new(files.len() as u64, "Importing workbooks...", quiet);
    let report = importer
        .import_files_with_timeout(&mut store, &files, limit, &progress)
        .await;

    progress.finish_with_message(&format!(
        "Imported {} records from {} file(s)",
        report.total_inserted(),
        report.files.len()
    ));

    for diagnostic in &report.diagnostics {
        progress.println(&format!("warning: {}", diagnostic));
    }

    Ok(report)
}

fn check(config: &ImporterConfig, files: &[PathBuf], quiet: bool) {
    let pipeline = ImportPipeline::from_config(config).with_invalid_rows(InvalidRowPolicy::Collect);
    let progress = ProgressReporter::new_spinner("Checking workbooks...", quiet);
    let mut total = PipelineStats::default();

    for path in files {
        let source = source_name(path);
        progress.set_message(&format!("Checking {}", source));

        match pipeline.import_path(path) {
            Ok(output) => {
                for rejection in &output.rejections {
                    progress.println(&format!(
                        "{} sheet '{}' row {}: out of range: {}",
                        source,
                        rejection.sheet,
                        rejection.row,
                        rejection.fields.join(", ")
                    ));
                }
                total.merge(&output.stats);
            }
            Err(e) => warn!("{}: {}", source, e),
        }
    }

    progress.finish_with_message("Check complete");

    println!("\n=== Check Report ===");
    println!("Sheets: {}", total.sheets);
    println!(
        "Rows: {} scanned, {} empty, {} accepted, {} rejected",
        total.rows_scanned, total.empty_rows, total.accepted, total.rejected
    );
    println!("Cell fallbacks: {}", total.parse_fallbacks);
}

fn print_records(records: &[WeatherRecord], format: OutputFormat) -> crate::Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "{:<10} {:<8} {:>6} {:>5} {:>6} {:>5} {:>4} {:>5} {:>5} {:>5}  {:<30} {}",
                "Date", "Time", "T", "U%", "Td", "P", "Ff", "N%", "RRR", "VV", "DD", "WW"
            );
            for r in records {
                println!(
                    "{:<10} {:<8} {:>6} {:>5.0} {:>6} {:>5} {:>4} {:>5} {:>5.1} {:>5}  {:<30} {}",
                    r.date.to_string(),
                    r.time_of_day.format("%H:%M:%S").to_string(),
                    r.temperature.to_string(),
                    r.humidity,
                    r.dew_point.to_string(),
                    r.pressure,
                    r.wind_speed,
                    r.cloudiness.map_or("-".to_string(), |c| format!("{:.0}", c)),
                    r.precipitation,
                    r.visibility.map_or("-".to_string(), |v| v.to_string()),
                    r.wind_direction,
                    r.weather_phenomena
                );
            }
            println!("\n{} record(s)", records.len());
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(records)?;
            println!("{}", json);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ImporterConfig {
            database_path: dir.path().join("archive.db"),
            ..Default::default()
        };

        let report = import(&config, vec![dir.path().join("missing.xlsx")], true)
            .await
            .unwrap();

        assert_eq!(report.failed_files, vec!["missing.xlsx".to_string()]);
        assert_eq!(report.total_inserted(), 0);
    }

    #[tokio::test]
    async fn test_import_stores_workbooks_and_skips_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = dir.path().join("december.xlsx");
        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        sheet.write_string(0, 0, "Архив погоды").unwrap();
        sheet.write_string(4, 0, "12.31.2024").unwrap();
        sheet.write_number(4, 1, 0.5).unwrap();
        for (col, value) in [(2, -3.4), (3, 86.0), (4, -5.6), (5, 745.0)] {
            sheet.write_number(4, col, value).unwrap();
        }
        sheet.write_string(4, 6, "Штиль").unwrap();
        sheet.write_number(4, 9, 0.3).unwrap();
        book.save(&workbook).unwrap();

        let empty = dir.path().join("empty.xlsx");
        std::fs::write(&empty, b"").unwrap();

        let config = ImporterConfig {
            database_path: dir.path().join("archive.db"),
            ..Default::default()
        };

        let report = import(&config, vec![empty, workbook.clone()], true)
            .await
            .unwrap();
        assert_eq!(report.skipped_files, vec!["empty.xlsx".to_string()]);
        assert_eq!(report.total_inserted(), 1);

        let again = import(&config, vec![workbook], true).await.unwrap();
        assert_eq!(again.total_inserted(), 0);
        assert_eq!(again.total_conflicts(), 1);
    }
}
