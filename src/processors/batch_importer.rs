use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::error::{ProcessingError, Result};
use crate::processors::import_pipeline::{ImportPipeline, PipelineOutput};
use crate::processors::report::{Diagnostic, DiagnosticCategory, FileReport, ImportReport};
use crate::store::{InsertOutcome, RecordStore};
use crate::utils::progress::ProgressReporter;

/// Imports a batch of workbooks into a store, one file at a time.
///
/// Failures are reported per file and per record; a bad file or a
/// conflicting record never stops the rest of the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchImporter {
    pipeline: ImportPipeline,
}

impl BatchImporter {
    pub fn new(pipeline: ImportPipeline) -> Self {
        Self { pipeline }
    }

    pub fn import_files<S: RecordStore>(&self, store: &mut S, paths: &[PathBuf]) -> ImportReport {
        let mut report = ImportReport::new();

        for path in paths {
            if let Some(source) = admit_file(path, &mut report) {
                let parsed = self.pipeline.import_path(path);
                record_file(store, &source, parsed, &mut report);
            }
        }

        report
    }

    /// Same as [`import_files`](Self::import_files), but each workbook is
    /// parsed on the blocking pool and given at most `limit` to finish.
    pub async fn import_files_with_timeout<S: RecordStore>(
        &self,
        store: &mut S,
        paths: &[PathBuf],
        limit: Duration,
        progress: &ProgressReporter,
    ) -> ImportReport {
        let pipeline = self.pipeline.clone();
        import_each_with_timeout(store, paths, limit, progress, move |path: &Path| {
            pipeline.import_path(path)
        })
        .await
    }
}

async fn import_each_with_timeout<S, P>(
    store: &mut S,
    paths: &[PathBuf],
    limit: Duration,
    progress: &ProgressReporter,
    parse: P,
) -> ImportReport
where
    S: RecordStore,
    P: Fn(&Path) -> Result<PipelineOutput> + Clone + Send + 'static,
{
    let mut report = ImportReport::new();

    for path in paths {
        progress.set_message(&format!("Importing {}", source_name(path)));

        if let Some(source) = admit_file(path, &mut report) {
            let parse = parse.clone();
            let owned = path.clone();
            let parsed = parse_with_timeout(&source, limit, move || parse(&owned)).await;
            record_file(store, &source, parsed, &mut report);
        }

        progress.increment(1);
    }

    report
}

/// Run `parse` on the blocking pool. A parse that outlives `limit` keeps
/// running to completion; its result is discarded.
pub async fn parse_with_timeout<F>(file: &str, limit: Duration, parse: F) -> Result<PipelineOutput>
where
    F: FnOnce() -> Result<PipelineOutput> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(parse);

    match timeout(limit, task).await {
        Ok(joined) => joined?,
        Err(_) => Err(ProcessingError::Timeout {
            file: file.to_string(),
            seconds: limit.as_secs(),
        }),
    }
}

/// Source name of a file worth parsing; empty files are noted as skipped.
fn admit_file(path: &Path, report: &mut ImportReport) -> Option<String> {
    let source = source_name(path);
    if is_empty_file(path) {
        info!("Skipping empty file {}", source);
        report.skip_file(source);
        return None;
    }
    Some(source)
}

/// Persist one file's pipeline result into `store`, appending the outcome
/// to `report`. Records are inserted in order, one statement each.
pub fn record_file<S: RecordStore>(
    store: &mut S,
    source: &str,
    parsed: Result<PipelineOutput>,
    report: &mut ImportReport,
) {
    let output = match parsed {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to read {}: {}", source, e);
            report.record_file_failure(source, e.to_string());
            return;
        }
    };

    let mut file = FileReport {
        source: source.to_string(),
        stats: output.stats,
        ..Default::default()
    };

    for rejection in output.rejections {
        report.push(Diagnostic::new(
            DiagnosticCategory::Validation,
            format!("{} sheet '{}' row {}", source, rejection.sheet, rejection.row),
            format!("out of range: {}", rejection.fields.join(", ")),
        ));
    }

    for record in &output.records {
        match store.insert(record) {
            InsertOutcome::Inserted => file.inserted += 1,
            InsertOutcome::Conflict(message) => {
                warn!("Duplicate record {} from {}", record.key_label(), source);
                file.conflicts += 1;
                report.push(Diagnostic::new(
                    DiagnosticCategory::Duplicate,
                    source,
                    format!("record {} already stored ({})", record.key_label(), message),
                ));
            }
            InsertOutcome::Failed(message) => {
                warn!("Failed to store {} from {}: {}", record.key_label(), source, message);
                file.failures += 1;
                report.push(Diagnostic::new(
                    DiagnosticCategory::Storage,
                    source,
                    format!("record {}: {}", record.key_label(), message),
                ));
            }
        }
    }

    info!(
        "{}: {} inserted, {} duplicates, {} failed",
        source, file.inserted, file.conflicts, file.failures
    );
    report.files.push(file);
}

/// File name used in diagnostics
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Zero-length files are skipped; unreadable metadata is left for the
/// workbook reader to report.
pub fn is_empty_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(false)
}
