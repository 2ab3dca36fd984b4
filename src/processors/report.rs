use serde::Serialize;
use std::fmt;

use crate::processors::import_pipeline::PipelineStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// Record already stored under the same key
    Duplicate,
    Storage,
    /// Workbook could not be opened or read
    File,
    Validation,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticCategory::Duplicate => "duplicate",
            DiagnosticCategory::Storage => "storage",
            DiagnosticCategory::File => "file",
            DiagnosticCategory::Validation => "validation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    /// File name, optionally narrowed to a sheet and row
    pub context: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        category: DiagnosticCategory,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context: context.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.category, self.context, self.message)
    }
}

/// Outcome of importing one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub source: String,
    pub stats: PipelineStats,
    pub inserted: usize,
    pub conflicts: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub files: Vec<FileReport>,
    pub skipped_files: Vec<String>,
    pub failed_files: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Zero-length uploads are ignored without a diagnostic
    pub fn skip_file(&mut self, source: impl Into<String>) {
        self.skipped_files.push(source.into());
    }

    pub fn record_file_failure(&mut self, source: &str, message: impl Into<String>) {
        self.failed_files.push(source.to_string());
        self.push(Diagnostic::new(DiagnosticCategory::File, source, message));
    }

    pub fn total_inserted(&self) -> usize {
        self.files.iter().map(|f| f.inserted).sum()
    }

    pub fn total_conflicts(&self) -> usize {
        self.files.iter().map(|f| f.conflicts).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.files.iter().map(|f| f.failures).sum()
    }

    pub fn stats(&self) -> PipelineStats {
        let mut total = PipelineStats::default();
        for file in &self.files {
            total.merge(&file.stats);
        }
        total
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn count(&self, category: DiagnosticCategory) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == category)
            .count()
    }

    pub fn summary(&self) -> String {
        let stats = self.stats();
        let mut summary = String::new();

        summary.push_str("=== Import Report ===\n");
        summary.push_str(&format!(
            "Files: {} imported, {} skipped (empty), {} failed\n",
            self.files.len(),
            self.skipped_files.len(),
            self.failed_files.len()
        ));
        summary.push_str(&format!(
            "Rows: {} scanned, {} empty, {} accepted, {} rejected\n",
            stats.rows_scanned, stats.empty_rows, stats.accepted, stats.rejected
        ));
        summary.push_str(&format!("Cell fallbacks: {}\n", stats.parse_fallbacks));
        summary.push_str(&format!(
            "Stored: {} inserted, {} duplicates, {} storage failures\n",
            self.total_inserted(),
            self.total_conflicts(),
            self.total_failures()
        ));

        if !self.diagnostics.is_empty() {
            summary.push_str(&format!("\nDiagnostics: {}\n", self.diagnostics.len()));
            for (i, diagnostic) in self.diagnostics.iter().take(10).enumerate() {
                summary.push_str(&format!("  {}. {}\n", i + 1, diagnostic));
            }
            if self.diagnostics.len() > 10 {
                summary.push_str(&format!("  ... and {} more\n", self.diagnostics.len() - 10));
            }
        }

        summary
    }
}
