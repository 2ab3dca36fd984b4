use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{ImporterConfig, InvalidRowPolicy, SheetSelection};
use crate::error::Result;
use crate::models::WeatherRecord;
use crate::processors::record_validator::RecordValidator;
use crate::readers::{CellParser, RowParser, WorkbookReader, Worksheet};
use crate::utils::constants::DEFAULT_HEADER_ROWS;

/// A candidate record that failed range validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRejection {
    pub sheet: String,
    /// 1-based, as shown by spreadsheet applications
    pub row: u32,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub sheets: usize,
    pub rows_scanned: usize,
    pub empty_rows: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub parse_fallbacks: usize,
}

impl PipelineStats {
    pub fn merge(&mut self, other: &PipelineStats) {
        self.sheets += other.sheets;
        self.rows_scanned += other.rows_scanned;
        self.empty_rows += other.empty_rows;
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.parse_fallbacks += other.parse_fallbacks;
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Accepted records, in sheet order then row order
    pub records: Vec<WeatherRecord>,
    /// Empty unless rejected rows are collected
    pub rejections: Vec<RowRejection>,
    pub stats: PipelineStats,
}

/// Workbook → ordered list of valid records.
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    reader: WorkbookReader,
    rows: RowParser,
    validator: RecordValidator,
    header_rows: u32,
    invalid_rows: InvalidRowPolicy,
}

impl ImportPipeline {
    pub fn new() -> Self {
        Self {
            reader: WorkbookReader::default(),
            rows: RowParser::default(),
            validator: RecordValidator::new(),
            header_rows: DEFAULT_HEADER_ROWS,
            invalid_rows: InvalidRowPolicy::default(),
        }
    }

    pub fn from_config(config: &ImporterConfig) -> Self {
        Self::new()
            .with_header_rows(config.header_rows)
            .with_sheet_selection(config.sheets)
            .with_invalid_rows(config.invalid_rows)
            .with_date_formats(config.date_formats.clone())
    }

    pub fn with_header_rows(mut self, header_rows: u32) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn with_sheet_selection(mut self, sheets: SheetSelection) -> Self {
        self.reader = WorkbookReader::new(sheets);
        self
    }

    pub fn with_invalid_rows(mut self, policy: InvalidRowPolicy) -> Self {
        self.invalid_rows = policy;
        self
    }

    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.rows = RowParser::new(CellParser::with_date_formats(formats));
        self
    }

    /// Open the workbook, import its selected sheets, release the file.
    pub fn import_path(&self, path: &Path) -> Result<PipelineOutput> {
        let sheets = self.reader.read(path)?;
        let output = self.import_sheets(&sheets);

        info!(
            "{}: {} records accepted, {} rejected from {} sheet(s)",
            path.display(),
            output.stats.accepted,
            output.stats.rejected,
            output.stats.sheets
        );
        Ok(output)
    }

    pub fn import_sheets(&self, sheets: &[Worksheet]) -> PipelineOutput {
        let mut output = PipelineOutput::default();

        for sheet in sheets {
            self.import_sheet(sheet, &mut output);
        }

        output.stats.parse_fallbacks = self.rows.cell_parser().take_fallbacks();
        output
    }

    fn import_sheet(&self, sheet: &Worksheet, output: &mut PipelineOutput) {
        output.stats.sheets += 1;

        let Some(last_row) = sheet.last_row() else {
            debug!("Sheet '{}' has no stored cells", sheet.name());
            return;
        };

        let before = output.stats.accepted;
        for index in self.header_rows..=last_row {
            output.stats.rows_scanned += 1;

            let Some(record) = self.rows.parse_row(sheet, index) else {
                debug!("Sheet '{}' row {} is empty, skipped", sheet.name(), index + 1);
                output.stats.empty_rows += 1;
                continue;
            };

            if self.validator.is_valid(&record) {
                output.stats.accepted += 1;
                output.records.push(record);
                continue;
            }

            output.stats.rejected += 1;
            let fields = self.validator.violations(&record);
            debug!(
                "Sheet '{}' row {} rejected: {}",
                sheet.name(),
                index + 1,
                fields.join(", ")
            );

            if self.invalid_rows == InvalidRowPolicy::Collect {
                output.rejections.push(RowRejection {
                    sheet: sheet.name().to_string(),
                    row: index + 1,
                    fields,
                });
            }
        }

        debug!(
            "Sheet '{}': {} records accepted",
            sheet.name(),
            output.stats.accepted - before
        );
    }
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::new()
    }
}
