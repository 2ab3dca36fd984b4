pub mod batch_importer;
pub mod import_pipeline;
pub mod record_validator;
pub mod report;

pub use batch_importer::BatchImporter;
pub use import_pipeline::{ImportPipeline, PipelineOutput, PipelineStats, RowRejection};
pub use record_validator::RecordValidator;
pub use report::{Diagnostic, DiagnosticCategory, FileReport, ImportReport};
