//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which loads a query result file into an
//! in-memory [`crate::types::DataSet`] ready for charting.
//!
//! - If [`IngestionOptions::format`] is `None`, the ingestion format is inferred from the file
//!   extension.
//! - If [`IngestionOptions::schema`] is set, CSV cells are parsed per field type instead of
//!   being inferred.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON records, NDJSON, or a `{columns, rows}` envelope.
    Json,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Default)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Typed CSV schema. JSON always infers its schema.
    pub schema: Option<Schema>,
}

/// Unified ingestion entry point for path-based sources.
///
/// # Examples
///
/// ```no_run
/// use chart_data_processing::ingestion::{ingest_from_path, IngestionFormat, IngestionOptions};
///
/// # fn main() -> Result<(), chart_data_processing::IngestionError> {
/// // Uses `.ndjson` to select JSON ingestion.
/// let ds = ingest_from_path("sales.ndjson", &IngestionOptions::default())?;
/// println!("rows={}", ds.row_count());
///
/// // Useful when a file has no extension or you want to override inference.
/// let opts = IngestionOptions {
///     format: Some(IngestionFormat::Csv),
///     ..Default::default()
/// };
/// let ds = ingest_from_path("export_without_extension", &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    match (fmt, options.schema.as_ref()) {
        (IngestionFormat::Csv, Some(schema)) => csv::ingest_csv_with_schema(path, schema),
        (IngestionFormat::Csv, None) => csv::ingest_csv_from_path(path),
        (IngestionFormat::Json, _) => json::ingest_json_from_path(path),
    }
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
