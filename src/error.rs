use thiserror::Error;

use crate::config::ChartFamily;

/// Convenience result type for chart transforms.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Convenience result type for row ingestion.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by the transformation engine.
///
/// Configuration errors are raised before any row is read, so a failed call never leaves a
/// partially built [`crate::output::ProcessedData`] behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// `chartType` names a chart the engine does not implement.
    #[error("unsupported chart type: {chart_type}")]
    UnsupportedChartType { chart_type: String },

    /// The configuration omits one or more fields the chart family needs.
    #[error("{} required for {family} charts", describe_missing(.fields))]
    MissingRequiredField {
        family: ChartFamily,
        fields: Vec<&'static str>,
    },

    /// A cell read as a number did not coerce to one (strict numeric policy only).
    #[error("non-numeric value at row {row} field '{field}' (raw='{raw}')")]
    InvalidNumber {
        row: usize,
        field: String,
        raw: String,
    },
}

fn describe_missing(fields: &[&'static str]) -> String {
    match fields {
        [] => "fields are".to_string(),
        [only] => format!("{only} is"),
        [init @ .., last] => format!("{} and {last} are", init.join(", ")),
    }
}

/// Error type returned by ingestion functions.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input is not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have the expected shape (not an object, missing column, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}
