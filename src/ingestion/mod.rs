//! Loading query results into a [`crate::types::DataSet`].
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]), which auto-detects the
//! format by file extension (or you can override it via [`IngestionOptions`]).
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod unified;

pub use csv::{ingest_csv_from_path, ingest_csv_from_reader, ingest_csv_with_schema};
pub use json::{ingest_json_from_path, ingest_json_from_str};
pub use unified::{ingest_from_path, IngestionFormat, IngestionOptions};
