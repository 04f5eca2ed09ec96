//! CSV ingestion implementation.
//!
//! Two modes:
//!
//! - Inferred ([`ingest_csv_from_path`], [`ingest_csv_from_reader`]): the header row names the
//!   fields and each column's type is inferred from its cells.
//! - Typed ([`ingest_csv_with_schema`], [`ingest_csv_with_schema_from_reader`]): cells are
//!   parsed according to a caller-provided [`Schema`].
//!
//! In both modes an empty cell is [`Value::Null`].

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Ingest a CSV file, inferring the schema from the header row and cell contents.
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing reader, inferring the schema.
///
/// A column's type is the widened type of its non-empty cells: integers, then floats, then
/// booleans (`true`/`false`), otherwise text. Once a column widens to text, every non-empty
/// cell keeps its raw (trimmed) text.
pub fn ingest_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_owned()).collect();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    let mut types: Vec<Option<DataType>> = vec![None; headers.len()];
    for result in rdr.records() {
        let record = result?;
        let mut row = Vec::with_capacity(headers.len());
        for (idx, slot) in types.iter_mut().enumerate() {
            let raw = record.get(idx).unwrap_or("").trim();
            if let Some(t) = infer_type(raw) {
                *slot = Some(slot.map_or(t, |cur| cur.widen(t)));
            }
            row.push(raw.to_owned());
        }
        raw_rows.push(row);
    }

    let types: Vec<DataType> = types.into_iter().map(|t| t.unwrap_or(DataType::Utf8)).collect();
    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&types)
                .map(|(raw, t)| inferred_value(raw, *t))
                .collect()
        })
        .collect();

    let schema = Schema::new(
        headers
            .into_iter()
            .zip(types)
            .map(|(name, t)| Field::new(name, t))
            .collect(),
    );
    Ok(DataSet::new(schema, rows))
}

/// Ingest a CSV file according to `schema`.
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ).
/// - Each value is parsed according to the schema field type.
pub fn ingest_csv_with_schema(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_with_schema_from_reader(&mut rdr, schema)
}

/// Ingest CSV data from an existing reader according to `schema`.
pub fn ingest_csv_with_schema_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h.trim() == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based, and the header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn infer_type(raw: &str) -> Option<DataType> {
    if raw.is_empty() {
        None
    } else if raw.parse::<i64>().is_ok() {
        Some(DataType::Int64)
    } else if is_float_literal(raw) {
        Some(DataType::Float64)
    } else if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
        Some(DataType::Bool)
    } else {
        Some(DataType::Utf8)
    }
}

// `f64::from_str` also takes "inf"/"NaN"; those stay text.
fn is_float_literal(raw: &str) -> bool {
    raw.bytes().any(|b| b.is_ascii_digit())
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        && raw.parse::<f64>().is_ok()
}

fn inferred_value(raw: String, data_type: DataType) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    let parsed = match data_type {
        DataType::Int64 => raw.parse::<i64>().ok().map(Value::Int64),
        DataType::Float64 => raw.parse::<f64>().ok().map(Value::Float64),
        DataType::Bool => parse_bool(&raw).ok().map(Value::Bool),
        DataType::Utf8 => None,
    };
    parsed.unwrap_or(Value::Utf8(raw))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
