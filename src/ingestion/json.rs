//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//! - A query result envelope: `{"columns":[{"name":"a"}],"rows":[{"a":1}]}`. Envelope rows may
//!   also be positional arrays aligned to `columns`.
//!
//! The schema is inferred: field order is the envelope's column order (when given) followed by
//! first-seen key order, and each field's type is the widened type of its values. Nested
//! objects and arrays are kept as their JSON text.

use std::fs;
use std::path::Path;

use serde_json::Map;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Value};

/// Ingest a JSON file into an in-memory [`DataSet`].
pub fn ingest_json_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // A single line that fails to parse is plain invalid JSON, not NDJSON.
    let parsed = serde_json::from_str::<serde_json::Value>(trimmed);
    let value = match parsed {
        Ok(v) => v,
        Err(e) if !trimmed.contains('\n') => return Err(e.into()),
        Err(_) => return ingest_ndjson(trimmed),
    };

    match value {
        serde_json::Value::Array(items) => ingest_records(Vec::new(), &items),
        serde_json::Value::Object(obj) => {
            if let Some((columns, rows)) = envelope_parts(&obj) {
                return ingest_envelope(columns, rows);
            }
            ingest_records(Vec::new(), &[serde_json::Value::Object(obj)])
        }
        _ => Err(IngestionError::SchemaMismatch {
            message: "json must be an object, an array of objects, or NDJSON".to_string(),
        }),
    }
}

fn ingest_ndjson(text: &str) -> IngestionResult<DataSet> {
    let mut values = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
            IngestionError::SchemaMismatch {
                message: format!("invalid ndjson at line {}: {}", i + 1, e),
            }
        })?;
        values.push(v);
    }
    ingest_records(Vec::new(), &values)
}

fn envelope_parts(
    obj: &Map<String, serde_json::Value>,
) -> Option<(&[serde_json::Value], &[serde_json::Value])> {
    let columns = obj.get("columns")?.as_array()?;
    let rows = obj.get("rows")?.as_array()?;
    Some((columns.as_slice(), rows.as_slice()))
}

fn ingest_envelope(
    columns: &[serde_json::Value],
    rows: &[serde_json::Value],
) -> IngestionResult<DataSet> {
    let mut names = Vec::with_capacity(columns.len());
    for (idx0, c) in columns.iter().enumerate() {
        let name = match c {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(o) => o.get("name").and_then(serde_json::Value::as_str),
            _ => None,
        };
        let name = name.ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("column {} has no name", idx0 + 1),
        })?;
        names.push(name.to_string());
    }

    // Positional rows are rewritten as objects keyed by column name.
    let mut records = Vec::with_capacity(rows.len());
    for (idx0, row) in rows.iter().enumerate() {
        match row {
            serde_json::Value::Array(cells) => {
                if cells.len() > names.len() {
                    return Err(IngestionError::SchemaMismatch {
                        message: format!(
                            "row {} has {} cells but only {} columns",
                            idx0 + 1,
                            cells.len(),
                            names.len()
                        ),
                    });
                }
                let obj: Map<String, serde_json::Value> =
                    names.iter().cloned().zip(cells.iter().cloned()).collect();
                records.push(serde_json::Value::Object(obj));
            }
            other => records.push(other.clone()),
        }
    }
    ingest_records(names, &records)
}

fn ingest_records(leading: Vec<String>, values: &[serde_json::Value]) -> IngestionResult<DataSet> {
    let mut records = Vec::with_capacity(values.len());
    for (idx0, v) in values.iter().enumerate() {
        let obj = v.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("row {} is not a json object", idx0 + 1),
        })?;
        records.push(obj.iter().map(|(k, jv)| (k.as_str(), convert_json_value(jv))));
    }
    Ok(DataSet::from_records_with_field_order(leading, records))
}

fn convert_json_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map_or(Value::Null, Value::Float64),
        },
        serde_json::Value::String(s) => Value::Utf8(s.clone()),
        nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
            Value::Utf8(nested.to_string())
        }
    }
}
