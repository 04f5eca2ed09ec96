//! Core data model types.
//!
//! Query results are held in an in-memory [`DataSet`]: a [`Schema`] (ordered list of typed
//! [`Field`]s) plus row-major [`Value`] storage. Every row in one dataset shares the schema's
//! field set; a field the schema does not know, a row shorter than the schema, or a
//! [`Value::Absent`] cell all read as absent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string (also used for dates and timestamps).
    Utf8,
}

impl DataType {
    /// Smallest type able to hold values of both `self` and `other`.
    ///
    /// Integers widen to floats; any other mix widens to [`DataType::Utf8`].
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                DataType::Float64
            }
            _ => DataType::Utf8,
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of every row in a [`DataSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single scalar cell.
///
/// Serialized untagged, so a [`Value`] round-trips as plain JSON (`null`, number, bool,
/// string). [`Value::Absent`] is never produced by deserialization and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// No value recorded: the row's source record did not mention the field.
    ///
    /// Unlike [`Value::Null`], an absent cell reads as `NaN` and groups separately from nulls.
    Absent,
}

impl Value {
    /// Coerce the value to a number using loose (JavaScript-style) numeric conversion.
    ///
    /// - `Null` is `0`, `Absent` is `NaN`, booleans are `1`/`0`.
    /// - Strings are trimmed; the empty string is `0`; decimal/exponent literals, `Infinity`
    ///   and `0x`/`0o`/`0b` integer literals parse; anything else is `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Absent => f64::NAN,
            Value::Int64(v) => *v as f64,
            Value::Float64(v) => *v,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Utf8(s) => parse_number_literal(s),
        }
    }

    /// Logical type of this value, or `None` for [`Value::Null`] and [`Value::Absent`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null | Value::Absent => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Absent => f.write_str("<absent>"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Coerce a possibly absent cell to a number. Absent cells are `NaN`.
pub fn coerce_number(cell: Option<&Value>) -> f64 {
    cell.map_or(f64::NAN, Value::to_number)
}

fn parse_number_literal(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(v) = parse_radix_literal(s) {
        return v;
    }

    // `str::parse::<f64>` also accepts "inf"/"nan", which are not numeric literals here.
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let plain = body
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if body.is_empty() || !plain {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    let (radix, digits) = if let Some(d) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        (8, d)
    } else if let Some(d) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        (2, d)
    } else {
        return None;
    };
    Some(
        u64::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
    )
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Build a dataset from name/value records.
    ///
    /// The schema is the union of field names in first-seen order; each field's type is the
    /// widened type of its non-null values (`Utf8` when it only ever holds nulls). Fields a
    /// record does not mention are stored as [`Value::Absent`].
    pub fn from_records<K, I, R>(records: R) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
        R: IntoIterator<Item = I>,
    {
        Self::from_records_with_field_order(std::iter::empty::<String>(), records)
    }

    /// Like [`DataSet::from_records`], but the schema starts with `leading` fields (in that
    /// order) before any field first seen in the records.
    pub fn from_records_with_field_order<L, K, I, R>(leading: L, records: R) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
        R: IntoIterator<Item = I>,
    {
        let mut fields: Vec<(String, Option<DataType>)> = Vec::new();
        for name in leading {
            let name = name.into();
            if !fields.iter().any(|(n, _)| *n == name) {
                fields.push((name, None));
            }
        }
        let mut sparse: Vec<Vec<(usize, Value)>> = Vec::new();

        for record in records {
            let mut cells = Vec::new();
            for (name, value) in record {
                let name = name.into();
                let idx = match fields.iter().position(|(n, _)| *n == name) {
                    Some(idx) => idx,
                    None => {
                        fields.push((name, None));
                        fields.len() - 1
                    }
                };
                if let Some(t) = value.data_type() {
                    let slot = &mut fields[idx].1;
                    *slot = Some(slot.map_or(t, |cur| cur.widen(t)));
                }
                cells.push((idx, value));
            }
            sparse.push(cells);
        }

        let width = fields.len();
        let rows = sparse
            .into_iter()
            .map(|cells| {
                let mut row = vec![Value::Absent; width];
                for (idx, value) in cells {
                    row[idx] = value;
                }
                row
            })
            .collect();

        let schema = Schema::new(
            fields
                .into_iter()
                .map(|(name, t)| Field::new(name, t.unwrap_or(DataType::Utf8)))
                .collect(),
        );
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of `row` for field `name`, or `None` when the field or cell is absent.
    pub fn value<'a>(&self, row: &'a [Value], name: &str) -> Option<&'a Value> {
        self.schema
            .index_of(name)
            .and_then(|idx| row.get(idx))
            .filter(|v| !v.is_absent())
    }
}
