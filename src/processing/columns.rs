//! Field lookup and numeric reads for one processing call.

use crate::error::{ProcessError, ProcessResult};
use crate::types::{coerce_number, DataSet, Value};

use super::NumericPolicy;

/// A config field resolved against the dataset schema once per call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Column<'c> {
    name: &'c str,
    index: Option<usize>,
}

impl<'c> Column<'c> {
    pub(crate) fn resolve(dataset: &DataSet, name: &'c str) -> Self {
        Self {
            name,
            index: dataset.schema.index_of(name),
        }
    }

    /// Cell of this field in `row`; `None` if the schema lacks the field, the row is short, or
    /// the record never set it.
    pub(crate) fn cell<'r>(&self, row: &'r [Value]) -> Option<&'r Value> {
        self.index
            .and_then(|idx| row.get(idx))
            .filter(|v| !v.is_absent())
    }
}

/// Reads cells as numbers under a [`NumericPolicy`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct NumberReader {
    policy: NumericPolicy,
}

impl NumberReader {
    pub(crate) fn new(policy: NumericPolicy) -> Self {
        Self { policy }
    }

    /// Coerce the `column` cell of `row` (0-based `row_idx`) to a number.
    ///
    /// Under [`NumericPolicy::Strict`] a `NaN` result is an error carrying the 1-based row.
    pub(crate) fn read(&self, row_idx: usize, row: &[Value], column: &Column<'_>) -> ProcessResult<f64> {
        let cell = column.cell(row);
        let n = coerce_number(cell);
        if n.is_nan() && self.policy == NumericPolicy::Strict {
            return Err(ProcessError::InvalidNumber {
                row: row_idx + 1,
                field: column.name.to_string(),
                raw: cell.map_or_else(|| "<absent>".to_string(), Value::to_string),
            });
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, NumberReader};
    use crate::error::ProcessError;
    use crate::processing::NumericPolicy;
    use crate::types::{DataSet, Value};

    fn dataset() -> DataSet {
        DataSet::from_records(vec![
            vec![("v", Value::from("12"))],
            vec![("v", Value::from("n/a"))],
        ])
    }

    #[test]
    fn permissive_reads_yield_nan_for_non_numeric_and_absent_fields() {
        let ds = dataset();
        let reader = NumberReader::new(NumericPolicy::Permissive);
        let v = Column::resolve(&ds, "v");
        let missing = Column::resolve(&ds, "missing");

        assert_eq!(reader.read(0, &ds.rows[0], &v).unwrap(), 12.0);
        assert!(reader.read(1, &ds.rows[1], &v).unwrap().is_nan());
        assert!(reader.read(0, &ds.rows[0], &missing).unwrap().is_nan());
    }

    #[test]
    fn strict_reads_report_row_field_and_raw_value() {
        let ds = dataset();
        let reader = NumberReader::new(NumericPolicy::Strict);
        let v = Column::resolve(&ds, "v");

        let err = reader.read(1, &ds.rows[1], &v).unwrap_err();
        assert_eq!(
            err,
            ProcessError::InvalidNumber {
                row: 2,
                field: "v".to_string(),
                raw: "n/a".to_string(),
            }
        );

        let missing = Column::resolve(&ds, "missing");
        let err = reader.read(0, &ds.rows[0], &missing).unwrap_err();
        assert!(err.to_string().contains("<absent>"));
    }

    #[test]
    fn key_missing_from_one_record_reads_as_absent_not_null() {
        let ds = DataSet::from_records(vec![
            vec![("v", Value::Int64(1)), ("n", Value::Null)],
            vec![("n", Value::Null)],
        ]);
        let v = Column::resolve(&ds, "v");
        let n = Column::resolve(&ds, "n");

        assert_eq!(v.cell(&ds.rows[1]), None);
        assert_eq!(n.cell(&ds.rows[1]), Some(&Value::Null));

        let permissive = NumberReader::new(NumericPolicy::Permissive);
        assert!(permissive.read(1, &ds.rows[1], &v).unwrap().is_nan());
        assert_eq!(permissive.read(1, &ds.rows[1], &n).unwrap(), 0.0);

        let strict = NumberReader::new(NumericPolicy::Strict);
        assert!(matches!(
            strict.read(1, &ds.rows[1], &v),
            Err(ProcessError::InvalidNumber { row: 2, .. })
        ));
    }
}
