//! Scatter charts: raw `[x, y]` pairs, optionally split by series.

use indexmap::IndexMap;

use crate::config::{ChartType, ScatterConfig};
use crate::error::ProcessResult;
use crate::output::{ProcessedData, Series, SeriesData};
use crate::types::{DataSet, Value};

use super::columns::{Column, NumberReader};
use super::domain::GroupKey;

pub(crate) fn process_scatter(
    dataset: &DataSet,
    config: &ScatterConfig,
    numbers: &NumberReader,
) -> ProcessResult<ProcessedData> {
    let x = Column::resolve(dataset, &config.x_field);
    let y = Column::resolve(dataset, &config.y_field);

    let point = |i: usize, row: &[Value]| -> ProcessResult<[f64; 2]> {
        Ok([numbers.read(i, row, &x)?, numbers.read(i, row, &y)?])
    };

    let series = match config.series_field.as_deref() {
        Some(field) => {
            let series_col = Column::resolve(dataset, field);
            let mut groups: IndexMap<GroupKey<'_>, (Option<&Value>, Vec<[f64; 2]>)> =
                IndexMap::new();
            for (i, row) in dataset.rows.iter().enumerate() {
                let cell = series_col.cell(row);
                let p = point(i, row)?;
                groups
                    .entry(GroupKey::of(cell))
                    .or_insert_with(|| (cell, Vec::new()))
                    .1
                    .push(p);
            }
            groups
                .into_values()
                .map(|(name, points)| {
                    Series::named(
                        name.cloned().unwrap_or(Value::Null),
                        ChartType::Scatter,
                        SeriesData::Points(points),
                    )
                })
                .collect()
        }
        None => {
            let points = dataset
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| point(i, row))
                .collect::<ProcessResult<Vec<_>>>()?;
            vec![Series::new(ChartType::Scatter, SeriesData::Points(points))]
        }
    };

    Ok(ProcessedData {
        series,
        x_axis: None,
        y_axis: None,
    })
}
