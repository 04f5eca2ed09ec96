//! Line, bar and area charts.

use indexmap::IndexMap;

use crate::config::AxisConfig;
use crate::error::ProcessResult;
use crate::output::{Axis, ProcessedData, Series, SeriesData, STACK_GROUP};
use crate::types::{DataSet, Value};

use super::aggregate::fold_into;
use super::columns::{Column, NumberReader};
use super::domain::{Domain, GroupKey};

struct SeriesCells<'a> {
    /// `None` for the single unnamed series used when no series field is configured.
    name: Option<Option<&'a Value>>,
    cells: IndexMap<usize, f64>,
}

/// Group rows by x value (and series value, if configured), aggregate y per cell and align
/// every series to the x-domain. Missing cells, and cells that aggregate to `NaN`, are `0`.
pub(crate) fn process_axis(
    dataset: &DataSet,
    config: &AxisConfig,
    numbers: &NumberReader,
) -> ProcessResult<ProcessedData> {
    let x = Column::resolve(dataset, &config.x_field);
    let y = Column::resolve(dataset, &config.y_field);
    let series_col = config
        .series_field
        .as_deref()
        .map(|field| Column::resolve(dataset, field));

    let mut x_domain = Domain::new();
    let mut groups: IndexMap<GroupKey<'_>, SeriesCells<'_>> = IndexMap::new();

    for (i, row) in dataset.rows.iter().enumerate() {
        let x_idx = x_domain.insert(x.cell(row));
        let y_val = numbers.read(i, row, &y)?;

        let (key, name) = match &series_col {
            Some(col) => {
                let cell = col.cell(row);
                (GroupKey::of(cell), Some(cell))
            }
            None => (GroupKey::Null, None),
        };
        let group = groups.entry(key).or_insert_with(|| SeriesCells {
            name,
            cells: IndexMap::new(),
        });
        fold_into(&mut group.cells, x_idx, y_val, config.aggregation);
    }

    let width = x_domain.len();
    let chart_type = config.kind.chart_type();
    let stack = config.stack.then(|| STACK_GROUP.to_string());

    let series = groups
        .into_values()
        .map(|group| {
            let data = (0..width)
                .map(|idx| {
                    group
                        .cells
                        .get(&idx)
                        .copied()
                        .filter(|v| !v.is_nan())
                        .unwrap_or(0.0)
                })
                .collect();
            Series {
                name: group.name.map(|cell| cell.cloned().unwrap_or(Value::Null)),
                chart_type,
                stack: stack.clone(),
                data: SeriesData::Values(data),
            }
        })
        .collect();

    Ok(ProcessedData {
        series,
        x_axis: Some(Axis::category(x_domain.values())),
        y_axis: Some(Axis::value()),
    })
}
