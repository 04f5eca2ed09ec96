//! Pie and funnel charts: one aggregated value per category.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::config::{Aggregation, ChartType, FunnelConfig, PieConfig, SortOrder};
use crate::error::ProcessResult;
use crate::output::{NamedValue, ProcessedData, Series, SeriesData};
use crate::types::{DataSet, Value};

use super::aggregate::fold_into;
use super::columns::{Column, NumberReader};
use super::domain::Domain;

pub(crate) fn process_pie(
    dataset: &DataSet,
    config: &PieConfig,
    numbers: &NumberReader,
    other_label: &str,
) -> ProcessResult<ProcessedData> {
    let mut data = aggregate_categories(
        dataset,
        &config.series_field,
        &config.value_field,
        config.aggregation,
        numbers,
    )?;
    if let Some(order) = config.sort_by {
        sort_categories(&mut data, order);
    }

    if let Some(limit) = config.limit.filter(|&l| l > 0 && l < data.len()) {
        let others = data.drain(limit..).fold(0.0, |acc, item| acc + item.value);
        data.push(NamedValue {
            name: Value::from(other_label),
            value: others,
        });
    }

    Ok(single_series(ChartType::Pie, data))
}

pub(crate) fn process_funnel(
    dataset: &DataSet,
    config: &FunnelConfig,
    numbers: &NumberReader,
) -> ProcessResult<ProcessedData> {
    let mut data = aggregate_categories(
        dataset,
        &config.series_field,
        &config.value_field,
        config.aggregation,
        numbers,
    )?;
    if let Some(order) = config.sort_by {
        sort_categories(&mut data, order);
    }
    Ok(single_series(ChartType::Funnel, data))
}

fn single_series(chart_type: ChartType, data: Vec<NamedValue>) -> ProcessedData {
    ProcessedData {
        series: vec![Series::new(chart_type, SeriesData::Named(data))],
        x_axis: None,
        y_axis: None,
    }
}

/// Aggregate `value_field` per distinct `category_field` value, in first-occurrence order.
fn aggregate_categories(
    dataset: &DataSet,
    category_field: &str,
    value_field: &str,
    aggregation: Aggregation,
    numbers: &NumberReader,
) -> ProcessResult<Vec<NamedValue>> {
    let category = Column::resolve(dataset, category_field);
    let value = Column::resolve(dataset, value_field);

    let mut names = Domain::new();
    let mut totals: IndexMap<usize, f64> = IndexMap::new();
    for (i, row) in dataset.rows.iter().enumerate() {
        let idx = names.insert(category.cell(row));
        let v = numbers.read(i, row, &value)?;
        fold_into(&mut totals, idx, v, aggregation);
    }

    // Category indexes are assigned in first-occurrence order, matching `totals` order.
    Ok(names
        .values()
        .into_iter()
        .zip(totals.into_values())
        .map(|(name, value)| NamedValue { name, value })
        .collect())
}

/// Stable sort by value. `NaN` values sort last in either direction.
fn sort_categories(data: &mut [NamedValue], order: SortOrder) {
    data.sort_by(|a, b| match (a.value.is_nan(), b.value.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
    });
}
