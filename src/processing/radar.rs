//! Radar charts.

use crate::config::{ChartType, RadarConfig};
use crate::error::ProcessResult;
use crate::output::{ProcessedData, RadarEntry, Series, SeriesData};
use crate::types::DataSet;

use super::columns::{Column, NumberReader};
use super::domain::Domain;

/// One entry per distinct dimension (first-occurrence order). Each entry's vector is aligned
/// to the dimension domain and is zero everywhere except at the entry's own dimension, which
/// holds the last value seen for it.
pub(crate) fn process_radar(
    dataset: &DataSet,
    config: &RadarConfig,
    numbers: &NumberReader,
) -> ProcessResult<ProcessedData> {
    let dimension = Column::resolve(dataset, &config.series_field);
    let value = Column::resolve(dataset, &config.value_field);

    let mut dimensions = Domain::new();
    let mut last: Vec<f64> = Vec::new();
    for (i, row) in dataset.rows.iter().enumerate() {
        let idx = dimensions.insert(dimension.cell(row));
        let v = numbers.read(i, row, &value)?;
        if idx == last.len() {
            last.push(v);
        } else {
            last[idx] = v;
        }
    }

    let width = dimensions.len();
    let entries = dimensions
        .values()
        .into_iter()
        .zip(last)
        .enumerate()
        .map(|(idx, (name, v))| {
            let mut value = vec![0.0; width];
            value[idx] = v;
            RadarEntry { name, value }
        })
        .collect();

    Ok(ProcessedData {
        series: vec![Series::new(ChartType::Radar, SeriesData::Radar(entries))],
        x_axis: None,
        y_axis: None,
    })
}
