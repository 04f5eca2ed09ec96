//! Heatmaps: one `[xIndex, yIndex, value]` triple per row, no aggregation.

use crate::config::{ChartType, HeatmapConfig};
use crate::error::ProcessResult;
use crate::output::{Axis, HeatCell, ProcessedData, Series, SeriesData};
use crate::types::DataSet;

use super::columns::{Column, NumberReader};
use super::domain::Domain;

pub(crate) fn process_heatmap(
    dataset: &DataSet,
    config: &HeatmapConfig,
    numbers: &NumberReader,
) -> ProcessResult<ProcessedData> {
    let x = Column::resolve(dataset, &config.x_field);
    let y = Column::resolve(dataset, &config.y_field);
    let value = Column::resolve(dataset, &config.value_field);

    let mut x_domain = Domain::new();
    let mut y_domain = Domain::new();
    let mut cells = Vec::with_capacity(dataset.row_count());
    for (i, row) in dataset.rows.iter().enumerate() {
        let xi = x_domain.insert(x.cell(row));
        let yi = y_domain.insert(y.cell(row));
        cells.push(HeatCell(xi, yi, numbers.read(i, row, &value)?));
    }

    Ok(ProcessedData {
        series: vec![Series::new(ChartType::Heatmap, SeriesData::Cells(cells))],
        x_axis: Some(Axis::category(x_domain.values())),
        y_axis: Some(Axis::category(y_domain.values())),
    })
}

#[cfg(test)]
mod tests {
    use super::process_heatmap;
    use crate::config::HeatmapConfig;
    use crate::output::{Axis, HeatCell, SeriesData};
    use crate::processing::columns::NumberReader;
    use crate::processing::NumericPolicy;
    use crate::types::{DataSet, Value};

    #[test]
    fn duplicate_cells_are_all_kept() {
        let ds = DataSet::from_records(vec![
            vec![("x", Value::from("a")), ("y", Value::from("p")), ("v", Value::Int64(5))],
            vec![("x", Value::from("b")), ("y", Value::from("q")), ("v", Value::Int64(7))],
            vec![("x", Value::from("a")), ("y", Value::from("p")), ("v", Value::Int64(1))],
        ]);
        let cfg = HeatmapConfig {
            x_field: "x".to_string(),
            y_field: "y".to_string(),
            value_field: "v".to_string(),
        };
        let out = process_heatmap(&ds, &cfg, &NumberReader::new(NumericPolicy::Permissive)).unwrap();

        assert_eq!(
            out.series[0].data,
            SeriesData::Cells(vec![
                HeatCell(0, 0, 5.0),
                HeatCell(1, 1, 7.0),
                HeatCell(0, 0, 1.0),
            ])
        );
        assert_eq!(
            out.y_axis,
            Some(Axis::category(vec![Value::from("p"), Value::from("q")]))
        );
    }
}
