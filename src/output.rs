//! Chart-ready output payloads.
//!
//! [`ProcessedData`] serializes to the JSON shape chart renderers consume:
//!
//! ```json
//! {
//!   "series": [{ "name": "X", "type": "bar", "stack": "total", "data": [1, 2] }],
//!   "xAxis": { "type": "category", "data": ["Jan", "Feb"] },
//!   "yAxis": { "type": "value" }
//! }
//! ```
//!
//! Unset optionals are omitted. `NaN` values serialize as `null`.

use serde::{Deserialize, Serialize};

use crate::config::ChartType;
use crate::types::Value;

/// Stack group name used when axis series are stacked.
pub const STACK_GROUP: &str = "total";

/// Result of one transformation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<Axis>,
}

impl ProcessedData {
    /// Output for empty input: no series, no axes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of data points across all series.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.data.len()).sum()
    }
}

/// One named sequence of data points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub data: SeriesData,
}

impl Series {
    pub fn new(chart_type: ChartType, data: SeriesData) -> Self {
        Self {
            name: None,
            chart_type,
            stack: None,
            data,
        }
    }

    pub fn named(name: Value, chart_type: ChartType, data: SeriesData) -> Self {
        Self {
            name: Some(name),
            ..Self::new(chart_type, data)
        }
    }
}

/// Family-specific data payload of a [`Series`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesData {
    /// Axis charts: one value per x-domain entry.
    Values(Vec<f64>),
    /// Scatter charts: `[x, y]` pairs in row order.
    Points(Vec<[f64; 2]>),
    /// Heatmaps: `[xIndex, yIndex, value]` triples, one per row.
    Cells(Vec<HeatCell>),
    /// Pie and funnel charts.
    Named(Vec<NamedValue>),
    /// Radar charts: one value vector per dimension entry.
    Radar(Vec<RadarEntry>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(v) => v.len(),
            SeriesData::Points(v) => v.len(),
            SeriesData::Cells(v) => v.len(),
            SeriesData::Named(v) => v.len(),
            SeriesData::Radar(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Heatmap cell, serialized as a `[xIndex, yIndex, value]` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatCell(pub usize, pub usize, pub f64);

/// Category entry for pie and funnel charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: Value,
    pub value: f64,
}

/// Radar entry: a name and a value vector aligned to the dimension domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarEntry {
    pub name: Value,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Category,
    Value,
}

/// Axis descriptor. Category axes carry their ordered domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
}

impl Axis {
    pub fn category(domain: Vec<Value>) -> Self {
        Self {
            axis_type: AxisType::Category,
            data: Some(domain),
        }
    }

    pub fn value() -> Self {
        Self {
            axis_type: AxisType::Value,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, HeatCell, NamedValue, ProcessedData, Series, SeriesData, STACK_GROUP};
    use crate::config::ChartType;
    use crate::types::Value;

    #[test]
    fn axis_output_serializes_in_renderer_shape() {
        let out = ProcessedData {
            series: vec![Series {
                stack: Some(STACK_GROUP.to_string()),
                ..Series::named(
                    Value::from("X"),
                    ChartType::Bar,
                    SeriesData::Values(vec![1.0, 2.0]),
                )
            }],
            x_axis: Some(Axis::category(vec![Value::from("Jan"), Value::from("Feb")])),
            y_axis: Some(Axis::value()),
        };

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "series": [{"name": "X", "type": "bar", "stack": "total", "data": [1.0, 2.0]}],
                "xAxis": {"type": "category", "data": ["Jan", "Feb"]},
                "yAxis": {"type": "value"}
            })
        );
    }

    #[test]
    fn empty_output_has_no_axis_keys() {
        let json = serde_json::to_string(&ProcessedData::empty()).unwrap();
        assert_eq!(json, r#"{"series":[]}"#);
    }

    #[test]
    fn heat_cells_and_named_values_serialize_compactly() {
        let cells = SeriesData::Cells(vec![HeatCell(1, 0, 7.0)]);
        assert_eq!(serde_json::to_string(&cells).unwrap(), "[[1,0,7.0]]");

        let named = SeriesData::Named(vec![NamedValue {
            name: Value::from("A"),
            value: f64::NAN,
        }]);
        assert_eq!(
            serde_json::to_string(&named).unwrap(),
            r#"[{"name":"A","value":null}]"#
        );
    }
}
