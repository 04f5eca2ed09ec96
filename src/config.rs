//! Chart processing configuration.
//!
//! [`ProcessConfig`] is a tagged union with one variant per chart family. Each variant only
//! carries the fields its family needs, so a constructed config can never be missing one.
//!
//! Dashboards store configs in a loose JSON shape ([`RawProcessConfig`]: `chartType`,
//! `xField`, `seriesField`, ...). Converting it with [`ProcessConfig::try_from`] is where
//! unknown chart types and missing fields are reported.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProcessError, ProcessResult};

/// Chart types accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
    Area,
    Pie,
    Scatter,
    Radar,
    Funnel,
    Heatmap,
}

impl ChartType {
    /// Lowercase name, as used in configs and echoed in series `type`.
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
            ChartType::Funnel => "funnel",
            ChartType::Heatmap => "heatmap",
        }
    }

    /// The transform family this chart type belongs to.
    pub fn family(self) -> ChartFamily {
        match self {
            ChartType::Line | ChartType::Bar | ChartType::Area => ChartFamily::Axis,
            ChartType::Pie => ChartFamily::Pie,
            ChartType::Scatter => ChartFamily::Scatter,
            ChartType::Radar => ChartFamily::Radar,
            ChartType::Funnel => ChartFamily::Funnel,
            ChartType::Heatmap => ChartFamily::Heatmap,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ProcessError;

    fn from_str(s: &str) -> ProcessResult<Self> {
        match s {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "area" => Ok(ChartType::Area),
            "pie" => Ok(ChartType::Pie),
            "scatter" => Ok(ChartType::Scatter),
            "radar" => Ok(ChartType::Radar),
            "funnel" => Ok(ChartType::Funnel),
            "heatmap" => Ok(ChartType::Heatmap),
            other => Err(ProcessError::UnsupportedChartType {
                chart_type: other.to_string(),
            }),
        }
    }
}

/// Transform family. Line, bar and area charts share the axis transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFamily {
    Axis,
    Pie,
    Scatter,
    Radar,
    Funnel,
    Heatmap,
}

impl fmt::Display for ChartFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartFamily::Axis => "axis",
            ChartFamily::Pie => "pie",
            ChartFamily::Scatter => "scatter",
            ChartFamily::Radar => "radar",
            ChartFamily::Funnel => "funnel",
            ChartFamily::Heatmap => "heatmap",
        })
    }
}

/// Fold applied when several rows land in the same output cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Avg,
    Count,
    Max,
    Min,
}

impl Aggregation {
    /// Parse an aggregation name. Unknown names fall back to [`Aggregation::Sum`].
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "avg" => Aggregation::Avg,
            "count" => Aggregation::Count,
            "max" => Aggregation::Max,
            "min" => Aggregation::Min,
            _ => Aggregation::Sum,
        }
    }
}

/// Value ordering for category lists (pie, funnel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a dashboard `sortBy` value. `"desc"` in any case sorts descending, any other
    /// non-empty value ascending; an empty value means no sorting.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            None
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            Some(SortOrder::Asc)
        }
    }
}

/// Line/bar/area chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Line,
    Bar,
    Area,
}

impl AxisKind {
    pub fn chart_type(self) -> ChartType {
        match self {
            AxisKind::Line => ChartType::Line,
            AxisKind::Bar => ChartType::Bar,
            AxisKind::Area => ChartType::Area,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    pub kind: AxisKind,
    pub x_field: String,
    pub y_field: String,
    /// Distinct values of this field become separate series.
    pub series_field: Option<String>,
    pub aggregation: Aggregation,
    /// Tag every series for stacking.
    pub stack: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieConfig {
    pub series_field: String,
    pub value_field: String,
    pub aggregation: Aggregation,
    pub sort_by: Option<SortOrder>,
    /// Keep this many categories and fold the rest into the "other" bucket. `0` keeps all.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterConfig {
    pub x_field: String,
    pub y_field: String,
    pub series_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarConfig {
    pub series_field: String,
    pub value_field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunnelConfig {
    pub series_field: String,
    pub value_field: String,
    pub aggregation: Aggregation,
    pub sort_by: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapConfig {
    pub x_field: String,
    pub y_field: String,
    pub value_field: String,
}

/// Validated processing configuration for one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessConfig {
    Axis(AxisConfig),
    Pie(PieConfig),
    Scatter(ScatterConfig),
    Radar(RadarConfig),
    Funnel(FunnelConfig),
    Heatmap(HeatmapConfig),
}

impl ProcessConfig {
    /// Chart type echoed in the output series.
    pub fn chart_type(&self) -> ChartType {
        match self {
            ProcessConfig::Axis(c) => c.kind.chart_type(),
            ProcessConfig::Pie(_) => ChartType::Pie,
            ProcessConfig::Scatter(_) => ChartType::Scatter,
            ProcessConfig::Radar(_) => ChartType::Radar,
            ProcessConfig::Funnel(_) => ChartType::Funnel,
            ProcessConfig::Heatmap(_) => ChartType::Heatmap,
        }
    }

    pub fn family(&self) -> ChartFamily {
        self.chart_type().family()
    }
}

/// Loose configuration as stored by dashboards.
///
/// Every field is optional here; [`ProcessConfig::try_from`] checks that the selected chart
/// type gets the fields it needs. Empty field names count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProcessConfig {
    pub chart_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
    /// Kept as a string so an unexpected spelling still sorts instead of failing to parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Kept as a string so unknown names fall back to `sum` instead of failing to parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stack: bool,
}

impl RawProcessConfig {
    /// Start a config for `chart_type` with every other setting unset.
    pub fn new(chart_type: impl Into<String>) -> Self {
        Self {
            chart_type: chart_type.into(),
            ..Default::default()
        }
    }

    /// Validate into a typed [`ProcessConfig`].
    pub fn validate(&self) -> ProcessResult<ProcessConfig> {
        ProcessConfig::try_from(self)
    }

    fn sort_order(&self) -> Option<SortOrder> {
        self.sort_by.as_deref().and_then(SortOrder::parse_lenient)
    }

    fn aggregation(&self) -> Aggregation {
        self.aggregation
            .as_deref()
            .map(Aggregation::parse_lenient)
            .unwrap_or_default()
    }
}

/// Collects the required fields of one family and reports every missing one at once.
struct Required {
    family: ChartFamily,
    missing: Vec<&'static str>,
}

impl Required {
    fn new(family: ChartFamily) -> Self {
        Self {
            family,
            missing: Vec::new(),
        }
    }

    fn take(&mut self, name: &'static str, value: &Option<String>) -> String {
        match non_empty(value) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn finish<T>(self, config: T) -> ProcessResult<T> {
        if self.missing.is_empty() {
            Ok(config)
        } else {
            Err(ProcessError::MissingRequiredField {
                family: self.family,
                fields: self.missing,
            })
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

impl TryFrom<&RawProcessConfig> for ProcessConfig {
    type Error = ProcessError;

    fn try_from(raw: &RawProcessConfig) -> ProcessResult<Self> {
        let chart_type: ChartType = raw.chart_type.parse()?;
        let mut req = Required::new(chart_type.family());

        match chart_type {
            ChartType::Line | ChartType::Bar | ChartType::Area => {
                let kind = match chart_type {
                    ChartType::Line => AxisKind::Line,
                    ChartType::Bar => AxisKind::Bar,
                    _ => AxisKind::Area,
                };
                let x_field = req.take("xField", &raw.x_field);
                let y_field = req.take("yField", &raw.y_field);
                req.finish(ProcessConfig::Axis(AxisConfig {
                    kind,
                    x_field,
                    y_field,
                    series_field: non_empty(&raw.series_field),
                    aggregation: raw.aggregation(),
                    stack: raw.stack,
                }))
            }
            ChartType::Pie => {
                let series_field = req.take("seriesField", &raw.series_field);
                let value_field = req.take("valueField", &raw.value_field);
                req.finish(ProcessConfig::Pie(PieConfig {
                    series_field,
                    value_field,
                    aggregation: raw.aggregation(),
                    sort_by: raw.sort_order(),
                    limit: raw.limit,
                }))
            }
            ChartType::Scatter => {
                let x_field = req.take("xField", &raw.x_field);
                let y_field = req.take("yField", &raw.y_field);
                req.finish(ProcessConfig::Scatter(ScatterConfig {
                    x_field,
                    y_field,
                    series_field: non_empty(&raw.series_field),
                }))
            }
            ChartType::Radar => {
                let series_field = req.take("seriesField", &raw.series_field);
                let value_field = req.take("valueField", &raw.value_field);
                req.finish(ProcessConfig::Radar(RadarConfig {
                    series_field,
                    value_field,
                }))
            }
            ChartType::Funnel => {
                let series_field = req.take("seriesField", &raw.series_field);
                let value_field = req.take("valueField", &raw.value_field);
                req.finish(ProcessConfig::Funnel(FunnelConfig {
                    series_field,
                    value_field,
                    aggregation: raw.aggregation(),
                    sort_by: raw.sort_order(),
                }))
            }
            ChartType::Heatmap => {
                let x_field = req.take("xField", &raw.x_field);
                let y_field = req.take("yField", &raw.y_field);
                let value_field = req.take("valueField", &raw.value_field);
                req.finish(ProcessConfig::Heatmap(HeatmapConfig {
                    x_field,
                    y_field,
                    value_field,
                }))
            }
        }
    }
}

impl TryFrom<RawProcessConfig> for ProcessConfig {
    type Error = ProcessError;

    fn try_from(raw: RawProcessConfig) -> ProcessResult<Self> {
        ProcessConfig::try_from(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Aggregation, AxisKind, ChartFamily, ChartType, ProcessConfig, RawProcessConfig, SortOrder,
    };
    use crate::error::ProcessError;

    #[test]
    fn raw_config_deserializes_from_camel_case_json() {
        let raw: RawProcessConfig = serde_json::from_str(
            r#"{"chartType":"pie","seriesField":"cat","valueField":"v","sortBy":"desc","limit":2}"#,
        )
        .unwrap();
        assert_eq!(raw.chart_type, "pie");
        assert_eq!(raw.sort_by.as_deref(), Some("desc"));
        assert_eq!(raw.limit, Some(2));
        assert!(!raw.stack);
    }

    #[test]
    fn axis_config_validates_and_defaults_aggregation() {
        let raw = RawProcessConfig {
            x_field: Some("m".into()),
            y_field: Some("v".into()),
            series_field: Some(String::new()),
            stack: true,
            ..RawProcessConfig::new("area")
        };
        match raw.validate().unwrap() {
            ProcessConfig::Axis(c) => {
                assert_eq!(c.kind, AxisKind::Area);
                assert_eq!(c.series_field, None);
                assert_eq!(c.aggregation, Aggregation::Sum);
                assert!(c.stack);
            }
            other => panic!("expected axis config, got {other:?}"),
        }
    }

    #[test]
    fn sort_order_parses_leniently() {
        assert_eq!(SortOrder::parse_lenient("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse_lenient("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse_lenient("ascending"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse_lenient(""), None);

        let raw: RawProcessConfig = serde_json::from_str(
            r#"{"chartType":"funnel","seriesField":"s","valueField":"v","sortBy":"DESC"}"#,
        )
        .unwrap();
        match raw.validate().unwrap() {
            ProcessConfig::Funnel(c) => assert_eq!(c.sort_by, Some(SortOrder::Desc)),
            other => panic!("expected funnel config, got {other:?}"),
        }
    }

    #[test]
    fn unknown_aggregation_falls_back_to_sum() {
        assert_eq!(Aggregation::parse_lenient("median"), Aggregation::Sum);
        assert_eq!(Aggregation::parse_lenient("avg"), Aggregation::Avg);
    }

    #[test]
    fn unsupported_chart_type_is_rejected() {
        let err = RawProcessConfig::new("treemap").validate().unwrap_err();
        assert_eq!(
            err,
            ProcessError::UnsupportedChartType {
                chart_type: "treemap".to_string()
            }
        );
    }

    #[test]
    fn every_missing_field_is_reported_with_family() {
        let raw = RawProcessConfig {
            x_field: Some("x".into()),
            y_field: Some(String::new()),
            ..RawProcessConfig::new("heatmap")
        };
        assert_eq!(
            raw.validate().unwrap_err(),
            ProcessError::MissingRequiredField {
                family: ChartFamily::Heatmap,
                fields: vec!["yField", "valueField"],
            }
        );
    }

    #[test]
    fn chart_type_maps_to_family() {
        assert_eq!(ChartType::Bar.family(), ChartFamily::Axis);
        assert_eq!(ChartType::Funnel.family(), ChartFamily::Funnel);
        assert_eq!("scatter".parse::<ChartType>().unwrap(), ChartType::Scatter);
    }
}
