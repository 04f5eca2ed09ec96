//! The chart-data transformation engine.
//!
//! Entry points:
//!
//! - [`process()`]: transform a [`DataSet`] for a validated [`ProcessConfig`] with default
//!   options.
//! - [`process_with_options()`]: same, with a numeric policy, "other" label and observer.
//! - [`process_request()`]: validate a dashboard [`RawProcessConfig`] first, then transform.
//!
//! Every call is a pure function of its inputs: rows are only read, nothing is cached between
//! calls, and equal inputs give equal outputs. Empty input always yields
//! [`ProcessedData::empty`].
//!
//! ## Example: grouped bar chart
//!
//! ```rust
//! use chart_data_processing::config::RawProcessConfig;
//! use chart_data_processing::ingestion::ingest_json_from_str;
//! use chart_data_processing::output::SeriesData;
//! use chart_data_processing::processing::{process_request, ProcessOptions};
//!
//! let rows = ingest_json_from_str(
//!     r#"[{"m":"Jan","type":"X","v":1},{"m":"Feb","type":"X","v":2},{"m":"Jan","type":"Y","v":3}]"#,
//! )
//! .unwrap();
//! let config = RawProcessConfig {
//!     x_field: Some("m".into()),
//!     y_field: Some("v".into()),
//!     series_field: Some("type".into()),
//!     aggregation: Some("sum".into()),
//!     ..RawProcessConfig::new("bar")
//! };
//!
//! let out = process_request(&rows, &config, &ProcessOptions::default()).unwrap();
//! assert_eq!(out.series[1].data, SeriesData::Values(vec![3.0, 0.0]));
//! ```

mod aggregate;
mod axis;
mod category;
mod columns;
mod domain;
mod heatmap;
mod radar;
mod scatter;

use std::fmt;
use std::sync::Arc;

use crate::config::{ProcessConfig, RawProcessConfig};
use crate::error::ProcessResult;
use crate::observability::{report, ProcessContext, ProcessObserver, ProcessSeverity};
use crate::output::ProcessedData;
use crate::types::DataSet;

use columns::NumberReader;

/// Label of the synthetic pie bucket holding categories beyond `limit`.
pub const DEFAULT_OTHER_LABEL: &str = "其他";

/// How cells that do not coerce to a number are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericPolicy {
    /// Coerce to `NaN` and carry it into the output (axis cells render it as `0`).
    #[default]
    Permissive,
    /// Fail the whole call with [`crate::error::ProcessError::InvalidNumber`].
    Strict,
}

/// Options controlling a transform.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ProcessOptions {
    pub numeric_policy: NumericPolicy,
    /// Name of the pie "other" bucket.
    pub other_label: String,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ProcessObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ProcessSeverity,
}

impl fmt::Debug for ProcessOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessOptions")
            .field("numeric_policy", &self.numeric_policy)
            .field("other_label", &self.other_label)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            numeric_policy: NumericPolicy::Permissive,
            other_label: DEFAULT_OTHER_LABEL.to_string(),
            observer: None,
            alert_at_or_above: ProcessSeverity::Error,
        }
    }
}

/// Transform `dataset` for `config` with default options.
pub fn process(dataset: &DataSet, config: &ProcessConfig) -> ProcessResult<ProcessedData> {
    process_with_options(dataset, config, &ProcessOptions::default())
}

/// Transform `dataset` for `config`.
///
/// When an observer is configured, the outcome is reported to it.
pub fn process_with_options(
    dataset: &DataSet,
    config: &ProcessConfig,
    options: &ProcessOptions,
) -> ProcessResult<ProcessedData> {
    let result = dispatch(dataset, config, options);
    let ctx = ProcessContext {
        chart_type: config.chart_type().to_string(),
        rows: dataset.row_count(),
    };
    report(options.observer.as_ref(), options.alert_at_or_above, &ctx, &result);
    result
}

/// Validate a dashboard config, then transform `dataset`.
///
/// Validation happens before any row is looked at, so an unsupported chart type or a missing
/// field fails even for empty input.
pub fn process_request(
    dataset: &DataSet,
    config: &RawProcessConfig,
    options: &ProcessOptions,
) -> ProcessResult<ProcessedData> {
    match config.validate() {
        Ok(validated) => process_with_options(dataset, &validated, options),
        Err(e) => {
            let result = Err(e);
            let ctx = ProcessContext {
                chart_type: config.chart_type.clone(),
                rows: dataset.row_count(),
            };
            report(options.observer.as_ref(), options.alert_at_or_above, &ctx, &result);
            result
        }
    }
}

fn dispatch(
    dataset: &DataSet,
    config: &ProcessConfig,
    options: &ProcessOptions,
) -> ProcessResult<ProcessedData> {
    if dataset.is_empty() {
        return Ok(ProcessedData::empty());
    }

    let numbers = NumberReader::new(options.numeric_policy);
    match config {
        ProcessConfig::Axis(c) => axis::process_axis(dataset, c, &numbers),
        ProcessConfig::Pie(c) => category::process_pie(dataset, c, &numbers, &options.other_label),
        ProcessConfig::Scatter(c) => scatter::process_scatter(dataset, c, &numbers),
        ProcessConfig::Radar(c) => radar::process_radar(dataset, c, &numbers),
        ProcessConfig::Funnel(c) => category::process_funnel(dataset, c, &numbers),
        ProcessConfig::Heatmap(c) => heatmap::process_heatmap(dataset, c, &numbers),
    }
}
