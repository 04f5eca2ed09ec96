//! `chart-data-processing` turns tabular query results into the series/axis structures a chart
//! renderer draws.
//!
//! The primary entrypoint is [`processing::process_request`], which validates a dashboard
//! [`config::RawProcessConfig`] and transforms an in-memory [`types::DataSet`] into
//! [`output::ProcessedData`].
//!
//! ## Supported charts
//!
//! | Family  | Chart types             | Required fields                    |
//! |---------|-------------------------|------------------------------------|
//! | axis    | `line`, `bar`, `area`   | `xField`, `yField`                 |
//! | pie     | `pie`                   | `seriesField`, `valueField`        |
//! | scatter | `scatter`               | `xField`, `yField`                 |
//! | radar   | `radar`                 | `seriesField`, `valueField`        |
//! | funnel  | `funnel`                | `seriesField`, `valueField`        |
//! | heatmap | `heatmap`               | `xField`, `yField`, `valueField`   |
//!
//! Axis, pie and funnel charts group rows and fold values with an [`config::Aggregation`]
//! (`sum`, `avg`, `count`, `max`, `min`). Categories keep first-occurrence order unless a pie or
//! funnel config asks for sorting.
//!
//! ## Numbers
//!
//! Cells are coerced to numbers loosely: null is `0`, booleans are `1`/`0`, numeric strings
//! parse, and anything else becomes `NaN`. With [`processing::NumericPolicy::Strict`] a `NaN`
//! fails the call instead.
//!
//! ## Quick example: pie chart with an "other" bucket
//!
//! ```rust
//! use chart_data_processing::config::RawProcessConfig;
//! use chart_data_processing::ingestion::ingest_json_from_str;
//! use chart_data_processing::output::{NamedValue, SeriesData};
//! use chart_data_processing::processing::{process_request, ProcessOptions};
//! use chart_data_processing::types::Value;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = ingest_json_from_str(
//!     r#"[{"c":"A","v":10},{"c":"B","v":5},{"c":"C","v":3},{"c":"D","v":2}]"#,
//! )?;
//! let config = RawProcessConfig {
//!     series_field: Some("c".into()),
//!     value_field: Some("v".into()),
//!     limit: Some(2),
//!     ..RawProcessConfig::new("pie")
//! };
//!
//! let out = process_request(&rows, &config, &ProcessOptions::default())?;
//! assert_eq!(
//!     out.series[0].data,
//!     SeriesData::Named(vec![
//!         NamedValue { name: Value::from("A"), value: 10.0 },
//!         NamedValue { name: Value::from("B"), value: 5.0 },
//!         NamedValue { name: Value::from("其他"), value: 5.0 },
//!     ])
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: chart configs (validated tagged union and the raw dashboard form)
//! - [`processing`]: the transformation engine
//! - [`output`]: renderer-facing output types
//! - [`types`]: schema + in-memory dataset types
//! - [`ingestion`]: loading JSON/CSV query results into a dataset
//! - [`execution`]: parallel batch processing with metrics
//! - [`observability`]: outcome observers
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod observability;
pub mod output;
pub mod processing;
pub mod types;

pub use error::{IngestionError, IngestionResult, ProcessError, ProcessResult};
