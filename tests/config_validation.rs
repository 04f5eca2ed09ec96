use chart_data_processing::config::{ChartFamily, ProcessConfig, RawProcessConfig};
use chart_data_processing::error::ProcessError;
use chart_data_processing::output::ProcessedData;
use chart_data_processing::processing::{process_request, NumericPolicy, ProcessOptions};
use chart_data_processing::types::{DataSet, Value};

fn rows() -> DataSet {
    DataSet::from_records(vec![
        vec![("m", Value::from("Jan")), ("v", Value::Int64(1))],
        vec![("m", Value::from("Feb")), ("v", Value::from("12abc"))],
    ])
}

#[test]
fn unknown_chart_type_is_rejected_even_without_rows() {
    for ds in [DataSet::default(), rows()] {
        let err = process_request(&ds, &RawProcessConfig::new("gauge"), &ProcessOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            ProcessError::UnsupportedChartType {
                chart_type: "gauge".to_string()
            }
        );
        assert_eq!(err.to_string(), "unsupported chart type: gauge");
    }
}

#[test]
fn missing_fields_are_listed_per_family() {
    let err = RawProcessConfig::new("heatmap").validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "xField, yField and valueField are required for heatmap charts"
    );

    let err = RawProcessConfig {
        series_field: Some("m".into()),
        ..RawProcessConfig::new("pie")
    }
    .validate()
    .unwrap_err();
    assert_eq!(
        err,
        ProcessError::MissingRequiredField {
            family: ChartFamily::Pie,
            fields: vec!["valueField"],
        }
    );
}

#[test]
fn empty_field_names_count_as_missing() {
    let cfg = RawProcessConfig {
        x_field: Some(String::new()),
        y_field: Some("v".into()),
        ..RawProcessConfig::new("line")
    };
    assert!(matches!(
        cfg.validate(),
        Err(ProcessError::MissingRequiredField {
            family: ChartFamily::Axis,
            ..
        })
    ));
}

#[test]
fn valid_empty_input_returns_empty_output() {
    let cfg = RawProcessConfig {
        x_field: Some("m".into()),
        y_field: Some("v".into()),
        ..RawProcessConfig::new("bar")
    };
    let out = process_request(&DataSet::default(), &cfg, &ProcessOptions::default()).unwrap();
    assert_eq!(out, ProcessedData::empty());
    assert_eq!(serde_json::to_value(&out).unwrap(), serde_json::json!({"series": []}));
}

#[test]
fn unknown_aggregation_falls_back_to_sum() {
    let cfg = RawProcessConfig {
        x_field: Some("m".into()),
        y_field: Some("v".into()),
        aggregation: Some("median".into()),
        ..RawProcessConfig::new("bar")
    };
    match ProcessConfig::try_from(&cfg).unwrap() {
        ProcessConfig::Axis(axis) => assert_eq!(axis.aggregation, Default::default()),
        other => panic!("expected axis config, got {other:?}"),
    }
}

#[test]
fn strict_policy_reports_the_offending_row() {
    let cfg = RawProcessConfig {
        x_field: Some("m".into()),
        y_field: Some("v".into()),
        ..RawProcessConfig::new("line")
    };
    let strict = ProcessOptions {
        numeric_policy: NumericPolicy::Strict,
        ..ProcessOptions::default()
    };
    let err = process_request(&rows(), &cfg, &strict).unwrap_err();
    assert_eq!(
        err,
        ProcessError::InvalidNumber {
            row: 2,
            field: "v".to_string(),
            raw: "12abc".to_string(),
        }
    );

    // The same rows are accepted permissively.
    assert!(process_request(&rows(), &cfg, &ProcessOptions::default()).is_ok());
}
