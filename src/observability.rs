//! Outcome reporting for chart transforms.
//!
//! Transforms report to an optional [`ProcessObserver`] configured on
//! [`crate::processing::ProcessOptions`]: `on_success` with output stats, `on_failure` with a
//! severity, and `on_alert` when the severity meets the configured threshold.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ProcessError;
use crate::output::ProcessedData;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProcessSeverity {
    /// Bad data in an otherwise valid request (strict numeric policy).
    Warning,
    /// Misconfigured request: unknown chart type or missing fields.
    Error,
}

impl ProcessSeverity {
    pub fn for_error(e: &ProcessError) -> Self {
        match e {
            ProcessError::InvalidNumber { .. } => ProcessSeverity::Warning,
            ProcessError::UnsupportedChartType { .. } | ProcessError::MissingRequiredField { .. } => {
                ProcessSeverity::Error
            }
        }
    }
}

/// What was being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessContext {
    /// Requested chart type, as given (may be unsupported).
    pub chart_type: String,
    /// Number of input rows.
    pub rows: usize,
}

/// Shape of a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStats {
    pub rows: usize,
    pub series: usize,
    /// Data points across all series.
    pub points: usize,
}

impl ProcessStats {
    pub fn of(rows: usize, out: &ProcessedData) -> Self {
        Self {
            rows,
            series: out.series.len(),
            points: out.point_count(),
        }
    }
}

/// Observer interface for transform outcomes.
pub trait ProcessObserver: Send + Sync {
    /// Called when a transform succeeds.
    fn on_success(&self, _ctx: &ProcessContext, _stats: ProcessStats) {}

    /// Called when a transform fails.
    fn on_failure(&self, _ctx: &ProcessContext, _severity: ProcessSeverity, _error: &ProcessError) {}

    /// Called when a failure meets the alert threshold. Forwards to [`Self::on_failure`] by
    /// default.
    fn on_alert(&self, ctx: &ProcessContext, severity: ProcessSeverity, error: &ProcessError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ProcessObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ProcessObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ProcessObserver for CompositeObserver {
    fn on_success(&self, ctx: &ProcessContext, stats: ProcessStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ProcessContext, severity: ProcessSeverity, error: &ProcessError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ProcessContext, severity: ProcessSeverity, error: &ProcessError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs transform outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ProcessObserver for StdErrObserver {
    fn on_success(&self, ctx: &ProcessContext, stats: ProcessStats) {
        eprintln!(
            "[chart][ok] type={} rows={} series={} points={}",
            ctx.chart_type, stats.rows, stats.series, stats.points
        );
    }

    fn on_failure(&self, ctx: &ProcessContext, severity: ProcessSeverity, error: &ProcessError) {
        eprintln!(
            "[chart][{:?}] type={} rows={} err={}",
            severity, ctx.chart_type, ctx.rows, error
        );
    }

    fn on_alert(&self, ctx: &ProcessContext, severity: ProcessSeverity, error: &ProcessError) {
        eprintln!(
            "[ALERT][chart][{:?}] type={} rows={} err={}",
            severity, ctx.chart_type, ctx.rows, error
        );
    }
}

/// Appends transform outcomes to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ProcessObserver for FileObserver {
    fn on_success(&self, ctx: &ProcessContext, stats: ProcessStats) {
        self.append_line(&format!(
            "{} ok type={} rows={} series={} points={}",
            unix_ts(),
            ctx.chart_type,
            stats.rows,
            stats.series,
            stats.points
        ));
    }

    fn on_failure(&self, ctx: &ProcessContext, severity: ProcessSeverity, error: &ProcessError) {
        self.append_line(&format!(
            "{} fail severity={:?} type={} rows={} err={}",
            unix_ts(),
            severity,
            ctx.chart_type,
            ctx.rows,
            error
        ));
    }

    fn on_alert(&self, ctx: &ProcessContext, severity: ProcessSeverity, error: &ProcessError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} type={} rows={} err={}",
            unix_ts(),
            severity,
            ctx.chart_type,
            ctx.rows,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Route a finished transform to `observer`.
pub(crate) fn report(
    observer: Option<&Arc<dyn ProcessObserver>>,
    alert_at_or_above: ProcessSeverity,
    ctx: &ProcessContext,
    result: &Result<ProcessedData, ProcessError>,
) {
    let Some(obs) = observer else {
        return;
    };
    match result {
        Ok(out) => obs.on_success(ctx, ProcessStats::of(ctx.rows, out)),
        Err(e) => {
            let sev = ProcessSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{
        report, CompositeObserver, FileObserver, ProcessContext, ProcessObserver, ProcessSeverity,
        ProcessStats,
    };
    use crate::error::ProcessError;
    use crate::output::ProcessedData;

    #[derive(Default)]
    struct Counting {
        ok: Mutex<Vec<ProcessStats>>,
        failed: Mutex<Vec<ProcessSeverity>>,
    }

    impl ProcessObserver for Counting {
        fn on_success(&self, _ctx: &ProcessContext, stats: ProcessStats) {
            self.ok.lock().unwrap().push(stats);
        }

        fn on_failure(&self, _ctx: &ProcessContext, severity: ProcessSeverity, _error: &ProcessError) {
            self.failed.lock().unwrap().push(severity);
        }
    }

    fn ctx() -> ProcessContext {
        ProcessContext {
            chart_type: "pie".to_string(),
            rows: 3,
        }
    }

    #[test]
    fn composite_fans_out_and_default_alert_forwards_to_failure() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let composite: Arc<dyn ProcessObserver> =
            Arc::new(CompositeObserver::new(vec![a.clone() as Arc<dyn ProcessObserver>, b.clone()]));

        let err = ProcessError::UnsupportedChartType {
            chart_type: "pie3d".to_string(),
        };
        report(Some(&composite), ProcessSeverity::Error, &ctx(), &Err(err));

        // One failure plus the alert forwarded to on_failure.
        assert_eq!(
            *a.failed.lock().unwrap(),
            vec![ProcessSeverity::Error, ProcessSeverity::Error]
        );
        assert_eq!(b.failed.lock().unwrap().len(), 2);
    }

    #[test]
    fn success_reports_row_count() {
        let obs = Arc::new(Counting::default());
        let dyn_obs: Arc<dyn ProcessObserver> = obs.clone();
        report(Some(&dyn_obs), ProcessSeverity::Error, &ctx(), &Ok(ProcessedData::empty()));
        assert_eq!(
            *obs.ok.lock().unwrap(),
            vec![ProcessStats {
                rows: 3,
                series: 0,
                points: 0
            }]
        );
    }

    #[test]
    fn file_observer_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "chart-data-processing-observer-{}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let obs = FileObserver::new(&path);
        obs.on_success(
            &ctx(),
            ProcessStats {
                rows: 3,
                series: 1,
                points: 3,
            },
        );
        obs.on_failure(
            &ctx(),
            ProcessSeverity::Warning,
            &ProcessError::InvalidNumber {
                row: 2,
                field: "v".to_string(),
                raw: "x".to_string(),
            },
        );

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ok type=pie rows=3 series=1 points=3"));
        assert!(lines[1].contains("fail severity=Warning"));
        let _ = std::fs::remove_file(&path);
    }
}
