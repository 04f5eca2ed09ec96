use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::ProcessError;
use crate::observability::ProcessStats;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { charts: usize },
    ThrottleWaited { index: usize, duration: Duration },
    ChartStarted { index: usize, chart_type: String, rows: usize },
    /// `index` is the job's position in the batch.
    ChartFinished {
        index: usize,
        result: Result<ProcessStats, ProcessError>,
    },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::ChartFinished { index, result: Ok(stats) } => eprintln!(
                "[batch][chart {index}] ok series={} points={}",
                stats.series, stats.points
            ),
            ExecutionEvent::ChartFinished { index, result: Err(e) } => {
                eprintln!("[batch][chart {index}] failed err={e}")
            }
            ExecutionEvent::RunFinished { metrics, .. } => eprintln!("[batch] finished {metrics}"),
            other => eprintln!("[batch] {other:?}"),
        }
    }
}

/// Real-time metrics for a batch run.
///
/// The engine updates these counters during execution; callers can snapshot them at any time.
/// Counters are reset when a new run starts.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    rows_processed: AtomicU64,
    charts_started: AtomicU64,
    charts_finished: AtomicU64,
    charts_failed: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active_charts: AtomicUsize,
    max_active_charts: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            rows_processed: AtomicU64::new(0),
            charts_started: AtomicU64::new(0),
            charts_finished: AtomicU64::new(0),
            charts_failed: AtomicU64::new(0),
            throttle_wait_ns: AtomicU64::new(0),
            active_charts: AtomicUsize::new(0),
            max_active_charts: AtomicUsize::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);

        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.rows_processed.store(0, Ordering::SeqCst);
        self.charts_started.store(0, Ordering::SeqCst);
        self.charts_finished.store(0, Ordering::SeqCst);
        self.charts_failed.store(0, Ordering::SeqCst);
        self.throttle_wait_ns.store(0, Ordering::SeqCst);
        self.active_charts.store(0, Ordering::SeqCst);
        self.max_active_charts.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    pub fn on_chart_start(&self) {
        let _ = self.charts_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_charts.fetch_add(1, Ordering::SeqCst) + 1;
        update_max_usize(&self.max_active_charts, now);
    }

    /// Record a finished chart that read `rows` input rows.
    pub fn on_chart_end(&self, rows: usize, failed: bool) {
        let _ = self.rows_processed.fetch_add(rows as u64, Ordering::SeqCst);
        let _ = self.charts_finished.fetch_add(1, Ordering::SeqCst);
        if failed {
            let _ = self.charts_failed.fetch_add(1, Ordering::SeqCst);
        }
        let _ = self.active_charts.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn on_throttle_wait(&self, d: Duration) {
        let _ = self
            .throttle_wait_ns
            .fetch_add(saturating_nanos(d), Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns));

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            rows_processed: self.rows_processed.load(Ordering::SeqCst),
            charts_started: self.charts_started.load(Ordering::SeqCst),
            charts_finished: self.charts_finished.load(Ordering::SeqCst),
            charts_failed: self.charts_failed.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
            max_active_charts: self.max_active_charts.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u64::MAX as u128) as u64
}

fn update_max_usize(dst: &AtomicUsize, now: usize) {
    let _ = dst.fetch_max(now, Ordering::SeqCst);
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub rows_processed: u64,
    pub charts_started: u64,
    pub charts_finished: u64,
    pub charts_failed: u64,
    pub throttle_wait: Duration,
    pub max_active_charts: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, rows_processed={}, charts={}/{} (failed={}), max_active_charts={}, throttle_wait={:?}, elapsed={:?}",
            self.run_id,
            self.rows_processed,
            self.charts_finished,
            self.charts_started,
            self.charts_failed,
            self.max_active_charts,
            self.throttle_wait,
            self.elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ExecutionMetrics;

    #[test]
    fn begin_run_resets_counters_and_bumps_run_id() {
        let m = ExecutionMetrics::new();
        m.begin_run();
        m.on_chart_start();
        m.on_chart_end(10, true);
        m.end_run(Duration::from_millis(1));
        let first = m.snapshot();
        assert_eq!((first.run_id, first.charts_failed, first.rows_processed), (1, 1, 10));

        m.begin_run();
        let second = m.snapshot();
        assert_eq!(second.run_id, 2);
        assert_eq!(second.charts_started, 0);
        assert_eq!(second.elapsed, None);
    }
}
