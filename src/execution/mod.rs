//! Batch execution of chart transforms with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel execution of many chart requests (one dashboard refresh, say) on a dedicated
//!   rayon pool
//! - A cap on concurrently running charts
//! - Real-time metrics + observer hooks for monitoring
//!
//! Each chart is still transformed single-threaded by [`process_request`]; results come back
//! in job order regardless of completion order.

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::config::RawProcessConfig;
use crate::error::ProcessResult;
use crate::observability::ProcessStats;
use crate::output::ProcessedData;
use crate::processing::{process_request, ProcessOptions};
use crate::types::DataSet;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// One chart to produce: a dataset and the dashboard config to apply to it.
///
/// Datasets are shared, so several charts over the same query result don't copy rows.
#[derive(Debug, Clone)]
pub struct ChartJob {
    pub dataset: Arc<DataSet>,
    pub config: RawProcessConfig,
}

impl ChartJob {
    pub fn new(dataset: Arc<DataSet>, config: RawProcessConfig) -> Self {
        Self { dataset, config }
    }
}

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on concurrently running charts.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_charts: usize,
    /// Options applied to every chart in a batch.
    pub process: ProcessOptions,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            max_in_flight_charts: n.max(1),
            process: ProcessOptions::default(),
        }
    }
}

/// Runs batches of [`ChartJob`]s on its own thread pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `max_in_flight_charts == 0` or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> Result<Self, ThreadPoolBuildError> {
        assert!(
            opts.max_in_flight_charts > 0,
            "max_in_flight_charts must be > 0"
        );
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new().num_threads(n_threads).build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Process every job and return one result per job, in job order.
    ///
    /// A failing chart does not affect the others.
    pub fn run(&self, jobs: &[ChartJob]) -> Vec<ProcessResult<ProcessedData>> {
        self.pool.install(|| self.run_impl(jobs))
    }

    fn run_impl(&self, jobs: &[ChartJob]) -> Vec<ProcessResult<ProcessedData>> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted { charts: jobs.len() });

        let sem = Semaphore::new(self.opts.max_in_flight_charts);
        let results: Vec<ProcessResult<ProcessedData>> = jobs
            .par_iter()
            .enumerate()
            .map(|(index, job)| {
                let (_permit, waited) = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited {
                        index,
                        duration: waited,
                    });
                }

                let rows = job.dataset.row_count();
                self.metrics.on_chart_start();
                self.emit(ExecutionEvent::ChartStarted {
                    index,
                    chart_type: job.config.chart_type.clone(),
                    rows,
                });

                let result = process_request(&job.dataset, &job.config, &self.opts.process);

                self.emit(ExecutionEvent::ChartFinished {
                    index,
                    result: result
                        .as_ref()
                        .map(|out| ProcessStats::of(rows, out))
                        .map_err(Clone::clone),
                });
                self.metrics.on_chart_end(rows, result.is_err());
                result
            })
            .collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        results
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartJob, ExecutionEngine, ExecutionOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::RawProcessConfig;
    use crate::execution::{ExecutionEvent, ExecutionObserver};
    use crate::processing::ProcessOptions;
    use crate::types::{DataSet, Value};

    fn dataset_of_n(n: usize) -> Arc<DataSet> {
        Arc::new(DataSet::from_records((0..n as i64).map(|i| {
            vec![("x", Value::Int64(i)), ("y", Value::Int64(i * 2))]
        })))
    }

    fn scatter() -> RawProcessConfig {
        RawProcessConfig {
            x_field: Some("x".into()),
            y_field: Some("y".into()),
            ..RawProcessConfig::new("scatter")
        }
    }

    struct ConcurrencyObserver {
        active_charts: AtomicUsize,
        max_active_charts: AtomicUsize,
    }

    impl ConcurrencyObserver {
        fn new() -> Self {
            Self {
                active_charts: AtomicUsize::new(0),
                max_active_charts: AtomicUsize::new(0),
            }
        }
        fn max(&self) -> usize {
            self.max_active_charts.load(Ordering::SeqCst)
        }
    }

    impl ExecutionObserver for ConcurrencyObserver {
        fn on_event(&self, event: &ExecutionEvent) {
            match event {
                ExecutionEvent::ChartStarted { .. } => {
                    let now = self.active_charts.fetch_add(1, Ordering::SeqCst) + 1;
                    let _ = self.max_active_charts.fetch_max(now, Ordering::SeqCst);
                }
                ExecutionEvent::ChartFinished { .. } => {
                    let _ = self.active_charts.fetch_sub(1, Ordering::SeqCst);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn max_in_flight_charts_throttles_chart_concurrency() {
        let ds = dataset_of_n(2_000);
        let observer = Arc::new(ConcurrencyObserver::new());
        let obs_trait: Arc<dyn ExecutionObserver> = observer.clone();
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(4),
            max_in_flight_charts: 1,
            process: ProcessOptions::default(),
        })
        .unwrap()
        .with_observer(obs_trait);

        let jobs: Vec<ChartJob> = (0..32).map(|_| ChartJob::new(Arc::clone(&ds), scatter())).collect();
        let results = engine.run(&jobs);

        assert_eq!(results.len(), jobs.len());
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(observer.max(), 1);
    }

    #[test]
    fn metrics_count_charts_rows_and_failures() {
        let ds = dataset_of_n(50);
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(2),
            max_in_flight_charts: 2,
            process: ProcessOptions::default(),
        })
        .unwrap();
        let metrics = engine.metrics();

        let jobs = vec![
            ChartJob::new(Arc::clone(&ds), scatter()),
            ChartJob::new(Arc::clone(&ds), RawProcessConfig::new("gauge")),
            ChartJob::new(Arc::clone(&ds), scatter()),
        ];
        let results = engine.run(&jobs);
        assert!(results[1].is_err());

        let snap = metrics.snapshot();
        assert_eq!(snap.charts_started, 3);
        assert_eq!(snap.charts_finished, 3);
        assert_eq!(snap.charts_failed, 1);
        assert_eq!(snap.rows_processed, 150);
        assert!(snap.max_active_charts >= 1 && snap.max_active_charts <= 2);
        assert!(snap.elapsed.is_some());
    }

    #[test]
    fn empty_batch_returns_no_results() {
        let engine = ExecutionEngine::new(ExecutionOptions::default()).unwrap();
        assert!(engine.run(&[]).is_empty());
        assert_eq!(engine.metrics().snapshot().charts_started, 0);
    }
}
