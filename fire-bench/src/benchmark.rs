//! Benchmark orchestration across concurrency levels.
use crate::run::run_concurrency_with;
use crate::transport::{HttpTransport, Transport};
use crate::BenchError;
use fire_bench_core::{validate_levels, BenchmarkReport, ConcurrencyResult, RunRequest};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

type Connect<T> = Arc<dyn Fn(&RunRequest) -> Result<T, BenchError> + Send + Sync>;
type LevelHook = Arc<dyn Fn(usize, &ConcurrencyResult) + Send + Sync>;
type RunnerFuture = Pin<Box<dyn Future<Output = Result<BenchmarkReport, BenchError>> + Send>>;

/// A benchmark over a sequence of concurrency levels.
///
/// `Benchmark` is a future: configure it with the chained setters and `.await` it to get the
/// [`BenchmarkReport`]. Levels run one after another in the order given, each with a fresh
/// transport, so no two levels ever overlap.
///
/// # Example
/// ```no_run
/// use fire_bench::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let request = RunRequest::new("http://localhost:3002/echo")
///         .method(HttpMethod::Post)
///         .body("hello")
///         .duration(Duration::from_secs(5));
///
///     let report = Benchmark::new(request)
///         .levels([5, 10, 20])
///         .on_level(|_, row| println!("{row}"))
///         .await
///         .unwrap();
///
///     assert_eq!(report.levels(), vec![5, 10, 20]);
/// }
/// ```
#[pin_project::pin_project]
pub struct Benchmark<T = HttpTransport> {
    request: RunRequest,
    levels: Vec<usize>,
    connect: Connect<T>,
    on_level: Option<LevelHook>,
    runner_fut: Option<RunnerFuture>,
}

impl Benchmark<HttpTransport> {
    pub fn new(request: RunRequest) -> Self {
        Self::with_connector(request, HttpTransport::new)
    }
}

impl<T: Transport> Benchmark<T> {
    /// Use a custom transport. `connect` is called once per level, before that level starts.
    pub fn with_connector<C>(request: RunRequest, connect: C) -> Self
    where
        C: Fn(&RunRequest) -> Result<T, BenchError> + Send + Sync + 'static,
    {
        Self {
            request,
            levels: vec![],
            connect: Arc::new(connect),
            on_level: None,
            runner_fut: None,
        }
    }

    /// Concurrency levels to run, in order.
    pub fn levels(mut self, levels: impl Into<Vec<usize>>) -> Self {
        self.levels = levels.into();
        self
    }

    /// Called with the level's index and result as soon as each level finishes.
    pub fn on_level<F>(mut self, hook: F) -> Self
    where
        F: Fn(usize, &ConcurrencyResult) + Send + Sync + 'static,
    {
        self.on_level = Some(Arc::new(hook));
        self
    }
}

impl<T: Transport> Future for Benchmark<T> {
    type Output = Result<BenchmarkReport, BenchError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let runner = this.runner_fut.get_or_insert_with(|| {
            Box::pin(run_benchmark(
                this.request.clone(),
                this.levels.clone(),
                this.connect.clone(),
                this.on_level.clone(),
            ))
        });

        runner.as_mut().poll(cx)
    }
}

#[instrument(name = "benchmark", skip_all, fields(url = %request.url))]
pub(crate) async fn run_benchmark<T: Transport>(
    request: RunRequest,
    levels: Vec<usize>,
    connect: Connect<T>,
    on_level: Option<LevelHook>,
) -> Result<BenchmarkReport, BenchError> {
    request.validate()?;
    validate_levels(&levels)?;

    // NOTE: Build the first transport up front so that setup failures surface before any
    // level has run.
    let mut pending = Some(connect(&request)?);

    info!("Running {} at concurrency levels {:?}", request, levels);

    let mut report = BenchmarkReport::with_capacity(levels.len());
    for (idx, &concurrency) in levels.iter().enumerate() {
        let transport = match pending.take() {
            Some(transport) => transport,
            None => connect(&request)?,
        };

        let result = run_concurrency_with(Arc::new(transport), &request, concurrency).await?;

        if let Some(hook) = &on_level {
            hook(idx, &result);
        }
        report.push(result);
    }

    info!("Benchmark complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::tests::MockTransport;
    use fire_bench_core::{ConfigError, PacingMode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn request() -> RunRequest {
        RunRequest::new("http://mock.local/")
            .pacing(PacingMode::Burst)
            .duration(Duration::from_secs(1))
    }

    #[tracing_test::traced_test]
    #[tokio::test(start_paused = true)]
    async fn levels_run_in_order() {
        let report = Benchmark::with_connector(request(), |_| {
            Ok(MockTransport::ok(Duration::from_millis(10)))
        })
        .levels([1, 5])
        .await
        .unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.levels(), vec![1, 5]);
        assert!(report[1].successful_requests > report[0].successful_requests);
        assert!(logs_contain("Benchmark complete"));
    }

    #[tokio::test(start_paused = true)]
    async fn levels_do_not_overlap() {
        let start = tokio::time::Instant::now();
        let report = Benchmark::with_connector(request(), |_| {
            Ok(MockTransport::ok(Duration::from_millis(10)))
        })
        .levels(vec![3, 1, 2])
        .await
        .unwrap();

        assert_eq!(report.levels(), vec![3, 1, 2]);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_transport_per_level() {
        let connects = Arc::new(AtomicUsize::new(0));
        let counter = connects.clone();
        Benchmark::with_connector(request(), move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(MockTransport::ok(Duration::from_millis(50)))
        })
        .levels([2, 2, 2, 2])
        .await
        .unwrap();

        assert_eq!(connects.load(Ordering::Relaxed), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn hook_sees_each_level() {
        let seen = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        Benchmark::with_connector(request(), |_| {
            Ok(MockTransport::failing(Duration::from_millis(20)))
        })
        .levels([4, 2])
        .on_level(move |idx, row| sink.lock().unwrap().push((idx, row.concurrency, row.error_rate)))
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(0, 4, 1.), (1, 2, 1.)]);
    }

    #[tokio::test]
    async fn config_errors_before_any_level() {
        let connects = Arc::new(AtomicUsize::new(0));
        let counter = connects.clone();
        let connector = move |_: &RunRequest| -> Result<MockTransport, BenchError> {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(MockTransport::ok(Duration::from_millis(1)))
        };

        let res = Benchmark::with_connector(request(), connector.clone())
            .levels([1, 0])
            .await;
        assert!(matches!(
            res,
            Err(BenchError::Config(ConfigError::ZeroConcurrency { index: 1 }))
        ));

        let res = Benchmark::with_connector(request(), connector.clone()).await;
        assert!(matches!(
            res,
            Err(BenchError::Config(ConfigError::NoConcurrencyLevels))
        ));

        let res = Benchmark::with_connector(request().duration(Duration::ZERO), connector)
            .levels([1])
            .await;
        assert!(matches!(res, Err(BenchError::Config(ConfigError::ZeroDuration))));

        assert_eq!(connects.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn connector_failure_is_fatal() {
        let res = Benchmark::with_connector(request(), |_| -> Result<MockTransport, BenchError> {
            Err(ConfigError::InvalidHeader {
                name: "x".to_string(),
                reason: "bad".to_string(),
            }
            .into())
        })
        .levels([1])
        .await;

        assert!(matches!(
            res,
            Err(BenchError::Config(ConfigError::InvalidHeader { .. }))
        ));
    }

    #[tokio::test]
    async fn http_benchmark_rejects_malformed_url() {
        let res = Benchmark::new(RunRequest::new("http//missing-colon"))
            .levels([1])
            .await;
        assert!(matches!(
            res,
            Err(BenchError::Config(ConfigError::InvalidUrl { .. }))
        ));
    }
}
