//! A single concurrency level: spawn, join, reduce.
use crate::collector::SampleCollector;
use crate::pacer::Pacer;
use crate::transport::{HttpTransport, Transport};
use crate::worker::Worker;
use crate::BenchError;
use fire_bench_core::{ConcurrencyResult, ConfigError, RunRequest};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Run one concurrency level against `request.url` over HTTP.
pub async fn run_concurrency(
    request: &RunRequest,
    concurrency: usize,
) -> Result<ConcurrencyResult, BenchError> {
    let transport = HttpTransport::new(request)?;
    run_concurrency_with(Arc::new(transport), request, concurrency).await
}

/// Run one concurrency level with a caller-provided transport.
///
/// Exactly `concurrency` workers share a single deadline, fixed here at `now + duration`, and a
/// single collector. The level is finished only once every worker has stopped; its samples are
/// then reduced into a [`ConcurrencyResult`]. Request failures are counted, never returned.
#[instrument(name = "level", skip_all, fields(concurrency = concurrency))]
pub async fn run_concurrency_with<T: Transport>(
    transport: Arc<T>,
    request: &RunRequest,
    concurrency: usize,
) -> Result<ConcurrencyResult, BenchError> {
    request.validate()?;
    if concurrency == 0 {
        return Err(ConfigError::ZeroConcurrency { index: 0 }.into());
    }

    debug!(
        "Starting {} workers for {}",
        concurrency,
        humantime::format_duration(request.duration)
    );

    let start = Instant::now();
    let deadline = start + request.duration;
    let collector = SampleCollector::new();

    let handles: Vec<JoinHandle<u64>> = (0..concurrency)
        .map(|id| {
            let pacer = Pacer::new(request.pacing, request.avg_jitter_secs);
            let worker = Worker::new(id, transport.clone(), pacer, deadline, collector.clone());
            tokio::spawn(worker.run().in_current_span())
        })
        .collect();

    // NOTE: Join every worker, even after a failure, so no task outlives the level.
    let mut attempts = 0;
    let mut failure = None;
    for handle in handles {
        match handle.await {
            Ok(count) => attempts += count,
            Err(err) => {
                error!("Worker task failed: {err}");
                failure.get_or_insert(err);
            }
        }
    }
    if let Some(err) = failure {
        return Err(BenchError::WorkerPanicked(err));
    }

    let elapsed = start.elapsed();
    let samples = collector.collect();
    debug_assert_eq!(samples.count(), attempts);

    let result = ConcurrencyResult::from_samples(
        concurrency,
        request.duration,
        elapsed,
        samples.latencies_ms,
        samples.errors,
    );
    info!("{result}");

    Ok(result)
}
