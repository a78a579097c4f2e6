use crate::executor::Sample;
use metrics_util::AtomicBucket;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared sink for the samples of one concurrency level.
///
/// Cloning is cheap and every clone feeds the same lock-free storage, so each worker holds its
/// own handle and pushes without coordinating with the others.
#[derive(Clone)]
pub(crate) struct SampleCollector {
    latency: Arc<AtomicBucket<Duration>>,
    error: Arc<AtomicU64>,
}

impl SampleCollector {
    pub fn new() -> Self {
        Self {
            latency: Arc::new(AtomicBucket::new()),
            error: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record(&self, sample: Sample) {
        match sample {
            Sample::Latency(latency) => self.latency.push(latency),
            Sample::Error => {
                self.error.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Drain everything recorded so far: successful latencies in milliseconds plus the error
    /// count. Only meaningful once every worker has been joined.
    pub fn collect(&self) -> CollectedSamples {
        let errors = self.error.swap(0, Ordering::Relaxed);
        let mut latencies_ms = vec![];
        self.latency.clear_with(|chunk| {
            latencies_ms.extend(chunk.iter().map(|d| d.as_secs_f64() * 1_000.));
        });

        CollectedSamples {
            latencies_ms,
            errors,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CollectedSamples {
    pub latencies_ms: Vec<f64>,
    pub errors: u64,
}

impl CollectedSamples {
    pub fn count(&self) -> u64 {
        self.latencies_ms.len() as u64 + self.errors
    }
}
