//! Issue and time a single request.
use crate::transport::Transport;
use std::time::Duration;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, trace, warn};

#[cfg(feature = "metrics")]
pub const LATENCY_METRIC: &str = "fire_bench.latency";
#[cfg(feature = "metrics")]
pub const SUCCESS_METRIC: &str = "fire_bench.success";
#[cfg(feature = "metrics")]
pub const ERROR_METRIC: &str = "fire_bench.error";

/// Outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// Time from dispatch until the full response body was read.
    Latency(Duration),
    Error,
}

impl Sample {
    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            Sample::Latency(latency) => Some(latency.as_secs_f64() * 1_000.),
            Sample::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Sample::Error)
    }
}

/// Send one request through `transport` and classify the outcome.
///
/// Failures of any kind are folded into [`Sample::Error`]; nothing is retried.
pub async fn execute<T: Transport>(transport: &T) -> Sample {
    let start = Instant::now();
    let res = transport.send().await;
    let elapsed = start.elapsed();

    match res {
        Ok(()) => {
            #[cfg(feature = "metrics")]
            {
                metrics::histogram!(LATENCY_METRIC).record(elapsed.as_nanos() as f64);
                metrics::counter!(SUCCESS_METRIC).increment(1);
            }
            Sample::Latency(elapsed)
        }
        Err(err) => {
            trace!("Request failed after {elapsed:?}: {err}");
            #[cfg(feature = "metrics")]
            metrics::counter!(ERROR_METRIC).increment(1);
            Sample::Error
        }
    }
}
