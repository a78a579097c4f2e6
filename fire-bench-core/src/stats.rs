use crate::PERCENTILES;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
#[cfg(feature = "serde")]
use serde_with::{serde_as, DurationSeconds, DurationSecondsWithFrac};
use std::fmt;
use std::ops::Index;
use std::time::Duration;

/// Latency percentiles, in milliseconds, over the successful requests of one level.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatencyPercentiles {
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyPercentiles {
    /// Compute the reported percentiles. Sorts `latencies_ms` in place; returns `None` when
    /// there are no samples.
    pub fn from_latencies(latencies_ms: &mut [f64]) -> Option<Self> {
        if latencies_ms.is_empty() {
            return None;
        }
        latencies_ms.sort_unstable_by(f64::total_cmp);

        let sorted: &[f64] = latencies_ms;
        let [p50, p75, p95, p99] = PERCENTILES.map(|p| percentile(sorted, p as f64));
        Some(Self { p50, p75, p95, p99 })
    }

    pub fn get(&self, percentile: u8) -> Option<f64> {
        match percentile {
            50 => Some(self.p50),
            75 => Some(self.p75),
            95 => Some(self.p95),
            99 => Some(self.p99),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        PERCENTILES.into_iter().filter_map(|p| Some((p, self.get(p)?)))
    }
}

/// The `p`-th percentile (`0..=100`) of an ascending slice, using linear interpolation between
/// the two closest ranks.
///
/// The rank is `p / 100 * (n - 1)`; a fractional rank blends the neighbouring values. This is
/// the same convention as NumPy's default `percentile`.
///
/// # Panics
/// Panics if `sorted` is empty.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "percentile of an empty set");

    let rank = (p / 100.).clamp(0., 1.) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// `errors / (successes + errors)`, or `0.` when nothing was attempted.
pub fn error_rate(successes: u64, errors: u64) -> f64 {
    let total = successes + errors;
    if total == 0 {
        0.
    } else {
        errors as f64 / total as f64
    }
}

/// Summary row for one concurrency level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", cfg_eval::cfg_eval, serde_as)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConcurrencyResult {
    pub concurrency: usize,
    /// Configured duration of the run.
    #[cfg_attr(feature = "serde", serde_as(as = "DurationSeconds<u64>"))]
    pub duration: Duration,
    /// Measured wall-clock time, from the start of the run until the last worker stopped.
    #[cfg_attr(feature = "serde", serde_as(as = "DurationSecondsWithFrac<f64>"))]
    pub elapsed: Duration,
    pub successful_requests: u64,
    pub total_errors: u64,
    pub error_rate: f64,
    /// Absent when there were no successful requests.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub latency: Option<LatencyPercentiles>,
}

impl ConcurrencyResult {
    /// Reduce the raw samples of one run into its summary row.
    pub fn from_samples(
        concurrency: usize,
        duration: Duration,
        elapsed: Duration,
        mut latencies_ms: Vec<f64>,
        total_errors: u64,
    ) -> Self {
        let successful_requests = latencies_ms.len() as u64;
        Self {
            concurrency,
            duration,
            elapsed,
            successful_requests,
            total_errors,
            error_rate: error_rate(successful_requests, total_errors),
            latency: LatencyPercentiles::from_latencies(&mut latencies_ms),
        }
    }

    /// Number of completed attempts, successful or not.
    pub fn total(&self) -> u64 {
        self.successful_requests + self.total_errors
    }

    /// Completed attempts per second of measured wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            self.total() as f64 / secs
        } else {
            0.
        }
    }
}

impl fmt::Display for ConcurrencyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Concurrency={}, Duration={}, Successful={}, Errors={}, ErrorRate={:.2}",
            self.concurrency,
            humantime::format_duration(self.duration),
            self.successful_requests,
            self.total_errors,
            self.error_rate,
        )?;

        if let Some(latency) = &self.latency {
            for (p, value) in latency.iter() {
                write!(f, ", p{p}={value:.2}ms")?;
            }
        }

        Ok(())
    }
}

/// Ordered results of a benchmark, one row per requested concurrency level, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BenchmarkReport {
    results: Vec<ConcurrencyResult>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: ConcurrencyResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ConcurrencyResult> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConcurrencyResult> {
        self.results.iter()
    }

    /// Concurrency levels in report order.
    pub fn levels(&self) -> Vec<usize> {
        self.results.iter().map(|r| r.concurrency).collect()
    }

    pub fn into_inner(self) -> Vec<ConcurrencyResult> {
        self.results
    }
}

impl Index<usize> for BenchmarkReport {
    type Output = ConcurrencyResult;

    fn index(&self, index: usize) -> &Self::Output {
        &self.results[index]
    }
}

impl IntoIterator for BenchmarkReport {
    type Item = ConcurrencyResult;
    type IntoIter = std::vec::IntoIter<ConcurrencyResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a BenchmarkReport {
    type Item = &'a ConcurrencyResult;
    type IntoIter = std::slice::Iter<'a, ConcurrencyResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl From<Vec<ConcurrencyResult>> for BenchmarkReport {
    fn from(results: Vec<ConcurrencyResult>) -> Self {
        Self { results }
    }
}
