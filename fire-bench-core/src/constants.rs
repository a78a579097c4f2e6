use std::time::Duration;

/// Percentiles reported for every level with at least one successful request.
pub const PERCENTILES: [u8; 4] = [50, 75, 95, 99];

/// Default length of a single concurrency level run.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(10);

/// Default mean delay between attempts for the `uniform` and `exponential` pacing modes.
pub const DEFAULT_AVG_JITTER: Duration = Duration::from_millis(10);
