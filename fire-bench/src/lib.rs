#![cfg_attr(docsrs, feature(doc_cfg))]
//! A parametrized HTTP load generator.
//!
//! For every requested concurrency level, `fire-bench` spawns that many workers which pace,
//! issue, and time requests against the target until a shared deadline, then reduces the
//! collected samples into a [`ConcurrencyResult`]. Levels run strictly one after another and the
//! rows are returned, in input order, as a [`BenchmarkReport`].
//!
//! # Example
//! ```no_run
//! use fire_bench::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BenchError> {
//!     let request = RunRequest::new("http://localhost:3002/delay/ms/1")
//!         .pacing(PacingMode::Burst)
//!         .duration(Duration::from_secs(3));
//!
//!     let report = Benchmark::new(request).levels([1, 5, 10]).await?;
//!     for row in &report {
//!         println!("{row}");
//!     }
//!     Ok(())
//! }
//! ```
pub mod benchmark;
mod collector;
mod error;
pub mod executor;
pub mod pacer;
pub mod run;
pub mod transport;
mod worker;

pub use benchmark::Benchmark;
pub use error::BenchError;
pub use executor::Sample;
pub use fire_bench_core::{
    BenchmarkReport, ConcurrencyResult, ConfigError, HttpMethod, LatencyPercentiles, PacingMode,
    RunRequest, PERCENTILES,
};
pub use pacer::Pacer;
pub use run::{run_concurrency, run_concurrency_with};
pub use transport::{HttpTransport, Transport, TransportError};

pub mod prelude {
    pub use crate::benchmark::Benchmark;
    pub use crate::error::BenchError;
    pub use crate::transport::{HttpTransport, Transport, TransportError};
    pub use fire_bench_core::{
        BenchmarkReport, ConcurrencyResult, HttpMethod, LatencyPercentiles, PacingMode, RunRequest,
    };
}
