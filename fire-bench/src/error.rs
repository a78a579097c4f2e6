use fire_bench_core::ConfigError;
use thiserror::Error;

/// Fatal benchmark failures. Individual request failures never show up here; they are counted
/// as errors in the affected level's result.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("A worker task did not run to completion: {0}")]
    WorkerPanicked(#[from] tokio::task::JoinError),
}
