use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use fire_bench::{HttpMethod, PacingMode, RunRequest};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP benchmarking tool.
///
/// Drives concurrent traffic against URL at each concurrency level in turn and reports
/// successful requests, errors and latency percentiles per level.
#[derive(Parser, Debug)]
#[command(name = "fire-bench", version)]
#[command(group(ArgGroup::new("payload").required(true).args(["data", "data_binary"])))]
pub struct Cli {
    /// URL to send requests to.
    pub url: String,

    /// Load test duration in seconds, per concurrency level.
    #[arg(long, default_value_t = 10)]
    pub duration: u64,

    /// Concurrency levels to test, in order.
    #[arg(long = "concurrency-levels", num_args = 1.., required = true)]
    pub concurrency_levels: Vec<usize>,

    /// Type of HTTP request: GET, PUT, POST or DELETE.
    #[arg(long = "request-type", default_value = "GET")]
    pub request_type: HttpMethod,

    /// Delay between requests of each worker: burst, uniform or exponential.
    #[arg(long, default_value = "exponential")]
    pub mode: PacingMode,

    /// Average jitter in milliseconds, used by the uniform and exponential modes.
    #[arg(long = "avg-jitter", default_value_t = 10)]
    pub avg_jitter: u64,

    /// Request body as a string. Ignored for GET.
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Read the request body from a file. Ignored for GET.
    #[arg(long = "data-binary")]
    pub data_binary: Option<PathBuf>,

    /// Add a header to every request, as `Key: Value`. Can be repeated.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Output format for the results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// More logging. Repeat for trace output.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors, and hide the progress bar.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Build the run request, reading `--data-binary` from disk when the method sends a body.
    pub fn run_request(&self) -> Result<RunRequest> {
        let mut request = RunRequest::new(&self.url)
            .method(self.request_type)
            .headers(self.headers.iter().cloned())
            .pacing(self.mode)
            .avg_jitter(Duration::from_millis(self.avg_jitter))
            .duration(Duration::from_secs(self.duration));

        if self.request_type.carries_body() {
            if let Some(data) = &self.data {
                request = request.body(data.as_bytes());
            } else if let Some(path) = &self.data_binary {
                if !path.is_file() {
                    bail!("The file '{}' does not exist.", path.display());
                }
                let body = std::fs::read(path)
                    .with_context(|| format!("Failed to read '{}'", path.display()))?;
                request = request.body(body);
            }
        }

        Ok(request)
    }

    /// Log what is about to run. Goes through the subscriber installed by `main`.
    pub fn announce(&self, request: &RunRequest) {
        debug!("{self:?}");
        info!(
            "fire-bench {}: {} concurrency levels {:?} against {}",
            env!("CARGO_PKG_VERSION"),
            self.concurrency_levels.len(),
            self.concurrency_levels,
            request
        );
    }

    pub fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "fire_bench=warn",
            (false, 0) => "fire_bench=info",
            (false, 1) => "fire_bench=debug",
            (false, _) => "fire_bench=trace",
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected `Key: Value`, got `{raw}`")),
    }
}
