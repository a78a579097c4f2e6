use crate::{ConfigError, DEFAULT_AVG_JITTER, DEFAULT_DURATION};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// HTTP verbs supported by the load generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET requests never carry a body, whatever the request was configured with.
    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "PUT" => Ok(HttpMethod::Put),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ConfigError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for the delay a worker waits before each attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PacingMode {
    /// No delay; requests are issued back-to-back.
    Burst,
    /// Delay drawn uniformly from `[0, 2 * avg_jitter]`.
    Uniform,
    /// Delay drawn from an exponential distribution with mean `avg_jitter`.
    #[default]
    Exponential,
}

impl FromStr for PacingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "burst" => Ok(PacingMode::Burst),
            "uniform" => Ok(PacingMode::Uniform),
            "exponential" => Ok(PacingMode::Exponential),
            _ => Err(ConfigError::UnknownPacingMode(s.to_string())),
        }
    }
}

impl fmt::Display for PacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacingMode::Burst => "burst",
            PacingMode::Uniform => "uniform",
            PacingMode::Exponential => "exponential",
        };
        f.write_str(name)
    }
}

/// The shape of the traffic for a benchmark: what to send, how often, and for how long at each
/// concurrency level.
///
/// Built with chained setters and treated as immutable once a benchmark starts.
///
/// # Example
/// ```
/// use fire_bench_core::{HttpMethod, PacingMode, RunRequest};
/// use std::time::Duration;
///
/// let request = RunRequest::new("http://localhost:3002/echo")
///     .method(HttpMethod::Post)
///     .header("Content-Type", "application/json")
///     .body(r#"{"key":"value"}"#)
///     .pacing(PacingMode::Uniform)
///     .avg_jitter(Duration::from_millis(5))
///     .duration(Duration::from_secs(3));
///
/// assert!(request.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RunRequest {
    pub url: String,
    pub method: HttpMethod,
    // NOTE: Keys are stored lower-cased so lookups are case-insensitive.
    headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub pacing: PacingMode,
    /// Mean pacing delay in seconds.
    pub avg_jitter_secs: f64,
    pub duration: Duration,
}

impl RunRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::default(),
            headers: BTreeMap::new(),
            body: None,
            pacing: PacingMode::default(),
            avg_jitter_secs: DEFAULT_AVG_JITTER.as_secs_f64(),
            duration: DEFAULT_DURATION,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header sent verbatim with every request. A later value for the same
    /// (case-insensitive) key replaces the earlier one.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self = self.header(key, value);
        }
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn pacing(mut self, pacing: PacingMode) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn avg_jitter(self, avg_jitter: Duration) -> Self {
        self.avg_jitter_secs(avg_jitter.as_secs_f64())
    }

    pub fn avg_jitter_secs(mut self, avg_jitter_secs: f64) -> Self {
        self.avg_jitter_secs = avg_jitter_secs;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn header_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The body that is actually sent: `None` for GET regardless of configuration.
    pub fn effective_body(&self) -> Option<&[u8]> {
        if self.method.carries_body() {
            self.body.as_deref()
        } else {
            None
        }
    }

    /// Check everything that can be checked without touching the network, returning the parsed
    /// target URL.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingHost(self.url.clone()));
        }

        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }

        // Uniform pacing draws up to twice the mean, which must still be a valid Duration.
        let max_delay = Duration::try_from_secs_f64(2. * self.avg_jitter_secs);
        if self.avg_jitter_secs < 0. || max_delay.is_err() {
            return Err(ConfigError::InvalidJitter(self.avg_jitter_secs));
        }

        Ok(url)
    }
}

impl fmt::Display for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (pacing={}, avg_jitter={}ms, duration={})",
            self.method,
            self.url,
            self.pacing,
            self.avg_jitter_secs * 1_000.,
            humantime::format_duration(self.duration),
        )
    }
}

/// Check a sequence of concurrency levels: it must be non-empty and every level positive.
pub fn validate_levels(levels: &[usize]) -> Result<(), ConfigError> {
    if levels.is_empty() {
        return Err(ConfigError::NoConcurrencyLevels);
    }

    match levels.iter().position(|level| *level == 0) {
        Some(index) => Err(ConfigError::ZeroConcurrency { index }),
        None => Ok(()),
    }
}
