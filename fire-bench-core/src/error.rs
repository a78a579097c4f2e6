use thiserror::Error;

/// Setup-time failures. These are raised before any worker is spawned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme `{0}`; expected http or https")]
    UnsupportedScheme(String),

    #[error("URL `{0}` has no host")]
    MissingHost(String),

    #[error("Unknown HTTP method `{0}`; expected one of GET, PUT, POST, DELETE")]
    UnknownMethod(String),

    #[error("Unknown pacing mode `{0}`; expected one of burst, uniform, exponential")]
    UnknownPacingMode(String),

    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Duration must be greater than zero")]
    ZeroDuration,

    #[error("Average jitter must be a finite, non-negative number of seconds (got {0})")]
    InvalidJitter(f64),

    #[error("At least one concurrency level is required")]
    NoConcurrencyLevels,

    #[error("Concurrency level at position {index} must be greater than zero")]
    ZeroConcurrency { index: usize },
}
