//! Error types for the rate probe.

use thiserror::Error;

use crate::config::Expectation;

/// Problems with a probe configuration. These are raised before any request
/// is sent and halt the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("Requests per second must be a positive finite number, got {0}")]
    InvalidRate(f64),

    #[error("Duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),

    /// The interval `1 / rate` is not a non-zero `Duration`, or the run would
    /// exceed `MAX_SCHEDULED_REQUESTS` slots.
    #[error(
        "Cannot schedule {requests_per_second} requests per second for {duration_seconds}s"
    )]
    UnschedulableRate {
        requests_per_second: f64,
        duration_seconds: f64,
    },

    #[error("Target {name} expects {expectation} but has no load section")]
    ExpectationWithoutLoad { name: String, expectation: Expectation },

    #[error("Invalid value for header {header}")]
    InvalidHeader {
        header: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("Failed to serialize request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Errors that abort a probe run or a one-shot request.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Result collector stopped unexpectedly: {0}")]
    Collector(#[from] tokio::task::JoinError),
}

/// Errors while pushing run metrics to a remote-write endpoint.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Failed to encode write request: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("Failed to compress write request: {0}")]
    Compress(#[from] snap::Error),

    #[error("Invalid tenant header: {0}")]
    Tenant(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to send metrics: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to push to Mimir: {status} - {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}
