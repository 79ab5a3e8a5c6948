//! Client-side probe that checks whether an HTTP endpoint enforces its
//! request-rate limit.
//!
//! A [`RateProbe`] POSTs an identical request at a fixed rate for a fixed
//! duration, classifies every response as success (200), throttled (429) or
//! unexpected, and returns the observations in issuance order. A
//! [`ProbeReport`] summarises the run and [`verify`] checks it against an
//! [`Expectation`].

pub mod config;
pub mod error;
pub mod http_probe;
pub mod mimir;
pub mod report;

pub use config::{Credentials, Expectation, ProbeConfig, RequestBody, RequestTemplate};
pub use error::{ConfigError, ProbeError, PushError};
pub use http_probe::{Classification, Observation, ObservedResults, ProbeRun, RateProbe};
pub use report::{LatencySummary, Mismatch, ProbeReport, Verdict, verify};
