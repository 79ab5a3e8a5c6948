use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::model::{Expectation, LoadConfig, RequestBody, TargetConfig};
use crate::error::ConfigError;
use crate::http_probe::Schedule;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Credentials attached to every request of a probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub auth_token: String,
    pub api_key: String,
}

/// A fully validated request: the URL, the header set and the serialized body.
/// Every request of a run is built from the same template.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    url: Url,
    headers: HeaderMap,
    body: String,
}

impl RequestTemplate {
    pub fn new(
        url: &str,
        credentials: &Credentials,
        body: &RequestBody,
    ) -> Result<Self, ConfigError> {
        let url = parse_http_url(url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value("Authorization", format!("Bearer {}", credentials.auth_token))?,
        );
        headers.insert(
            API_KEY_HEADER,
            header_value("x-api-key", format!("Key {}", credentials.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            url,
            headers,
            body: body.to_json()?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// The immutable configuration of one rate-limit run.
/// Only constructible through [`ProbeConfig::new`], so a value of this type
/// always has a valid URL, a positive duration, and a rate that can be
/// scheduled over that duration.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    name: String,
    request: RequestTemplate,
    requests_per_second: f64,
    duration: Duration,
    schedule: Schedule,
    expectation: Expectation,
}

impl ProbeConfig {
    pub fn new(
        name: impl Into<String>,
        request: RequestTemplate,
        requests_per_second: f64,
        duration_seconds: f64,
        expectation: Expectation,
    ) -> Result<Self, ConfigError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRate(requests_per_second));
        }
        let duration = Duration::try_from_secs_f64(duration_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or(ConfigError::InvalidDuration(duration_seconds))?;
        let schedule = Schedule::new(requests_per_second, duration)
            .ok_or(ConfigError::UnschedulableRate {
                requests_per_second,
                duration_seconds,
            })?;

        Ok(Self {
            name: name.into(),
            request,
            requests_per_second,
            duration,
            schedule,
            expectation,
        })
    }

    /// Build a probe configuration from a YAML target and its load section.
    pub fn from_target(
        name: &str,
        target: &TargetConfig,
        load: &LoadConfig,
        credentials: &Credentials,
    ) -> Result<Self, ConfigError> {
        let request = RequestTemplate::new(&target.url, credentials, &target.body)?;
        Self::new(
            name,
            request,
            load.requests_per_second,
            load.duration_seconds,
            target.expect,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request(&self) -> &RequestTemplate {
        &self.request
    }

    pub fn requests_per_second(&self) -> f64 {
        self.requests_per_second
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    pub fn expectation(&self) -> Expectation {
        self.expectation
    }
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn header_value(header: &'static str, value: String) -> Result<HeaderValue, ConfigError> {
    HeaderValue::try_from(value).map_err(|source| ConfigError::InvalidHeader { header, source })
}
