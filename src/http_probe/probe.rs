use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};

use super::report;
use super::result::Observation;
use super::schedule::Slot;
use crate::config::RequestTemplate;
use crate::error::ProbeError;

/// Send one request built from the template and record what came back.
/// Transport failures are recorded on the observation, never returned.
pub async fn probe_request(
    client: &Client,
    request: &RequestTemplate,
    slot: Slot,
) -> Observation {
    let start = Instant::now();
    let result = client
        .post(request.url().clone())
        .headers(request.headers().clone())
        .body(request.body().to_string())
        .send()
        .await;
    let latency = start.elapsed();

    let (http_status, error) = match result {
        Ok(resp) => (Some(resp.status().as_u16()), None),
        Err(e) => {
            let error = report(&e);
            debug!(seq = slot.seq, url = %request.url(), error = %error, "Request failed");
            (None, Some(error))
        }
    };

    Observation {
        seq: slot.seq,
        issued_at: slot.issued_at,
        offset: slot.offset,
        http_status,
        latency,
        error,
    }
}

/// Response of a single request sent outside of a load run.
#[derive(Debug, Clone)]
pub struct OneShotResponse {
    pub status: StatusCode,
    pub elapsed: Duration,
    /// Body decoded as JSON. A response without a JSON content type is still
    /// parsed when possible and otherwise kept as a JSON string.
    pub body: serde_json::Value,
}

/// Send a single request and log the decoded response. A body that declares
/// a JSON content type but does not decode is returned as a transport error.
pub async fn send_once(
    client: &Client,
    name: &str,
    request: &RequestTemplate,
) -> Result<OneShotResponse, ProbeError> {
    let start = Instant::now();
    let resp = client
        .post(request.url().clone())
        .headers(request.headers().clone())
        .body(request.body().to_string())
        .send()
        .await
        .map_err(ProbeError::Transport)?;
    let status = resp.status();
    let body = if declares_json(&resp) {
        resp.json::<serde_json::Value>()
            .await
            .map_err(ProbeError::Transport)?
    } else {
        let text = resp.text().await.map_err(ProbeError::Transport)?;
        serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
    };
    let elapsed = start.elapsed();

    if status.is_success() {
        info!(probe = name, status = status.as_u16(), response = %body, "Request completed");
    } else {
        warn!(probe = name, status = status.as_u16(), response = %body, "Request rejected");
    }

    Ok(OneShotResponse {
        status,
        elapsed,
        body,
    })
}

/// `application/json`, or any `+json` media type such as `application/problem+json`.
fn declares_json(resp: &Response) -> bool {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().ends_with("json"))
}
