#![allow(dead_code)]

use std::sync::Mutex;
use std::time::{Duration, Instant};

use rateprobe::config::{Credentials, Expectation, OrderRequest, ProbeConfig, RequestBody, RequestTemplate};
use wiremock::{Request, Respond, ResponseTemplate};

pub const ORDERS_PATH: &str = "/api/v1/orders";
pub const MENU_ID: &str = "MDE5M2JhZWEtNDYzNi0xOTQ5LTNmYTUtNmIxNmQ1NTBlM2I0";
pub const AUTH_TOKEN: &str = "test-token";
pub const API_KEY: &str = "test-key";

/// Answers 200 for the first `limit` requests of each one-second window and
/// 429 for the rest, like a fixed-window rate limiter.
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    state: Mutex<(Option<Instant>, u32)>,
}

impl FixedWindowLimiter {
    pub fn per_second(limit: u32) -> Self {
        Self {
            limit,
            window: Duration::from_secs(1),
            state: Mutex::new((None, 0)),
        }
    }
}

impl Respond for FixedWindowLimiter {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().expect("limiter state");
        let now = Instant::now();
        let (window_start, count) = &mut *state;

        let expired = window_start.is_none_or(|start| now.duration_since(start) >= self.window);
        if expired {
            *window_start = Some(now);
            *count = 0;
        }

        *count += 1;
        if *count <= self.limit {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"}))
        } else {
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"error": "Rate limit exceeded"}))
        }
    }
}

pub fn order_body() -> RequestBody {
    RequestBody::Order(OrderRequest {
        menu_id: MENU_ID.to_string(),
        payment_method: "COD".to_string(),
    })
}

pub fn credentials() -> Credentials {
    Credentials {
        auth_token: AUTH_TOKEN.to_string(),
        api_key: API_KEY.to_string(),
    }
}

pub fn order_template(base_url: &str) -> RequestTemplate {
    RequestTemplate::new(&format!("{base_url}{ORDERS_PATH}"), &credentials(), &order_body())
        .expect("valid request template")
}

pub fn probe_config(
    base_url: &str,
    requests_per_second: f64,
    duration_seconds: f64,
    expectation: Expectation,
) -> ProbeConfig {
    ProbeConfig::new(
        "orders",
        order_template(base_url),
        requests_per_second,
        duration_seconds,
        expectation,
    )
    .expect("valid probe config")
}

/// A local address nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn client() -> reqwest::Client {
    rateprobe::config::build_client(Duration::from_secs(5)).expect("client")
}
