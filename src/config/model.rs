use serde::{Deserialize, Serialize};

/// A probe target as written in the YAML config file.
/// The map key of the config file is used as the probe name.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// The endpoint every request is POSTed to.
    pub url: String,

    /// Load schedule. A target without one sends a single request.
    #[serde(default)]
    pub load: Option<LoadConfig>,

    /// What the run is expected to observe. Defaults to `observe`.
    #[serde(default)]
    pub expect: Expectation,

    /// Bearer token. Falls back to `AUTH_TOKEN`.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// API key. Falls back to `API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    pub body: RequestBody,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LoadConfig {
    pub requests_per_second: f64,
    pub duration_seconds: f64,
}

/// The expected outcome of a load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Report only, nothing is asserted.
    #[default]
    Observe,
    /// At least one request was throttled and at least one succeeded.
    Throttled,
    /// Every request succeeded.
    Unthrottled,
    /// No request got any response.
    Unreachable,
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Expectation::Observe => "observe",
            Expectation::Throttled => "throttled",
            Expectation::Unthrottled => "unthrottled",
            Expectation::Unreachable => "unreachable",
        };
        f.write_str(name)
    }
}

/// The JSON body sent with every request of a probe.
/// In YAML the variant is picked with `kind`; the serialized body carries no tag.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestBody {
    Order(OrderRequest),
    Menu(MenuRequest),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderRequest {
    pub menu_id: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MenuRequest {
    pub menu_name: String,
    pub shop_id: String,
    pub menu_price: i64,
    pub menu_status: String,
}

impl RequestBody {
    /// Serialize the body as it goes on the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            RequestBody::Order(order) => serde_json::to_string(order),
            RequestBody::Menu(menu) => serde_json::to_string(menu),
        }
    }
}

pub type Config = std::collections::BTreeMap<String, TargetConfig>;
