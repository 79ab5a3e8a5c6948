use std::env;
use std::time::Duration;

use reqwest::Client;

use super::model::{Config, Expectation};
use super::probe_config::{Credentials, ProbeConfig, RequestTemplate};
use crate::error::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "config.yml";
const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 10.0;
const USER_AGENT: &str = concat!("rateprobe/", env!("CARGO_PKG_VERSION"));

pub struct AppConfig {
    pub config: Config,
    pub credentials: Credentials,
    pub request_timeout: Duration,
    pub mimir_endpoint: Option<String>,
    pub mimir_tenant: Option<String>,
    pub max_name_width: usize,
}

/// Load the application configuration from a YAML file and environment variables.
/// The file is taken from `CONFIG_FILE` (default `config.yml`). A `.env` file is
/// loaded first when present, so it can provide any of the variables below.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config_file_location =
        env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config_str =
        std::fs::read_to_string(&config_file_location).map_err(|source| ConfigError::Read {
            path: config_file_location.clone(),
            source,
        })?;

    tracing::info!(config_file = %config_file_location, "Using config file");

    from_yaml(&config_str, |name| env::var(name).ok())
}

/// Build the application configuration from YAML text and an environment lookup.
/// Empty environment values count as unset.
pub fn from_yaml(
    yaml: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    let credentials = Credentials {
        auth_token: var("AUTH_TOKEN").unwrap_or_default(),
        api_key: var("API_KEY").unwrap_or_default(),
    };

    let request_timeout = match var("REQUEST_TIMEOUT_SECONDS") {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .filter(|d| !d.is_zero())
            .ok_or(ConfigError::InvalidEnv {
                name: "REQUEST_TIMEOUT_SECONDS",
                value: raw,
            })?,
        None => Duration::from_secs_f64(DEFAULT_REQUEST_TIMEOUT_SECS),
    };

    let max_name_width = config.keys().map(|name| name.len()).max().unwrap_or(10);

    Ok(AppConfig {
        config,
        credentials,
        request_timeout,
        mimir_endpoint: var("MIMIR_ENDPOINT"),
        mimir_tenant: var("MIMIR_TENANT"),
        max_name_width,
    })
}

impl AppConfig {
    /// Credentials for one target: values set on the target win over the environment.
    pub fn credentials_for(&self, name: &str) -> Credentials {
        let Some(target) = self.config.get(name) else {
            return self.credentials.clone();
        };
        Credentials {
            auth_token: target
                .auth_token
                .clone()
                .unwrap_or_else(|| self.credentials.auth_token.clone()),
            api_key: target
                .api_key
                .clone()
                .unwrap_or_else(|| self.credentials.api_key.clone()),
        }
    }
}

/// One validated unit of work for the binary.
#[derive(Debug, Clone)]
pub enum Job {
    /// A target with a `load` section: a fixed-rate run.
    Load(ProbeConfig),
    /// A target without one: a single request.
    Once { name: String, request: RequestTemplate },
}

/// Validate every target up front so a bad entry fails before any request is sent.
pub fn plan_jobs(app: &AppConfig) -> Result<Vec<Job>, ConfigError> {
    app.config
        .iter()
        .map(|(name, target)| -> Result<Job, ConfigError> {
            let credentials = app.credentials_for(name);
            match &target.load {
                Some(load) => Ok(Job::Load(ProbeConfig::from_target(
                    name,
                    target,
                    load,
                    &credentials,
                )?)),
                // A single request has nothing to verify a rate expectation against.
                None if target.expect != Expectation::Observe => {
                    Err(ConfigError::ExpectationWithoutLoad {
                        name: name.clone(),
                        expectation: target.expect,
                    })
                }
                None => Ok(Job::Once {
                    name: name.clone(),
                    request: RequestTemplate::new(&target.url, &credentials, &target.body)?,
                }),
            }
        })
        .collect()
}

/// Setup the HTTP client shared by every request of every probe.
pub fn build_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(request_timeout)
        .user_agent(USER_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const YAML: &str = r#"
        orders:
            url: http://localhost:5700/api/v1/orders
            load:
                requests_per_second: 10
                duration_seconds: 6
            body:
                kind: order
                menu_id: a
                payment_method: COD
        menus:
            url: http://localhost:5700/api/v1/menus
            auth_token: own-token
            body:
                kind: menu
                menu_name: Katsu BBQ
                shop_id: s
                menu_price: 13000
                menu_status: Ada
    "#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let app = from_yaml(YAML, env(&[])).expect("valid config");
        assert_eq!(app.credentials, Credentials::default());
        assert_eq!(app.request_timeout, Duration::from_secs(10));
        assert!(app.mimir_endpoint.is_none());
        assert_eq!(app.max_name_width, "orders".len());
    }

    #[test]
    fn test_environment_overrides() {
        let app = from_yaml(
            YAML,
            env(&[
                ("AUTH_TOKEN", "env-token"),
                ("API_KEY", "env-key"),
                ("REQUEST_TIMEOUT_SECONDS", "2.5"),
                ("MIMIR_ENDPOINT", "http://localhost:9009"),
                ("MIMIR_TENANT", ""),
            ]),
        )
        .expect("valid config");

        assert_eq!(app.request_timeout, Duration::from_millis(2500));
        assert_eq!(app.mimir_endpoint.as_deref(), Some("http://localhost:9009"));
        assert!(app.mimir_tenant.is_none());

        let orders = app.credentials_for("orders");
        assert_eq!(orders.auth_token, "env-token");
        assert_eq!(orders.api_key, "env-key");

        let menus = app.credentials_for("menus");
        assert_eq!(menus.auth_token, "own-token");
        assert_eq!(menus.api_key, "env-key");
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        for raw in ["abc", "0", "-1"] {
            let result = from_yaml(YAML, env(&[("REQUEST_TIMEOUT_SECONDS", raw)]));
            assert!(matches!(
                result,
                Err(ConfigError::InvalidEnv { name: "REQUEST_TIMEOUT_SECONDS", .. })
            ));
        }
    }

    #[test]
    fn test_plan_jobs() {
        let app = from_yaml(YAML, env(&[])).expect("valid config");
        let jobs = plan_jobs(&app).expect("valid targets");

        // BTreeMap order: "menus" before "orders".
        assert_eq!(jobs.len(), 2);
        let Job::Once { name, request } = &jobs[0] else {
            panic!("expected a one-shot job, got {:?}", jobs[0]);
        };
        assert_eq!(name, "menus");
        assert_eq!(request.headers()["authorization"], "Bearer own-token");

        let Job::Load(config) = &jobs[1] else {
            panic!("expected a load job, got {:?}", jobs[1]);
        };
        assert_eq!(config.name(), "orders");
        assert_eq!(config.schedule().len(), 60);
    }

    #[test]
    fn test_expectation_without_load_is_rejected() {
        let yaml = r#"
            menus:
                url: http://localhost:5700/api/v1/menus
                expect: throttled
                body:
                    kind: menu
                    menu_name: Katsu BBQ
                    shop_id: s
                    menu_price: 13000
                    menu_status: Ada
        "#;
        let app = from_yaml(yaml, env(&[])).expect("valid yaml");

        let err = plan_jobs(&app).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ExpectationWithoutLoad { ref name, expectation: Expectation::Throttled }
                if name == "menus"
        ));

        let observe = yaml.replace("expect: throttled", "expect: observe");
        let app = from_yaml(&observe, env(&[])).expect("valid yaml");
        assert!(plan_jobs(&app).is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(matches!(
            from_yaml("orders: [", env(&[])),
            Err(ConfigError::Yaml(_))
        ));
    }
}
