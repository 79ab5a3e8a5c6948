pub mod app_config;
pub mod model;
pub mod probe_config;

pub use app_config::{AppConfig, Job, build_client, load_config, plan_jobs};
pub use model::{Config, Expectation, LoadConfig, MenuRequest, OrderRequest, RequestBody, TargetConfig};
pub use probe_config::{Credentials, ProbeConfig, RequestTemplate};
