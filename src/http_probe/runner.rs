use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use super::collector::ResultCollector;
use super::probe::probe_request;
use super::result::ObservedResults;
use super::schedule::Slot;
use crate::config::{ProbeConfig, RequestTemplate};
use crate::error::ProbeError;

/// Everything recorded during one run.
#[derive(Debug, Clone)]
pub struct ProbeRun {
    pub started_at: DateTime<Utc>,
    /// Wall time from the first slot until the last response arrived.
    pub elapsed: Duration,
    pub scheduled: usize,
    pub observations: ObservedResults,
}

/// Drives a fixed-rate stream of identical requests against one endpoint.
pub struct RateProbe {
    client: Client,
    config: ProbeConfig,
}

impl RateProbe {
    pub fn new(client: Client, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Issue every scheduled request, one task per request, without waiting
    /// for earlier responses. Returns once all in-flight requests are recorded.
    pub async fn run(&self) -> Result<ProbeRun, ProbeError> {
        let schedule = self.config.schedule();
        let request: Arc<RequestTemplate> = Arc::new(self.config.request().clone());

        info!(
            probe = self.config.name(),
            url = %request.url(),
            requests_per_second = self.config.requests_per_second(),
            duration_secs = self.config.duration().as_secs_f64(),
            scheduled = schedule.len(),
            "Starting probe run"
        );

        let collector = ResultCollector::spawn();
        let started_at = Utc::now();
        let start = Instant::now();

        for (seq, offset) in schedule.offsets() {
            sleep_until(start + offset).await;
            let slot = Slot::now(seq, offset);

            let client = self.client.clone();
            let request = Arc::clone(&request);
            let tx = collector.sender();
            tokio::spawn(async move {
                let observation = probe_request(&client, &request, slot).await;
                // The collector only stops after every sender is dropped.
                let _ = tx.send(observation);
            });
        }

        debug!(
            probe = self.config.name(),
            issued = schedule.len(),
            "Schedule finished, waiting for in-flight requests"
        );

        let observations = collector.finish().await?;
        let elapsed = start.elapsed();

        Ok(ProbeRun {
            started_at,
            elapsed,
            scheduled: schedule.len(),
            observations,
        })
    }
}
