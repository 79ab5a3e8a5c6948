use color_eyre::{Result, eyre::eyre};
use reqwest::Client;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rateprobe::config::{
    AppConfig, Job, ProbeConfig, RequestTemplate, build_client, load_config, plan_jobs,
};
use rateprobe::http_probe::{RateProbe, send_once};
use rateprobe::mimir::{create_run_metrics, send_to_mimir};
use rateprobe::report::{ProbeReport, render, to_fixed_width, verify};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = load_config()?;
    let jobs = plan_jobs(&app)?;
    let client = build_client(app.request_timeout)?;

    if let Some(endpoint) = &app.mimir_endpoint {
        info!(endpoint = %endpoint, "Using Mimir endpoint");
    }

    let mut failed = Vec::new();

    // Probes run one after another so they do not skew each other's rate.
    for job in jobs {
        match job {
            Job::Load(config) => {
                let name = config.name().to_string();
                if !run_load_probe(&app, &client, config).await? {
                    failed.push(name);
                }
            }
            Job::Once { name, request } => run_one_shot(&app, &client, &name, &request).await,
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(eyre!("verification failed for: {}", failed.join(", ")))
    }
}

async fn run_load_probe(app: &AppConfig, client: &Client, config: ProbeConfig) -> Result<bool> {
    let expectation = config.expectation();
    let probe = RateProbe::new(client.clone(), config);
    let run = probe.run().await?;

    let report = ProbeReport::from_run(probe.config().name(), run);
    let verdict = verify(&report, expectation);
    println!("{}", render(&report, expectation, &verdict, app.max_name_width));

    if let Some(seq) = report.first_throttled() {
        info!(probe = %report.name, seq, "First throttled request");
    }

    if let Some(endpoint) = &app.mimir_endpoint {
        let metrics = create_run_metrics(&report, &verdict);
        if let Err(e) = send_to_mimir(client, endpoint, app.mimir_tenant.as_deref(), metrics).await
        {
            warn!(probe = %report.name, error = %e, "Failed to send metrics");
        }
    }

    Ok(verdict.is_passed())
}

/// A failed one-shot request is logged and printed; it does not fail the run.
async fn run_one_shot(app: &AppConfig, client: &Client, name: &str, request: &RequestTemplate) {
    let label = to_fixed_width(name, app.max_name_width);

    match send_once(client, name, request).await {
        Ok(resp) => {
            let mark = if resp.status.is_success() { "✅" } else { "❌" };
            println!(
                "[{label}] {mark} URL: {}, Status: {}, Elapsed: {:.2}ms, Response: {}",
                request.url(),
                resp.status.as_u16(),
                resp.elapsed.as_secs_f64() * 1000.0,
                resp.body
            );
        }
        Err(e) => {
            error!(probe = name, error = %e, "Request failed");
            println!("[{label}] ❌ Request error for {}: {e}", request.url());
        }
    }
}
