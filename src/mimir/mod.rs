use client::prompb;

use crate::http_probe::Classification;
use crate::report::{ProbeReport, Verdict};

pub mod client;

pub use client::send_to_mimir;

const JOB_LABEL: &str = "job";
const PROBE_LABEL: &str = "probe";
const CLASSIFICATION_LABEL: &str = "classification";
const STAT_LABEL: &str = "stat";
const REQUESTS_TOTAL_METRIC: &str = "rate_probe_requests_total";
const REQUESTS_SCHEDULED_METRIC: &str = "rate_probe_requests_scheduled";
const DURATION_METRIC: &str = "rate_probe_duration_seconds";
const LATENCY_METRIC: &str = "rate_probe_latency_seconds";
const VERIFICATION_SUCCESS_METRIC: &str = "rate_probe_verification_success";

const PROBE_JOB: &str = "rateprobe";

fn create_time_series(
    metric_name: &str,
    probe: &str,
    value: f64,
    timestamp_ms: i64,
    additional_labels: &[(&str, &str)],
) -> prompb::TimeSeries {
    let mut labels: Vec<(&str, &str)> = vec![(JOB_LABEL, PROBE_JOB), (PROBE_LABEL, probe)];
    labels.extend_from_slice(additional_labels);

    client::create_time_series(metric_name, &labels, value, Some(timestamp_ms))
}

/// Creates the TimeSeries metrics describing one finished run:
///    - `rate_probe_requests_total{classification}`: requests per classification.
///    - `rate_probe_requests_scheduled`: requests the schedule asked for.
///    - `rate_probe_duration_seconds`: wall time of the run.
///    - `rate_probe_latency_seconds{stat="mean"|"max"}`: response latency, only
///      when at least one request got a response.
///    - `rate_probe_verification_success`: 1.0 when the run met its expectation.
/// All samples are stamped with the start of the run.
pub fn create_run_metrics(report: &ProbeReport, verdict: &Verdict) -> Vec<prompb::TimeSeries> {
    let now = report.started_at.timestamp_millis();
    let mut metrics = Vec::new();

    for classification in [
        Classification::Success,
        Classification::Throttled,
        Classification::Unexpected,
    ] {
        metrics.push(create_time_series(
            REQUESTS_TOTAL_METRIC,
            &report.name,
            report.count(classification) as f64,
            now,
            &[(CLASSIFICATION_LABEL, classification.as_str())],
        ));
    }

    metrics.push(create_time_series(
        REQUESTS_SCHEDULED_METRIC,
        &report.name,
        report.scheduled as f64,
        now,
        &[],
    ));

    metrics.push(create_time_series(
        DURATION_METRIC,
        &report.name,
        report.elapsed.as_secs_f64(),
        now,
        &[],
    ));

    if let Some(latency) = report.latency {
        for (stat, value) in [("mean", latency.mean), ("max", latency.max)] {
            metrics.push(create_time_series(
                LATENCY_METRIC,
                &report.name,
                value.as_secs_f64(),
                now,
                &[(STAT_LABEL, stat)],
            ));
        }
    }

    let verification_success = match verdict.is_passed() {
        true => 1.0,
        false => 0.0,
    };
    metrics.push(create_time_series(
        VERIFICATION_SUCCESS_METRIC,
        &report.name,
        verification_success,
        now,
        &[],
    ));

    metrics
}
