use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use unicode_truncate::UnicodeTruncateStr;

use crate::config::Expectation;
use crate::http_probe::{Classification, ObservedResults, ProbeRun};

/// Latency over the requests that got an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub mean: Duration,
    pub max: Duration,
}

impl LatencySummary {
    /// `None` when no request got a response.
    pub fn from_observations(observations: &ObservedResults) -> Option<Self> {
        let latencies: Vec<Duration> = observations
            .iter()
            .filter(|o| o.http_status.is_some())
            .map(|o| o.latency)
            .collect();
        let max = latencies.iter().max().copied()?;
        let total: Duration = latencies.iter().sum();
        Some(Self {
            // At most MAX_SCHEDULED_REQUESTS observations, so the count fits in a u32.
            mean: total / latencies.len() as u32,
            max,
        })
    }
}

/// Summary of one load run, suitable for asserting on.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub scheduled: usize,
    pub total: usize,
    pub success: usize,
    pub throttled: usize,
    pub unexpected: usize,
    pub elapsed: Duration,
    pub latency: Option<LatencySummary>,
    pub observations: ObservedResults,
}

impl ProbeReport {
    pub fn from_run(name: &str, run: ProbeRun) -> Self {
        let observations = run.observations;
        Self {
            name: name.to_string(),
            started_at: run.started_at,
            scheduled: run.scheduled,
            total: observations.len(),
            success: observations.count(Classification::Success),
            throttled: observations.count(Classification::Throttled),
            unexpected: observations.count(Classification::Unexpected),
            elapsed: run.elapsed,
            latency: LatencySummary::from_observations(&observations),
            observations,
        }
    }

    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::Success => self.success,
            Classification::Throttled => self.throttled,
            Classification::Unexpected => self.unexpected,
        }
    }

    /// Index of the first throttled request, if any.
    pub fn first_throttled(&self) -> Option<usize> {
        self.observations
            .iter()
            .find(|o| o.classification() == Classification::Throttled)
            .map(|o| o.seq)
    }
}

/// One expectation that the run did not meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expectation: String,
    pub observed: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, observed {}", self.expectation, self.observed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(Vec<Mismatch>),
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

/// Check a report against the expected rate-limit behavior.
/// Every run must have issued exactly the scheduled number of requests.
pub fn verify(report: &ProbeReport, expectation: Expectation) -> Verdict {
    let mut mismatches = Vec::new();
    let mut check = |ok: bool, expected: String, observed: String| {
        if !ok {
            mismatches.push(Mismatch {
                expectation: expected,
                observed,
            });
        }
    };

    check(
        report.total == report.scheduled,
        format!("{} requests issued", report.scheduled),
        format!("{}", report.total),
    );

    match expectation {
        Expectation::Observe => {}
        Expectation::Throttled => {
            check(
                report.throttled >= 1,
                "at least one throttled (429) response".to_string(),
                format!("{} throttled", report.throttled),
            );
            check(
                report.success >= 1,
                "at least one successful (200) response".to_string(),
                format!("{} successful", report.success),
            );
        }
        Expectation::Unthrottled => {
            check(
                report.throttled == 0,
                "no throttled (429) responses".to_string(),
                format!("{} throttled", report.throttled),
            );
            check(
                report.success == report.total,
                format!("all {} responses successful (200)", report.total),
                format!("{} successful", report.success),
            );
        }
        Expectation::Unreachable => {
            check(
                report.success == 0 && report.throttled == 0,
                "no responses from the service".to_string(),
                format!("{} successful, {} throttled", report.success, report.throttled),
            );
            check(
                report.unexpected == report.total,
                format!("all {} requests unexpected", report.total),
                format!("{} unexpected", report.unexpected),
            );
        }
    }

    if mismatches.is_empty() {
        Verdict::Passed
    } else {
        Verdict::Failed(mismatches)
    }
}

pub fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

/// Console line for a finished run.
pub fn render(report: &ProbeReport, expectation: Expectation, verdict: &Verdict, width: usize) -> String {
    let name = to_fixed_width(&report.name, width);
    let mut summary = format!(
        "Total: {}, Success: {}, Throttled: {}, Unexpected: {}, Elapsed: {:.2}s",
        report.total,
        report.success,
        report.throttled,
        report.unexpected,
        report.elapsed.as_secs_f64()
    );
    if let Some(latency) = report.latency {
        summary.push_str(&format!(
            ", Latency: avg {:.2}ms, max {:.2}ms",
            latency.mean.as_secs_f64() * 1000.0,
            latency.max.as_secs_f64() * 1000.0
        ));
    }
    match verdict {
        Verdict::Passed => format!("[{name}] ✅ {summary} (expect: {expectation})"),
        Verdict::Failed(mismatches) => {
            let reasons: Vec<String> = mismatches.iter().map(|m| m.to_string()).collect();
            format!(
                "[{name}] ❌ {summary} (expect: {expectation}): {}",
                reasons.join("; ")
            )
        }
    }
}
