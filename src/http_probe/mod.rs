pub mod collector;
pub mod probe;
pub mod result;
pub mod runner;
pub mod schedule;

use std::fmt::Write;

pub use probe::{OneShotResponse, probe_request, send_once};
pub use result::{Classification, ObservedResults, Observation};
pub use runner::{ProbeRun, RateProbe};
pub use schedule::{MAX_SCHEDULED_REQUESTS, Schedule, Slot};

/// Render an error with its full source chain.
pub(crate) fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_includes_sources() {
        let err = crate::error::ConfigError::InvalidUrl {
            url: "nope".to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        let rendered = report(&err);
        assert!(rendered.starts_with("Invalid URL \"nope\""));
        assert!(rendered.contains("Caused by: relative URL without a base"));
    }
}
