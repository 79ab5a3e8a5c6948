use std::time::Duration;

use chrono::{DateTime, Utc};

/// How a single response is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// HTTP 200.
    Success,
    /// HTTP 429.
    Throttled,
    /// Any other status, or no response at all.
    Unexpected,
}

impl Classification {
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(200) => Classification::Success,
            Some(429) => Classification::Throttled,
            _ => Classification::Unexpected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::Throttled => "throttled",
            Classification::Unexpected => "unexpected",
        }
    }
}

/// The outcome of one issued request.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Position in the issuance schedule, starting at 0.
    pub seq: usize,
    /// Wall-clock time the request was issued.
    pub issued_at: DateTime<Utc>,
    /// Time between run start and issuance.
    pub offset: Duration,
    pub http_status: Option<u16>,
    /// Time until the response headers arrived or the transport failed.
    pub latency: Duration,
    /// Transport failure, with its source chain.
    pub error: Option<String>,
}

impl Observation {
    pub fn classification(&self) -> Classification {
        Classification::from_status(self.http_status)
    }
}

/// Observations of a finished run, in issuance order. Read-only.
#[derive(Debug, Clone, Default)]
pub struct ObservedResults(Vec<Observation>);

impl ObservedResults {
    /// Order observations by their schedule position, regardless of the
    /// order in which the responses completed.
    pub(crate) fn from_unordered(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.seq);
        Self(observations)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.0
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.0
            .iter()
            .filter(|o| o.classification() == classification)
            .count()
    }
}

impl<'a> IntoIterator for &'a ObservedResults {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
