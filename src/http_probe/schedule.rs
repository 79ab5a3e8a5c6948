use std::time::Duration;

use chrono::{DateTime, Utc};

// Absorbs float noise such as 0.1 * 30.0 = 3.0000000000000004.
const ROUNDING_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of slots in one run.
pub const MAX_SCHEDULED_REQUESTS: u32 = u32::MAX;

/// Issuance slots of a run: `ceil(rate * duration)` requests, evenly spaced
/// `1 / rate` apart, starting at offset zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    requests: usize,
    interval: Duration,
}

impl Schedule {
    /// `None` when `1 / requests_per_second` is not a non-zero `Duration` or
    /// the run would need more than [`MAX_SCHEDULED_REQUESTS`] slots.
    pub fn new(requests_per_second: f64, duration: Duration) -> Option<Self> {
        let interval = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .ok()
            .filter(|interval| !interval.is_zero())?;

        // The rate is positive and finite here, so `exact` is never NaN.
        let exact = (requests_per_second * duration.as_secs_f64() - ROUNDING_TOLERANCE).ceil();
        if exact > f64::from(MAX_SCHEDULED_REQUESTS) {
            return None;
        }

        Some(Self {
            requests: (exact as usize).max(1),
            interval,
        })
    }

    pub fn len(&self) -> usize {
        self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests == 0
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offset of slot `seq` from the start of the run.
    pub fn offset(&self, seq: usize) -> Duration {
        self.interval.mul_f64(seq as f64)
    }

    pub fn offsets(&self) -> impl Iterator<Item = (usize, Duration)> + '_ {
        (0..self.requests).map(|seq| (seq, self.offset(seq)))
    }
}

/// One issued request: its schedule position and when it actually left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub seq: usize,
    pub offset: Duration,
    pub issued_at: DateTime<Utc>,
}

impl Slot {
    pub fn now(seq: usize, offset: Duration) -> Self {
        Self {
            seq,
            offset,
            issued_at: Utc::now(),
        }
    }
}
