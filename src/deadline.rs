use std::time::{Duration, Instant};

/// The wall-clock budget for one fit.
///
/// The solver polls this once per iteration boundary, so a run can overshoot
/// the limit by up to one iteration's cost before it notices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    end: Instant,
    limit: Duration,
}

impl Deadline {
    /// Start the clock now; the deadline expires after `limit`.
    pub fn starting_now(limit: Duration) -> Self {
        Self {
            end: Instant::now() + limit,
            limit,
        }
    }

    /// Has the deadline passed?
    pub fn has_elapsed(&self) -> bool {
        Instant::now() > self.end
    }

    /// The configured limit, for error reporting.
    pub fn limit(&self) -> Duration {
        self.limit
    }
}
