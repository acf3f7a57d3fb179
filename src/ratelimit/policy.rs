//! Limit and lockout period applied by a limiter.

use std::time::Duration;

/// Requests a client may make before the next one is penalized.
pub const DEFAULT_LIMIT: u64 = 20;
/// How long a penalized client is locked out.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(10);

/// The quota enforced by a limiter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    limit: u64,
    period: Duration,
}

impl Policy {
    /// Create a policy allowing `limit` requests, then locking the client out for `period`.
    pub fn new(limit: u64, period: Duration) -> Self {
        Self { limit, period }
    }

    /// Get the request limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Get the lockout period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_PERIOD)
    }
}
