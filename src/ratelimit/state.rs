//! Per-client throttling state and the decision step applied to it.

use std::time::{Duration, Instant};

use super::decision::{Decision, RejectReason};
use super::policy::Policy;

/// Request count and lockout expiry for one client identity.
///
/// Both fields are read and written together by [`ClientRecord::decide`];
/// whoever owns a record must hold it exclusively for the whole call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientRecord {
    /// Requests accepted since the last penalty
    count: u64,
    /// Earliest time the client is considered again; `None` if never penalized
    lockout_until: Option<Instant>,
}

impl ClientRecord {
    /// Apply one request at `now` and return the outcome.
    ///
    /// A locked-out client is rejected without touching its count. A client
    /// at or over the limit is rejected, its count reset to zero and a fresh
    /// lockout of `policy.period()` started. Anyone else is admitted and counted.
    pub fn decide(&mut self, now: Instant, policy: &Policy) -> Decision {
        if self.is_locked_out(now) {
            return Decision::Reject(RejectReason::LockedOut);
        }

        if self.count >= policy.limit() {
            self.count = 0;
            self.lockout_until = Some(lockout_expiry(now, policy.period()));
            return Decision::Reject(RejectReason::LimitExceeded);
        }

        self.count += 1;
        Decision::Allow
    }

    /// Whether `now` falls strictly before the lockout expiry.
    pub fn is_locked_out(&self, now: Instant) -> bool {
        matches!(self.lockout_until, Some(until) if now < until)
    }

    /// Get the current request count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Get the lockout expiry, if the client was ever penalized.
    pub fn lockout_until(&self) -> Option<Instant> {
        self.lockout_until
    }
}

/// `now + period`, shortened until it fits in an `Instant`.
fn lockout_expiry(now: Instant, period: Duration) -> Instant {
    let mut period = period;
    loop {
        if let Some(until) = now.checked_add(period) {
            return until;
        }
        period /= 2;
    }
}
