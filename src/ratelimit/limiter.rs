//! Core rate limiter implementation.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::backend::RateLimiterBackend;
use super::decision::{Decision, RejectReason};
use super::policy::Policy;
use super::state::ClientRecord;

/// The core rate limiter that tracks request counts and lockouts per client.
///
/// All client records live behind a single exclusive lock, so every decision
/// is serialized with every other. The lock is held only for map lookups and
/// arithmetic; logging happens after it is released.
///
/// This struct is thread-safe and can be shared across multiple tasks.
pub struct RateLimiter {
    /// Quota enforced for every client
    policy: Policy,
    /// Client records indexed by client identity
    clients: Mutex<HashMap<String, ClientRecord>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the default policy.
    pub fn new() -> Self {
        Self::with_policy(Policy::default())
    }

    /// Create a new rate limiter enforcing `policy`.
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether `identity` may make a request at `now`.
    pub fn decide(&self, identity: &str, now: Instant) -> Decision {
        let (decision, count) = {
            let mut clients = self.clients.lock();
            let record = clients.entry(identity.to_string()).or_default();
            (record.decide(now, &self.policy), record.count())
        };

        log_decision(identity, decision, count, &self.policy);
        decision
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterBackend for RateLimiter {
    fn decide(&self, identity: &str, now: Instant) -> Decision {
        RateLimiter::decide(self, identity, now)
    }

    fn policy(&self) -> Policy {
        self.policy
    }

    fn request_count(&self, identity: &str) -> Option<u64> {
        self.clients.lock().get(identity).map(ClientRecord::count)
    }

    fn lockout_expiry(&self, identity: &str) -> Option<Instant> {
        self.clients
            .lock()
            .get(identity)
            .and_then(ClientRecord::lockout_until)
    }

    fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}

/// Emit the trace for a decision already made.
pub(super) fn log_decision(identity: &str, decision: Decision, count: u64, policy: &Policy) {
    match decision {
        Decision::Allow => trace!(
            identity = %identity,
            count = count,
            limit = policy.limit(),
            "Request allowed"
        ),
        Decision::Reject(RejectReason::LockedOut) => trace!(
            identity = %identity,
            "Request rejected, client locked out"
        ),
        Decision::Reject(RejectReason::LimitExceeded) => debug!(
            identity = %identity,
            limit = policy.limit(),
            lockout_secs = policy.period().as_secs_f64(),
            "Rate limit exceeded, client locked out"
        ),
    }
}
