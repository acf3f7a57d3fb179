//! Rate limiter with client state spread over independently locked shards.
//!
//! Each client identity hashes to one shard; the shard stays write-locked
//! while that client's record is checked and updated, so per-client decisions
//! are exactly as atomic as with [`RateLimiter`](super::RateLimiter), while
//! clients on different shards never wait on each other.

use std::time::Instant;

use dashmap::DashMap;

use super::backend::RateLimiterBackend;
use super::decision::Decision;
use super::limiter::log_decision;
use super::policy::Policy;
use super::state::ClientRecord;

/// A rate limiter backed by a sharded concurrent map.
pub struct ShardedRateLimiter {
    /// Quota enforced for every client
    policy: Policy,
    /// Client records indexed by client identity
    clients: DashMap<String, ClientRecord>,
}

impl ShardedRateLimiter {
    /// Create a new sharded rate limiter with the default policy.
    pub fn new() -> Self {
        Self::with_policy(Policy::default())
    }

    /// Create a new sharded rate limiter enforcing `policy`.
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy,
            clients: DashMap::new(),
        }
    }
}

impl Default for ShardedRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterBackend for ShardedRateLimiter {
    fn decide(&self, identity: &str, now: Instant) -> Decision {
        let (decision, count) = {
            let mut record = self.clients.entry(identity.to_string()).or_default();
            (record.decide(now, &self.policy), record.count())
        };

        log_decision(identity, decision, count, &self.policy);
        decision
    }

    fn policy(&self) -> Policy {
        self.policy
    }

    fn request_count(&self, identity: &str) -> Option<u64> {
        self.clients.get(identity).map(|record| record.count())
    }

    fn lockout_expiry(&self, identity: &str) -> Option<Instant> {
        self.clients
            .get(identity)
            .and_then(|record| record.lockout_until())
    }

    fn client_count(&self) -> usize {
        self.clients.len()
    }
}
