//! Rate limiter trait for abstracting over state layouts.

use std::time::Instant;

use super::decision::Decision;
use super::policy::Policy;

/// Trait for rate limiter implementations.
///
/// This trait abstracts over the single-lock `RateLimiter` and the
/// `ShardedRateLimiter` so the HTTP layer can work with either.
/// `decide` must run the full check-and-update for one identity atomically
/// and must not block on anything but the state lock.
pub trait RateLimiterBackend: Send + Sync {
    /// Decide whether `identity` may make a request at `now`, updating state.
    fn decide(&self, identity: &str, now: Instant) -> Decision;

    /// The policy this limiter enforces.
    fn policy(&self) -> Policy;

    /// Current request count for `identity`, or `None` if it was never seen.
    fn request_count(&self, identity: &str) -> Option<u64>;

    /// Lockout expiry for `identity`, or `None` if it was never penalized.
    fn lockout_expiry(&self, identity: &str) -> Option<Instant>;

    /// Number of identities holding state.
    fn client_count(&self) -> usize;
}
