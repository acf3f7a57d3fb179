//! Wraps a downstream handler with a throttling decision.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use super::backend::RateLimiterBackend;
use super::clock::{Clock, SystemClock};
use super::decision::{Decision, RejectReason};

/// A request turned away by a [`ThrottleGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyRequests {
    pub reason: RejectReason,
}

/// Gate placed in front of a downstream handler.
///
/// Holds the limiter whose state decides each request and the clock that
/// supplies `now` for callers that do not bring their own.
#[derive(Clone)]
pub struct ThrottleGuard {
    limiter: Arc<dyn RateLimiterBackend>,
    clock: Arc<dyn Clock>,
}

impl ThrottleGuard {
    /// Create a guard reading time from the system clock.
    pub fn new(limiter: Arc<dyn RateLimiterBackend>) -> Self {
        Self::with_clock(limiter, Arc::new(SystemClock))
    }

    /// Create a guard reading time from `clock`.
    pub fn with_clock(limiter: Arc<dyn RateLimiterBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { limiter, clock }
    }

    /// Current time according to this guard's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Get the limiter behind this guard.
    pub fn limiter(&self) -> &Arc<dyn RateLimiterBackend> {
        &self.limiter
    }

    /// Decide on `request` from `identity` and, if allowed, pass it to `downstream`.
    ///
    /// The decision is complete and the limiter unlocked before `downstream`
    /// is called. A rejected request never reaches `downstream`.
    pub async fn handle<Req, Resp, F, Fut>(
        &self,
        identity: &str,
        now: Instant,
        request: Req,
        downstream: F,
    ) -> Result<Resp, TooManyRequests>
    where
        F: FnOnce(Req) -> Fut,
        Fut: Future<Output = Resp>,
    {
        match self.limiter.decide(identity, now) {
            Decision::Allow => Ok(downstream(request).await),
            Decision::Reject(reason) => Err(TooManyRequests { reason }),
        }
    }
}
