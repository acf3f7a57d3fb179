//! Rate limiting logic and state management.

mod backend;
mod clock;
mod decision;
mod guard;
mod limiter;
mod policy;
mod sharded;
mod state;

pub use backend::RateLimiterBackend;
pub use clock::{Clock, SystemClock};
pub use decision::{Decision, RejectReason};
pub use guard::{ThrottleGuard, TooManyRequests};
pub use limiter::RateLimiter;
pub use policy::{Policy, DEFAULT_LIMIT, DEFAULT_PERIOD};
pub use sharded::ShardedRateLimiter;
pub use state::ClientRecord;

#[cfg(test)]
pub(crate) use clock::TestClock;
