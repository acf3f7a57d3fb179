//! Outcome of a single throttling decision.

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The client is still inside a lockout period.
    LockedOut,
    /// The client had used up its quota; this request started a lockout.
    LimitExceeded,
}

/// Result of checking one request against a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject(RejectReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_allowed()
    }
}
