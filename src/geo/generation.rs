//! Last-request-wins bookkeeping
//!
//! Every geolocation or geocoding request takes a ticket before it starts.
//! When the result arrives it may only be applied if no newer ticket has
//! been issued (and the counter has not been invalidated) in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Monotonic request counter
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Supersede every outstanding ticket without starting a request
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether results for `ticket` may still be applied
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}
