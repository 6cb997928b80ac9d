//! Nonces for signed actions.
//!
//! The exchange expects a millisecond timestamp close to its own clock and
//! rejects reuse per signer. A process handles one request, but the
//! generator stays monotonic so repeated calls on one client never collide.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Returns current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

/// Issues `max(last + 1, now_ms)`.
pub struct NonceManager {
    last: AtomicU64,
    clock: Box<dyn Clock>,
}

impl NonceManager {
    #[must_use]
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            last: AtomicU64::new(0),
            clock,
        }
    }

    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(Box::new(SystemClock))
    }

    pub fn next(&self) -> u64 {
        let now = self.clock.now_ms();
        loop {
            let current = self.last.load(Ordering::Acquire);
            let next_val = current.saturating_add(1).max(now);
            if self
                .last
                .compare_exchange_weak(current, next_val, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return next_val;
            }
        }
    }
}

impl std::fmt::Debug for NonceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceManager")
            .field("last", &self.last.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
