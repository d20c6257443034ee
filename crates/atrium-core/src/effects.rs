//! Cross-crate effect seams
//!
//! Small injectable traits that keep the core deterministic under test:
//! wall-clock time flows through [`Clock`], and the dispatcher reaches live
//! connections through [`LivePush`] without depending on the hub crate.

use crate::identifiers::PrincipalId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time as epoch milliseconds
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock starting at the given epoch-millis value
    pub fn starting_at(ms: u64) -> Self {
        Self {
            ms: AtomicU64::new(ms),
        }
    }

    /// Advance the clock by the given number of milliseconds
    pub fn advance_ms(&self, delta: u64) {
        self.ms.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.ms.load(Ordering::SeqCst)
    }
}

/// Best-effort push to a principal's live connections
///
/// Fire-and-forget by contract: zero live connections is a silent no-op,
/// since the durable in-app record satisfies delivery. Returns the number
/// of connections the event was handed to.
pub trait LivePush: Send + Sync {
    /// Push an opaque named event to every live connection of `principal`
    fn push(&self, principal: PrincipalId, event: &str, payload: serde_json::Value) -> usize;
}

/// No-op push used when no hub is wired in (tests, batch tools)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLivePush;

impl LivePush for NoopLivePush {
    fn push(&self, _principal: PrincipalId, _event: &str, _payload: serde_json::Value) -> usize {
        0
    }
}
