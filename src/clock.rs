//! Time sources for the engine.
//!
//! The engine never reads the system clock directly. Every timestamp it
//! takes (`start`, `resume` rebase, `tick`, pause/stop/lap capture) comes
//! from one injected [`Clock`], so mixed time sources cannot skew the
//! elapsed computation. [`SystemClock`] is the wall-clock default;
//! [`ManualClock`] is a shareable, deterministic source for tests and
//! simulated sessions.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond time source injected into [`TimerEngine`](crate::TimerEngine).
///
/// Implementations must be monotonically non-decreasing within one engine's
/// lifetime for elapsed values to be meaningful.
pub trait Clock: Send + 'static {
    /// Current time in milliseconds.
    ///
    /// For [`SystemClock`] this is milliseconds since the Unix epoch; a
    /// custom clock may use any epoch as long as it is consistent.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time source (milliseconds since the Unix epoch).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Manually advanced time source.
///
/// Clones share the same underlying instant, so a test can hold one clone
/// and advance time while the engine reads through another.
///
/// # Example
///
/// ```rust
/// use paceline::{Clock, ManualClock};
///
/// let clock = ManualClock::default();
/// let observer = clock.clone();
/// clock.advance(5_000);
/// assert_eq!(observer.now_ms(), 5_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at the given instant.
    pub fn starting_at(now_ms: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(now_ms)) }
    }

    /// Advance the clock by `delta_ms` milliseconds.
    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Set the clock to an absolute instant.
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
