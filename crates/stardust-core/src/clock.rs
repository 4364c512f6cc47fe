//! Clock abstraction for deterministic event timestamps.

use chrono::{DateTime, Utc};

/// Source of wall-clock time used to stamp playback events.
///
/// Timers inside the engine use the async runtime's monotonic clock; this
/// trait only covers the timestamps recorded on events.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
