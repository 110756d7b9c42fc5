//! Time source for claim validation

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Supplies the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall clock backed by [`SystemTime::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(SystemTime);

impl FixedClock {
    pub fn new(instant: SystemTime) -> Self {
        Self(instant)
    }

    /// Clock frozen at `seconds` after the Unix epoch
    pub fn at_unix_seconds(seconds: u64) -> Self {
        Self(UNIX_EPOCH + Duration::from_secs(seconds))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// Whole Unix seconds for the clock's current instant
///
/// Instants before the epoch clamp to zero.
pub(crate) fn unix_seconds(clock: &dyn Clock) -> f64 {
    clock
        .now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as f64)
        .unwrap_or(0.0)
}

/// Convert Unix seconds (possibly fractional) back to an instant
pub(crate) fn instant_from_unix_seconds(seconds: f64) -> SystemTime {
    if seconds.is_finite() && seconds > 0.0 {
        UNIX_EPOCH
            .checked_add(Duration::from_secs_f64(seconds.min(u64::MAX as f64 / 2.0)))
            .unwrap_or(UNIX_EPOCH)
    } else {
        UNIX_EPOCH
    }
}
