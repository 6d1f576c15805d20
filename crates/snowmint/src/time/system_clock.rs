use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::TimeSource;

/// A wall-clock time source backed by [`SystemTime`].
///
/// Every call reads the system clock afresh. Unlike a monotonic timer this
/// follows NTP steps and manual adjustments, including backwards ones, which
/// is exactly what lets a generator detect and report a clock regression
/// instead of silently minting colliding IDs.
///
/// A system clock set before 1970 reads as `0`.
///
/// # Example
///
/// ```
/// use snowmint::time::{DEFAULT_EPOCH, SystemClock, TimeSource};
///
/// let now = SystemClock.current_millis();
/// assert!(now > DEFAULT_EPOCH.as_millis() as u64);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}
