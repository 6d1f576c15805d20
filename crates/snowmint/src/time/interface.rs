use core::time::Duration;
use std::sync::Arc;

/// Default epoch: Friday, January 1, 2021 00:00:00 UTC
///
/// A 41-bit millisecond field anchored here lasts until roughly 2090. Never
/// change the epoch of a live node identity: IDs minted afterwards would no
/// longer sort after the ones already issued.
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_609_459_200_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// This abstraction allows you to plug in the real system clock, a pinned
/// fallback clock, or a mocked time source in tests. Generators subtract their
/// own epoch from the value returned here.
///
/// # Example
///
/// ```
/// use snowmint::time::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
