/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `snowmint` can emit.
///
/// Identity errors are configuration mistakes and are not retryable. Clock
/// errors are surfaced as-is; the generator never retries or corrects them,
/// since reusing a stale timestamp risks colliding with IDs already issued.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The datacenter or worker ID is outside `0..=31`.
    #[error("invalid node identity: datacenter {datacenter_id}, worker {worker_id} (both must be 0..=31)")]
    InvalidIdentity { datacenter_id: i64, worker_id: i64 },

    /// The wall clock reads earlier than the timestamp of the last issued ID.
    ///
    /// No ID was issued and the generator state is unchanged.
    #[error("clock moved backwards by {behind_ms}ms (last {last_ms}, now {now_ms})")]
    ClockRegression {
        last_ms: u64,
        now_ms: u64,
        behind_ms: u64,
    },

    /// The wall clock reads earlier than the configured epoch.
    #[error("clock reads {now_ms}ms, before the epoch at {epoch_ms}ms")]
    ClockBeforeEpoch { now_ms: u64, epoch_ms: u64 },

    /// The epoch-relative timestamp no longer fits the 41-bit field.
    #[error("timestamp {timestamp}ms exceeds the 41-bit timestamp field")]
    TimestampOverflow { timestamp: u64 },

    /// A string could not be parsed as a [`SnowflakeId`].
    ///
    /// [`SnowflakeId`]: crate::id::SnowflakeId
    #[error("invalid snowflake id: {0}")]
    ParseId(String),

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
