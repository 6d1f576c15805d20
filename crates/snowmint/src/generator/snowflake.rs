use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    generator::{Mutex, Poll, lock},
    id::{NodeId, SnowflakeId},
    time::{DEFAULT_EPOCH, SystemClock, TimeSource},
};

/// Largest value of the 12-bit sequence field.
pub const MAX_SEQUENCE: u16 = SnowflakeId::SEQUENCE_MASK as u16;

/// Mutable clock tracking for one node, always read and written under the
/// generator's lock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct State {
    /// Unix millisecond of the most recently issued ID; `None` until the
    /// first ID is issued.
    pub(crate) last_timestamp: Option<u64>,
    pub(crate) sequence: u16,
}

/// A lock-based Snowflake ID generator for one node identity.
///
/// The `(last_timestamp, sequence)` state sits behind a [`Mutex`], so a
/// single generator can be shared across threads (typically in an `Arc` or
/// through a [`GeneratorRegistry`]). Each call reads the clock, compares it
/// to the last issued timestamp and updates the state in one critical
/// section, so two callers never mint the same `(timestamp, sequence)` pair.
///
/// ## Behavior
/// - Clock advanced: sequence restarts at `0`.
/// - Same millisecond: sequence increments, up to 4096 IDs per millisecond.
/// - Budget exhausted: [`Poll::Pending`]; [`Self::next_id`] waits out the
///   millisecond without holding the lock.
/// - Clock behind the last issued ID: [`Error::ClockRegression`], nothing
///   issued and nothing mutated.
///
/// ## See Also
/// - [`GeneratorRegistry`]
///
/// [`GeneratorRegistry`]: crate::registry::GeneratorRegistry
pub struct SnowflakeGenerator<T = SystemClock>
where
    T: TimeSource,
{
    node: NodeId,
    epoch_millis: u64,
    #[cfg(feature = "cache-padded")]
    pub(crate) state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Mutex<State>,
    time: T,
}

impl SnowflakeGenerator<SystemClock> {
    /// Creates an isolated generator on the system clock and
    /// [`DEFAULT_EPOCH`].
    ///
    /// The generator owns private sequence and clock state; nothing else
    /// shares it. Prefer a [`GeneratorRegistry`] when several call sites mint
    /// IDs for the same node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if either ID exceeds 31.
    ///
    /// # Example
    /// ```
    /// use snowmint::generator::SnowflakeGenerator;
    ///
    /// let generator = SnowflakeGenerator::new(1, 1).unwrap();
    /// let a = generator.next_id().unwrap();
    /// let b = generator.next_id().unwrap();
    /// assert!(a < b);
    /// assert_eq!(a.datacenter_id(), 1);
    /// assert_eq!(a.worker_id(), 1);
    ///
    /// assert!(SnowflakeGenerator::new(32, 0).is_err());
    /// ```
    ///
    /// [`GeneratorRegistry`]: crate::registry::GeneratorRegistry
    pub fn new(datacenter_id: u8, worker_id: u8) -> Result<Self> {
        let node = NodeId::new(datacenter_id, worker_id)?;
        Ok(Self::with_time(node, DEFAULT_EPOCH, SystemClock))
    }
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator for `node` that reads `time` and encodes
    /// timestamps relative to `epoch`.
    ///
    /// # Parameters
    ///
    /// - `node`: the validated `(datacenter, worker)` identity encoded into
    ///   every ID.
    /// - `epoch`: the origin of the 41-bit timestamp field, as a [`Duration`]
    ///   since 1970-01-01 UTC.
    /// - `time`: a [`TimeSource`] returning Unix milliseconds.
    pub fn with_time(node: NodeId, epoch: Duration, time: T) -> Self {
        Self::from_components(node, epoch, None, 0, time)
    }

    /// Creates a generator preloaded with explicit state.
    ///
    /// This constructor is primarily useful for restoring a persisted
    /// high-water mark after a restart, so that a clock that restarts behind
    /// the last issued ID is reported instead of silently reusing timestamps.
    ///
    /// # Parameters
    /// - `last_timestamp`: Unix millisecond of the last issued ID, or `None`
    /// - `sequence`: the sequence of that ID; values above 4095 are clamped
    ///
    /// # ⚠️ Note
    /// In typical use cases, you should prefer [`Self::with_time`].
    pub fn from_components(
        node: NodeId,
        epoch: Duration,
        last_timestamp: Option<u64>,
        sequence: u16,
        time: T,
    ) -> Self {
        let state = State {
            last_timestamp,
            sequence: sequence.min(MAX_SEQUENCE),
        };
        Self {
            node,
            epoch_millis: epoch.as_millis() as u64,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(state),
            time,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn datacenter_id(&self) -> u8 {
        self.node.datacenter_id()
    }

    pub fn worker_id(&self) -> u8 {
        self.node.worker_id()
    }

    /// The origin of the timestamp field.
    pub fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// Generates the next ID, spinning through an exhausted millisecond.
    ///
    /// Sequence exhaustion is invisible to the caller except as latency;
    /// the wait is bounded by the clock reaching the next millisecond.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued ID. The caller decides whether to wait, alert or fail.
    /// - [`Error::ClockBeforeEpoch`] / [`Error::TimestampOverflow`] if the
    ///   clock is outside the range the epoch can encode.
    /// - [`Error::LockPoisoned`] if another thread panicked mid-generation
    ///   (std mutex only).
    pub fn next_id(&self) -> Result<SnowflakeId> {
        self.next_id_with(|_| core::hint::spin_loop())
    }

    /// Generates the next ID, calling `f(yield_for)` each time the current
    /// millisecond is exhausted.
    ///
    /// Use this to swap the spin for a sleep or a yield.
    ///
    /// # Example
    /// ```
    /// use snowmint::generator::SnowflakeGenerator;
    ///
    /// let generator = SnowflakeGenerator::new(3, 4).unwrap();
    /// let id = generator
    ///     .next_id_with(|_| std::thread::yield_now())
    ///     .unwrap();
    /// assert_eq!(id.node_id(), generator.node_id());
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, f), fields(node = %self.node)))]
    pub fn next_id_with(&self, mut f: impl FnMut(u64)) -> Result<SnowflakeId> {
        loop {
            match self.poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for } => f(yield_for),
            }
        }
    }

    /// Attempts to generate the next ID without waiting.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: A new ID is available
    /// - `Ok(Poll::Pending { yield_for })`: The time to wait (in
    ///   milliseconds) before trying again
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`]. On error the generator state is unchanged.
    pub fn poll_id(&self) -> Result<Poll> {
        let mut state = lock!(self.state);
        // Read under the lock: a reading taken before a competing caller
        // advanced `last_timestamp` would look like a regression.
        let now = self.time.current_millis();

        let Some(timestamp) = now.checked_sub(self.epoch_millis) else {
            return Err(self.cold_before_epoch(now));
        };
        if timestamp > SnowflakeId::TIMESTAMP_MASK {
            return Err(Error::TimestampOverflow { timestamp });
        }

        let last_timestamp = state.last_timestamp;
        match last_timestamp {
            Some(last) if now < last => Err(self.cold_clock_behind(last, now)),
            Some(last) if now == last => {
                if state.sequence < MAX_SEQUENCE {
                    state.sequence += 1;
                    Ok(Poll::Ready {
                        id: SnowflakeId::for_node(timestamp, self.node, state.sequence),
                    })
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(node = %self.node, now, "sequence exhausted");
                    Ok(Poll::Pending { yield_for: 1 })
                }
            }
            _ => {
                state.last_timestamp = Some(now);
                state.sequence = 0;
                Ok(Poll::Ready {
                    id: SnowflakeId::for_node(timestamp, self.node, 0),
                })
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, last_ms: u64, now_ms: u64) -> Error {
        let behind_ms = last_ms - now_ms;
        #[cfg(feature = "tracing")]
        tracing::warn!(node = %self.node, last_ms, now_ms, behind_ms, "clock moved backwards");
        Error::ClockRegression {
            last_ms,
            now_ms,
            behind_ms,
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_before_epoch(&self, now_ms: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(node = %self.node, now_ms, epoch_ms = self.epoch_millis, "clock before epoch");
        Error::ClockBeforeEpoch {
            now_ms,
            epoch_ms: self.epoch_millis,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> Result<State> {
        Ok(*lock!(self.state))
    }
}

impl<T> core::fmt::Debug for SnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnowflakeGenerator")
            .field("node", &self.node)
            .field("epoch_millis", &self.epoch_millis)
            .finish_non_exhaustive()
    }
}
