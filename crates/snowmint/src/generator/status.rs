use crate::id::SnowflakeId;

/// Represents the result of a single non-blocking attempt to mint an ID.
///
/// - [`Poll::Ready`] indicates a new ID was successfully generated.
/// - [`Poll::Pending`] means all 4096 sequence values of the current
///   millisecond are spent and the caller should wait `yield_for`
///   milliseconds before polling again.
///
/// This allows non-blocking generation loops and clean backoff strategies.
///
/// # Example
///
/// ```
/// use snowmint::{
///     generator::{Poll, SnowflakeGenerator},
///     id::NodeId,
///     time::{DEFAULT_EPOCH, TimeSource},
/// };
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         DEFAULT_EPOCH.as_millis() as u64 + 1
///     }
/// }
///
/// let generator = SnowflakeGenerator::with_time(NodeId::new(0, 1).unwrap(), DEFAULT_EPOCH, FixedTime);
/// match generator.poll_id().unwrap() {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for}ms"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// The sequence is exhausted for the current millisecond.
    Pending {
        /// Milliseconds to wait before polling again.
        yield_for: u64,
    },
}
