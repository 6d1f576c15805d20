use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{
    error::Result,
    generator::{Poll, SnowflakeGenerator},
    id::SnowflakeId,
    time::TimeSource,
};

/// Extension trait for asynchronously generating Snowflake IDs.
///
/// Instead of spinning through an exhausted millisecond, the returned future
/// sleeps via `S` and polls again. Errors are returned as soon as the
/// generator reports them; a clock regression is never retried.
///
/// Generation cannot be cancelled from inside. Wrap the future in a timeout
/// (e.g. `tokio::time::timeout`) and treat the elapsed case as a transient
/// failure.
pub trait SnowflakeGeneratorAsyncExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Same as [`SnowflakeGenerator::next_id`].
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider;
}

impl<T> SnowflakeGeneratorAsyncExt for SnowflakeGenerator<T>
where
    T: TimeSource + Sync,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider,
    {
        async {
            loop {
                let dur = match self.poll_id()? {
                    Poll::Ready { id } => return Ok(id),
                    Poll::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
