use core::{future::Future, time::Duration};

use crate::{
    error::Result,
    futures::{SleepProvider, SnowflakeGeneratorAsyncExt},
    generator::SnowflakeGenerator,
    id::SnowflakeId,
    time::TimeSource,
};

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    async fn sleep_for(dur: Duration) {
        tokio::time::sleep(dur).await;
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// This strategy avoids timer-based delays by yielding to the scheduler
/// immediately. Tokio's timer has millisecond granularity, so a sleep can
/// overshoot the one-millisecond wait; yielding trades that latency for
/// tighter polling and more CPU.
pub struct TokioYield;
impl SleepProvider for TokioYield {
    async fn sleep_for(_dur: Duration) {
        tokio::task::yield_now().await;
    }
}

/// Extension trait for asynchronously generating Snowflake IDs on the
/// [`tokio`](https://docs.rs/tokio) runtime with [`TokioSleep`].
pub trait SnowflakeGeneratorAsyncTokioExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use snowmint::{futures::SnowflakeGeneratorAsyncTokioExt, generator::SnowflakeGenerator};
    ///
    /// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
    /// let generator = SnowflakeGenerator::new(1, 1).unwrap();
    /// let id = tokio::time::timeout(Duration::from_millis(100), generator.next_id_async())
    ///     .await
    ///     .expect("timed out")
    ///     .unwrap();
    /// assert_eq!(id.worker_id(), 1);
    /// # });
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`SnowflakeGenerator::next_id`].
    fn next_id_async(&self) -> impl Future<Output = Result<SnowflakeId>>;
}

impl<T> SnowflakeGeneratorAsyncTokioExt for SnowflakeGenerator<T>
where
    T: TimeSource + Sync,
{
    fn next_id_async(&self) -> impl Future<Output = Result<SnowflakeId>> {
        <Self as SnowflakeGeneratorAsyncExt>::try_next_id_async::<TokioSleep>(self)
    }
}
