//! Throttled parallel batch executor.

use crate::RetryPolicy;
use std::future::Future;
use std::sync::Arc;
use tintoretto_error::{BoxError, ThrottleResult};
use tintoretto_rate_limit::{RateLimitConfig, RateLimiter};
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tracing::debug;

/// Configuration for a [`ThrottledBatchExecutor`].
///
/// Construction merges defaults with overrides through struct update syntax:
///
/// ```
/// use tintoretto_executor::{ExecutorConfig, RetryPolicy};
/// use tintoretto_rate_limit::RateLimitConfig;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExecutorConfig {
///     limits: RateLimitConfig::with_window(10, 500),
///     retry: RetryPolicy::new(3, Duration::from_secs(1))?,
/// };
/// # let _ = config;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExecutorConfig {
    /// Rate limits applied to every item.
    pub limits: RateLimitConfig,
    /// Retry policy applied to every item.
    pub retry: RetryPolicy,
}

/// Parallel batch executor with built-in rate limiting.
///
/// Executes items concurrently but with controlled parallelism, so external
/// services are never overwhelmed. Unlike a bare `join_all` fan-out, every
/// item first acquires a slot from the executor's [`RateLimiter`]; retries of
/// an item run while its slot is still held.
///
/// Results are returned in input order regardless of completion order, and a
/// failing item surfaces its error in place without cancelling siblings.
///
/// # Example
///
/// ```
/// use tintoretto_executor::{ExecutorConfig, ThrottledBatchExecutor};
/// use tintoretto_rate_limit::RateLimitConfig;
/// use tintoretto_error::BoxError;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), BoxError> {
/// let executor = ThrottledBatchExecutor::new(ExecutorConfig {
///     limits: RateLimitConfig::new(3),
///     ..ExecutorConfig::default()
/// })?;
///
/// let results = executor
///     .run((0..10).collect(), |n: u32| async move { Ok(n * 2) })
///     .await;
///
/// assert_eq!(results.len(), 10);
/// assert_eq!(*results[4].as_ref().unwrap(), 8);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ThrottledBatchExecutor {
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl ThrottledBatchExecutor {
    /// Create an executor owning its own rate limiter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the limits fail validation.
    pub fn new(config: ExecutorConfig) -> ThrottleResult<Self> {
        Ok(Self {
            limiter: Arc::new(RateLimiter::new(config.limits)?),
            retry: config.retry,
        })
    }

    /// Create an executor drawing from a shared limiter.
    ///
    /// Use with [`LimiterRegistry`](tintoretto_rate_limit::LimiterRegistry)
    /// when several executors must respect one global budget.
    pub fn with_limiter(limiter: Arc<RateLimiter>, retry: RetryPolicy) -> Self {
        Self { limiter, retry }
    }

    /// The limiter every item passes through.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    /// The executor's retry policy.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Execute all items with controlled parallelism.
    ///
    /// Returns one result per item, in input order. The call returns only
    /// when every item has finished; no permits remain held afterwards.
    /// An empty batch returns an empty vector.
    ///
    /// Items must be `Clone` so a failed attempt can be replayed under the
    /// retry policy.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> Vec<Result<R, BoxError>>
    where
        T: Clone + Send,
        R: Send,
        F: Fn(T) -> Fut + Sync,
        Fut: Future<Output = Result<R, BoxError>> + Send,
    {
        if items.is_empty() {
            return Vec::new();
        }
        debug!(batch = items.len(), "running throttled batch");
        futures::future::join_all(items.into_iter().map(|item| self.run_one(item, &work))).await
    }

    // Acquires the limiter scope, then drives the retry loop inside it so
    // the permit is held across every attempt of the same item.
    async fn run_one<T, R, F, Fut>(&self, item: T, work: &F) -> Result<R, BoxError>
    where
        T: Clone + Send,
        R: Send,
        F: Fn(T) -> Fut + Sync,
        Fut: Future<Output = Result<R, BoxError>> + Send,
    {
        let _guard = self.limiter.acquire().await;

        let strategy = FixedInterval::new(self.retry.wait()).take(self.retry.retries());
        Retry::spawn(strategy, || {
            let item = item.clone();
            async move {
                work(item).await.map_err(|err| RetryError::Transient {
                    err,
                    retry_after: None,
                })
            }
        })
        .await
    }
}
