//! Adaptive throttled batch executor.

use crate::RetryPolicy;
use std::future::Future;
use std::sync::Arc;
use tintoretto_error::{BoxError, RateLimitHit, ThrottleResult};
use tintoretto_rate_limit::{
    AdaptiveConfig, AdaptiveController, AdaptiveStats, MessageRateLimitDetector, RateLimitConfig,
    RateLimitDetector, RateLimiter,
};
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tracing::debug;

/// Configuration for an [`AdaptiveBatchExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdaptiveExecutorConfig {
    /// Adaptive concurrency bounds and factors.
    pub adaptive: AdaptiveConfig,
    /// Optional fixed throughput cap alongside the adaptive concurrency cap.
    pub max_per_window: Option<u32>,
    /// Retry policy applied to every item.
    pub retry: RetryPolicy,
}

/// Parallel batch executor with adaptive rate limiting.
///
/// Extends the throttled executor with dynamic concurrency that responds to
/// API feedback: back off when rate limit errors appear, recover gradually
/// while requests keep succeeding. Ideal for APIs with unpredictable or
/// undocumented limits.
///
/// Rate limits are recognized two ways on every failed attempt, even when a
/// later retry succeeds:
/// 1. The error downcasts to a [`RateLimitHit`] raised by the work function
/// 2. The configured [`RateLimitDetector`] matches the error
///
/// Non-rate-limit errors retry without touching the adaptive state.
///
/// # Example
///
/// ```
/// use tintoretto_executor::{AdaptiveBatchExecutor, AdaptiveExecutorConfig};
/// use tintoretto_rate_limit::AdaptiveConfig;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = AdaptiveBatchExecutor::new(AdaptiveExecutorConfig {
///     adaptive: AdaptiveConfig {
///         initial: 10,
///         min: 2,
///         max: 50,
///         ..AdaptiveConfig::default()
///     },
///     ..AdaptiveExecutorConfig::default()
/// })?;
///
/// let results = executor
///     .run(vec![1u32, 2, 3], |n| async move { Ok(n + 1) })
///     .await;
///
/// assert!(results.iter().all(|r| r.is_ok()));
/// assert_eq!(executor.stats().total_successes, 3);
/// # Ok(())
/// # }
/// ```
pub struct AdaptiveBatchExecutor {
    controller: AdaptiveController,
    retry: RetryPolicy,
    detector: Arc<dyn RateLimitDetector>,
}

impl AdaptiveBatchExecutor {
    /// Create an adaptive executor with the default message detector.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the adaptive bounds fail validation.
    pub fn new(config: AdaptiveExecutorConfig) -> ThrottleResult<Self> {
        Self::with_detector(config, Arc::new(MessageRateLimitDetector::new()))
    }

    /// Create an adaptive executor with a custom rate limit detector.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the adaptive bounds fail validation.
    pub fn with_detector(
        config: AdaptiveExecutorConfig,
        detector: Arc<dyn RateLimitDetector>,
    ) -> ThrottleResult<Self> {
        let controller = AdaptiveController::with_limits(
            config.adaptive,
            RateLimitConfig {
                max_concurrent: config.adaptive.initial,
                max_per_window: config.max_per_window,
                ..RateLimitConfig::default()
            },
        )?;
        Ok(Self {
            controller,
            retry: config.retry,
            detector,
        })
    }

    /// The limiter currently governed by the adaptive controller.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.controller.limiter()
    }

    /// Current adaptive concurrency level.
    pub fn current_concurrent(&self) -> u32 {
        self.controller.current()
    }

    /// Snapshot of the adaptive statistics.
    pub fn stats(&self) -> AdaptiveStats {
        self.controller.stats()
    }

    /// Reset all adaptive throttling state.
    ///
    /// Restores concurrency to the initial level and clears all counters.
    pub fn reset_adaptive_state(&self) {
        self.controller.reset();
    }

    /// Execute all items with adaptive throttling.
    ///
    /// Same contract as
    /// [`ThrottledBatchExecutor::run`](crate::ThrottledBatchExecutor::run):
    /// ordered results, isolated failures, empty batch in - empty vector out.
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
        debug!(
            batch = items.len(),
            concurrent = self.controller.current(),
            "running adaptive batch"
        );
        futures::future::join_all(items.into_iter().map(|item| self.run_one(item, &work))).await
    }

    // Like the fixed executor's item loop, with outcome tracking wired to the
    // controller around each attempt.
    async fn run_one<T, R, F, Fut>(&self, item: T, work: &F) -> Result<R, BoxError>
    where
        T: Clone + Send,
        R: Send,
        F: Fn(T) -> Fut + Sync,
        Fut: Future<Output = Result<R, BoxError>> + Send,
    {
        let limiter = self.controller.limiter();
        let _guard = limiter.acquire().await;

        let strategy = FixedInterval::new(self.retry.wait()).take(self.retry.retries());
        let result = Retry::spawn(strategy, || {
            let item = item.clone();
            async move {
                work(item).await.map_err(|err| {
                    self.observe_failure(&err);
                    RetryError::Transient {
                        err,
                        retry_after: None,
                    }
                })
            }
        })
        .await;

        if result.is_ok() {
            self.controller.on_success();
        }
        result
    }

    // A rate-limited attempt feeds the controller even when a later retry
    // succeeds; other failures leave the adaptive state alone.
    fn observe_failure(&self, err: &BoxError) {
        if let Some(hit) = err.downcast_ref::<RateLimitHit>() {
            self.controller.on_rate_limit(Some(hit));
        } else if self.detector.is_rate_limit(err.as_ref()) {
            self.controller.on_rate_limit(None);
        }
    }
}

impl std::fmt::Debug for AdaptiveBatchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveBatchExecutor")
            .field("controller", &self.controller)
            .field("retry", &self.retry)
            .finish()
    }
}
