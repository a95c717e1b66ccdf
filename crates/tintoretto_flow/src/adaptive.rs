//! Adaptive flow-level throttling.

use crate::{FlowGraph, ParamBundle, SharedStore};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tintoretto_error::{BoxError, RateLimitHit, ThrottleResult};
use tintoretto_rate_limit::{AdaptiveConfig, AdaptiveController, RateLimitConfig, RateLimiter};
use tracing::debug;

/// Configuration for an [`AdaptiveFlowExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdaptiveFlowConfig {
    /// Adaptive bounds and factors for the flow-instance cap.
    pub adaptive: AdaptiveConfig,
    /// Optional fixed throughput cap on started instances.
    pub max_flows_per_window: Option<u32>,
}

/// Combined flow and adaptive statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdaptiveFlowStats {
    /// Current adaptive cap on simultaneous instances.
    pub current_concurrent_flows: u32,
    /// Flow instances that completed cleanly in the most recent run.
    pub completed_flows: u64,
    /// Flow instances that terminated with an error in the most recent run.
    pub failed_flows: u64,
    /// Successes since the last rate limit or recovery step.
    pub consecutive_successes: u64,
    /// Total rate limit signals observed.
    pub total_rate_limits: u64,
    /// Total clean terminations observed.
    pub total_successes: u64,
}

/// Runs flow instances with a concurrency cap that adapts to feedback.
///
/// When a flow instance terminates with a
/// [`RateLimitHit`](tintoretto_error::RateLimitHit), the instance cap backs
/// off; sustained clean terminations recover it. Nodes signal throttling by
/// letting the typed error propagate out of the graph:
///
/// ```
/// use tintoretto_error::{BoxError, RateLimitHit};
/// use tintoretto_flow::{FlowGraph, ParamBundle, SharedStore};
///
/// struct ApiNode;
///
/// #[async_trait::async_trait]
/// impl FlowGraph for ApiNode {
///     type Output = ();
///
///     async fn execute(
///         &self,
///         _shared: &SharedStore,
///         _params: &ParamBundle,
///     ) -> Result<(), BoxError> {
///         // a real node would map its client's 429 error here
///         Err(RateLimitHit::new("upstream told us to slow down").into())
///     }
/// }
/// ```
pub struct AdaptiveFlowExecutor {
    controller: AdaptiveController,
    ambient: ParamBundle,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl AdaptiveFlowExecutor {
    /// Create an adaptive flow executor.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the adaptive bounds fail validation.
    pub fn new(config: AdaptiveFlowConfig) -> ThrottleResult<Self> {
        let controller = AdaptiveController::with_limits(
            config.adaptive,
            RateLimitConfig {
                max_concurrent: config.adaptive.initial,
                max_per_window: config.max_flows_per_window,
                ..RateLimitConfig::default()
            },
        )?;
        Ok(Self {
            controller,
            ambient: ParamBundle::new(),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        })
    }

    /// Ambient parameters handed to every instance, under its bundle.
    pub fn with_params(mut self, ambient: ParamBundle) -> Self {
        self.ambient = ambient;
        self
    }

    /// The limiter currently governed by the adaptive controller.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.controller.limiter()
    }

    /// Current adaptive cap on simultaneous flow instances.
    pub fn current_concurrent_flows(&self) -> u32 {
        self.controller.current()
    }

    /// Run the graph once per bundle with adaptive throttling.
    ///
    /// Same contract as [`FlowBatchExecutor::run`](crate::FlowBatchExecutor::run),
    /// with the instance cap adjusting between instances as outcomes arrive.
    pub async fn run<G: FlowGraph>(
        &self,
        graph: &G,
        bundles: Vec<ParamBundle>,
        shared: &SharedStore,
    ) -> Vec<Result<G::Output, BoxError>> {
        self.completed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        if bundles.is_empty() {
            return Vec::new();
        }
        debug!(
            instances = bundles.len(),
            concurrent = self.controller.current(),
            "running adaptive flow batch"
        );

        futures::future::join_all(bundles.into_iter().map(|bundle| async move {
            let limiter = self.controller.limiter();
            let _guard = limiter.acquire().await;
            let params = self.ambient.merged(&bundle);
            match graph.execute(shared, &params).await {
                Ok(output) => {
                    self.completed.fetch_add(1, Ordering::Relaxed);
                    self.controller.on_success();
                    Ok(output)
                }
                Err(err) => {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    if let Some(hit) = err.downcast_ref::<RateLimitHit>() {
                        self.controller.on_rate_limit(Some(hit));
                    }
                    Err(err)
                }
            }
        }))
        .await
    }

    /// Combined flow and adaptive statistics.
    pub fn stats(&self) -> AdaptiveFlowStats {
        let adaptive = self.controller.stats();
        AdaptiveFlowStats {
            current_concurrent_flows: adaptive.current_concurrent,
            completed_flows: self.completed.load(Ordering::Relaxed),
            failed_flows: self.failed.load(Ordering::Relaxed),
            consecutive_successes: adaptive.consecutive_successes,
            total_rate_limits: adaptive.total_rate_limits,
            total_successes: adaptive.total_successes,
        }
    }

    /// Reset all adaptive throttling state.
    ///
    /// Restores the instance cap to its initial level and clears every
    /// counter, including the run statistics.
    pub fn reset_adaptive_state(&self) {
        self.controller.reset();
        self.completed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for AdaptiveFlowExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveFlowExecutor")
            .field("controller", &self.controller)
            .finish()
    }
}
