//! Throttled parallel execution of flow instances.

use crate::{FlowGraph, ParamBundle, SharedStore};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tintoretto_error::{BoxError, ThrottleResult};
use tintoretto_rate_limit::{RateLimitConfig, RateLimiter};
use tracing::debug;

/// Configuration for a [`FlowBatchExecutor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowConfig {
    /// Maximum simultaneous flow instances.
    pub max_concurrent_flows: u32,
    /// Maximum flow instances started per window (`None` = unlimited).
    pub max_flows_per_window: Option<u32>,
    /// Window duration in seconds.
    pub window_seconds: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_concurrent_flows: 5,
            max_flows_per_window: None,
            window_seconds: 60.0,
        }
    }
}

impl FlowConfig {
    fn limits(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_concurrent: self.max_concurrent_flows,
            max_per_window: self.max_flows_per_window,
            window_seconds: self.window_seconds,
        }
    }
}

/// Flow execution statistics for the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowStats {
    /// Configured concurrency limit.
    pub max_concurrent_flows: u32,
    /// Configured throughput limit.
    pub max_flows_per_window: Option<u32>,
    /// Flow instances that completed cleanly.
    pub completed_flows: u64,
    /// Flow instances that terminated with an error.
    pub failed_flows: u64,
}

/// Runs a pipeline graph once per parameter bundle with bounded concurrency.
///
/// Controls how many flow instances run at once, preventing resource
/// exhaustion when processing large batches where each item requires
/// multiple calls across a node graph. Outcomes are returned in bundle
/// order; a failed instance surfaces its error in place without cancelling
/// siblings.
///
/// All instances share the caller's [`SharedStore`]; use bundle parameters
/// for instance-specific data to avoid write races.
///
/// When a node inside the graph throttles its own fan-out with a
/// [`ThrottledBatchExecutor`](tintoretto_executor::ThrottledBatchExecutor),
/// the effective cap on in-flight external calls is the product of the two
/// limits.
#[derive(Debug)]
pub struct FlowBatchExecutor {
    limiter: Arc<RateLimiter>,
    config: FlowConfig,
    ambient: ParamBundle,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl FlowBatchExecutor {
    /// Create a flow executor.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the limits fail validation.
    pub fn new(config: FlowConfig) -> ThrottleResult<Self> {
        Ok(Self {
            limiter: Arc::new(RateLimiter::new(config.limits())?),
            config,
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

    /// The limiter scoping concurrent flow instances.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    /// Run the graph once per bundle with throttling.
    ///
    /// Returns one outcome per bundle, in input order, after every instance
    /// has finished. Statistics are reset at the start of each run.
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
        debug!(instances = bundles.len(), "running throttled flow batch");

        futures::future::join_all(bundles.into_iter().map(|bundle| async move {
            let _guard = self.limiter.acquire().await;
            let params = self.ambient.merged(&bundle);
            match graph.execute(shared, &params).await {
                Ok(output) => {
                    self.completed.fetch_add(1, Ordering::Relaxed);
                    Ok(output)
                }
                Err(err) => {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    Err(err)
                }
            }
        }))
        .await
    }

    /// Statistics for the most recent run.
    pub fn stats(&self) -> FlowStats {
        FlowStats {
            max_concurrent_flows: self.config.max_concurrent_flows,
            max_flows_per_window: self.config.max_flows_per_window,
            completed_flows: self.completed.load(Ordering::Relaxed),
            failed_flows: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Clear limiter window history and statistics between runs.
    pub fn reset_flow_limiter(&self) {
        self.limiter.reset();
        self.completed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}
