//! Tintoretto - Rate-Limited Parallel Execution
//!
//! Tintoretto executes large batches of I/O-bound work items (LLM requests,
//! HTTP scrapes, any remote call) with bounded parallelism and bounded
//! throughput, so external services are never overloaded and 429-class
//! failures are avoided while still extracting real speed-up over serial
//! execution.
//!
//! # Features
//!
//! - **Dual-mode rate limiting**: concurrency cap (semaphore) plus
//!   sliding-window throughput cap
//! - **Throttled batch execution**: ordered concurrent fan-out with per-item
//!   retry, failures isolated per slot
//! - **Adaptive throttling**: AIMD concurrency tuning driven by rate limit
//!   feedback
//! - **Shared budgets**: process-wide limiter registry so independent call
//!   sites share one quota
//! - **Flow-level throttling**: run a whole pipeline graph once per input
//!   with bounded instances in flight
//! - **Presets**: rate limit catalogs for popular LLM and API services
//!
//! # Quick Start
//!
//! ```
//! use tintoretto::{ExecutorConfig, Preset, ThrottledBatchExecutor};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // OpenAI tier-1 limits: 5 concurrent, 60 requests per minute.
//! let executor = ThrottledBatchExecutor::new(ExecutorConfig {
//!     limits: Preset::OpenaiTier1.into(),
//!     ..ExecutorConfig::default()
//! })?;
//!
//! let texts = vec!["Hello", "World"];
//! let results = executor
//!     .run(texts, |text| async move {
//!         // a real caller would await its LLM client here
//!         Ok(format!("Translated: {text}"))
//!     })
//!     .await;
//!
//! assert!(results.iter().all(|r| r.is_ok()));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Tintoretto is organized as a workspace with focused crates:
//!
//! - `tintoretto_error` - error types and the `RateLimitHit` signal
//! - `tintoretto_rate_limit` - limiter, registry, presets, adaptive control
//! - `tintoretto_executor` - throttled and adaptive batch executors
//! - `tintoretto_flow` - flow-level throttling over a narrow orchestration
//!   interface
//!
//! This crate (`tintoretto`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod telemetry;

pub use tintoretto_error::{
    BoxError, RateLimitHit, ThrottleError, ThrottleErrorKind, ThrottleResult, TintorettoError,
    TintorettoErrorKind, TintorettoResult,
};
pub use tintoretto_executor::{
    AdaptiveBatchExecutor, AdaptiveExecutorConfig, ExecutorConfig, RetryPolicy,
    ThrottledBatchExecutor,
};
pub use tintoretto_flow::{
    AdaptiveBatchNode, AdaptiveFlowConfig, AdaptiveFlowExecutor, AdaptiveFlowStats, BatchNode,
    FlowBatchExecutor, FlowConfig, FlowGraph, FlowStats, ParamBundle, SharedStore,
    ThrottledBatchNode,
};
pub use tintoretto_rate_limit::{
    AdaptiveConfig, AdaptiveController, AdaptiveStats, LimiterRegistry, LimiterStats,
    MessageRateLimitDetector, Preset, RateLimitConfig, RateLimitDetector, RateLimiter,
    RateLimiterGuard, ThrottleConfig,
};
