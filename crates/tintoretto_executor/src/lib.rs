//! Throttled parallel batch execution.
//!
//! The executors in this crate fan a batch of I/O-bound work items out
//! concurrently while routing every item through a
//! [`RateLimiter`](tintoretto_rate_limit::RateLimiter), so external services
//! see bounded parallelism and bounded throughput instead of a thundering
//! herd:
//!
//! - [`ThrottledBatchExecutor`] - fixed limits, optional per-item retry
//! - [`AdaptiveBatchExecutor`] - adds AIMD concurrency tuning driven by
//!   observed rate limit errors
//!
//! Results come back in input order; a failed item occupies its slot as an
//! error without cancelling its siblings.
//!
//! # Example
//!
//! ```
//! use tintoretto_executor::{ExecutorConfig, ThrottledBatchExecutor};
//! use tintoretto_rate_limit::RateLimitConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = ThrottledBatchExecutor::new(ExecutorConfig {
//!     limits: RateLimitConfig::with_window(5, 60),
//!     ..ExecutorConfig::default()
//! })?;
//!
//! let results = executor
//!     .run(vec!["hello", "world"], |text| async move {
//!         Ok(text.to_uppercase())
//!     })
//!     .await;
//!
//! assert_eq!(results[0].as_deref().unwrap(), "HELLO");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adaptive;
mod batch;
mod retry;

pub use adaptive::{AdaptiveBatchExecutor, AdaptiveExecutorConfig};
pub use batch::{ExecutorConfig, ThrottledBatchExecutor};
pub use retry::RetryPolicy;
