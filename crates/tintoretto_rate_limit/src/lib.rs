//! Rate limiting primitives for throttled parallel execution.
//!
//! This crate provides the control plane used by the Tintoretto executors to
//! keep external services within their quotas:
//!
//! - [`RateLimiter`] - dual-mode gate combining a concurrency cap (semaphore)
//!   with a sliding-window throughput cap
//! - [`LimiterRegistry`] - process-wide named limiters, so independent call
//!   sites targeting one service share a single budget
//! - [`AdaptiveController`] - AIMD resizing of a limiter's concurrency cap in
//!   response to rate-limit feedback
//! - [`MessageRateLimitDetector`] - classifies opaque errors as throttling
//!   errors by message vocabulary
//! - [`Preset`] - catalog of rate limit configurations for popular services
//!
//! # Example
//!
//! ```
//! use tintoretto_rate_limit::{RateLimitConfig, RateLimiter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Allow 5 concurrent requests, 60 requests per minute.
//! let limiter = RateLimiter::new(RateLimitConfig::with_window(5, 60))?;
//!
//! let guard = limiter.acquire().await;
//! // ... make the API call ...
//! drop(guard); // releases the concurrency slot
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adaptive;
mod config;
mod detector;
mod limiter;
mod presets;
mod registry;

pub use adaptive::{AdaptiveConfig, AdaptiveController, AdaptiveStats};
pub use config::{RateLimitConfig, ThrottleConfig};
pub use detector::{MessageRateLimitDetector, RateLimitDetector};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use presets::Preset;
pub use registry::{LimiterRegistry, LimiterStats};
