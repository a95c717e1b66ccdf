//! Error types for the Tintoretto throttled execution library.
//!
//! This crate provides the foundation error types used throughout the
//! Tintoretto ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! User callables cross the executor boundary as opaque [`BoxError`] values,
//! so a batch item can fail with any error type without the executors caring
//! which. The one typed exception is [`RateLimitHit`], the signal that an
//! upstream service is rejecting work due to rate limits.
//!
//! # Examples
//!
//! ```
//! use tintoretto_error::{ThrottleError, ThrottleResult};
//!
//! fn lookup(name: &str) -> ThrottleResult<()> {
//!     Err(ThrottleError::not_found(format!("limiter '{name}' not found")))
//! }
//!
//! match lookup("openai") {
//!     Ok(_) => println!("found"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod hit;
mod throttle;

pub use error::{TintorettoError, TintorettoErrorKind, TintorettoResult};
pub use hit::RateLimitHit;
pub use throttle::{ThrottleError, ThrottleErrorKind, ThrottleResult};

/// Opaque error type for user callables executed by the batch executors.
///
/// Work functions handed to the executors may fail with any error type;
/// results carry the failure in place without cancelling sibling items.
/// Downcast to [`RateLimitHit`] to recover the typed throttling signal.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
