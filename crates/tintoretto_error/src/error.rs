//! Top-level error wrapper types.

use crate::{RateLimitHit, ThrottleError};

/// This is the foundation error enum. Additional variants will be added
/// by other tintoretto crates as the workspace grows.
///
/// # Examples
///
/// ```
/// use tintoretto_error::{ThrottleError, TintorettoError};
///
/// let throttle_err = ThrottleError::config("window_seconds must be positive");
/// let err: TintorettoError = throttle_err.into();
/// assert!(format!("{}", err).contains("Throttle Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TintorettoErrorKind {
    /// Rate limiting or registry error
    #[from(ThrottleError)]
    Throttle(ThrottleError),
    /// Upstream service rejected work due to rate limits
    #[from(RateLimitHit)]
    RateLimit(RateLimitHit),
}

/// Tintoretto error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tintoretto_error::{ThrottleError, TintorettoResult};
///
/// fn might_fail() -> TintorettoResult<()> {
///     Err(ThrottleError::not_found("no such limiter"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tintoretto Error: {}", _0)]
pub struct TintorettoError(Box<TintorettoErrorKind>);

impl TintorettoError {
    /// Create a new error from a kind.
    pub fn new(kind: TintorettoErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TintorettoErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TintorettoErrorKind
impl<T> From<T> for TintorettoError
where
    T: Into<TintorettoErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tintoretto operations.
pub type TintorettoResult<T> = std::result::Result<T, TintorettoError>;
