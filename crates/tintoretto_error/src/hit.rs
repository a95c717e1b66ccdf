//! Typed rate limit signal.

use std::time::Duration;

/// Signal that an upstream service rejected work due to rate limits.
///
/// Raise this from a work function (or a flow node) to tell the adaptive
/// layers that throttling should be tightened. The executors recover it by
/// downcasting the opaque item error, so it survives the trip through
/// [`BoxError`](crate::BoxError) intact.
///
/// # Examples
///
/// ```
/// use tintoretto_error::{BoxError, RateLimitHit};
/// use std::time::Duration;
///
/// fn call_api() -> Result<String, BoxError> {
///     Err(RateLimitHit::new("OpenAI rate limit exceeded")
///         .with_retry_after(Duration::from_secs(20))
///         .with_source("openai")
///         .into())
/// }
///
/// let err = call_api().unwrap_err();
/// let hit = err.downcast_ref::<RateLimitHit>().unwrap();
/// assert_eq!(hit.source(), Some("openai"));
/// ```
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("{message}")]
pub struct RateLimitHit {
    message: String,
    retry_after: Option<Duration>,
    // An identifier string, not an error cause.
    #[error(not(source))]
    source: Option<String>,
}

impl RateLimitHit {
    /// Create a new rate limit signal with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    /// Attach a hint for how long to wait before retrying.
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    /// Attach the identifier of the rate limit source (e.g. "openai").
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Human-readable description of the rate limit.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional hint for how long to wait before retrying.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Optional identifier of the rate limit source.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl Default for RateLimitHit {
    fn default() -> Self {
        Self::new("Rate limit hit")
    }
}
