//! Classification of opaque errors as rate limit errors.
//!
//! Third-party client errors rarely expose a typed "you are being throttled"
//! variant, so the default detector matches the error message against a small
//! vocabulary. Call sites with better information (a typed SDK error, an HTTP
//! status on hand) should supply their own [`RateLimitDetector`].

use std::error::Error;

/// Pluggable predicate deciding whether an error indicates throttling.
///
/// Implementations must be cheap: the executors consult the detector on every
/// failed attempt.
pub trait RateLimitDetector: Send + Sync {
    /// Returns true if this error looks like a rate limit rejection.
    fn is_rate_limit(&self, error: &(dyn Error + 'static)) -> bool;
}

/// Default detector matching error messages against a throttling vocabulary.
///
/// Matching is case-insensitive substring search. The default vocabulary
/// covers the phrasings used by popular LLM and HTTP services:
/// `429`, `rate limit`, `rate_limit`, `too many requests`, `quota exceeded`,
/// and the `throttl` stem.
///
/// # Example
///
/// ```
/// use tintoretto_rate_limit::{MessageRateLimitDetector, RateLimitDetector};
/// use std::io;
///
/// let detector = MessageRateLimitDetector::new();
/// let throttled = io::Error::other("HTTP 429 Too Many Requests");
/// let auth = io::Error::other("Invalid API key");
/// assert!(detector.is_rate_limit(&throttled));
/// assert!(!detector.is_rate_limit(&auth));
/// ```
#[derive(Debug, Clone)]
pub struct MessageRateLimitDetector {
    patterns: Vec<String>,
}

impl MessageRateLimitDetector {
    /// Indicators checked by the default vocabulary.
    pub const DEFAULT_PATTERNS: [&'static str; 6] = [
        "429",
        "rate limit",
        "rate_limit",
        "too many requests",
        "quota exceeded",
        "throttl",
    ];

    /// Create a detector with the default vocabulary.
    pub fn new() -> Self {
        Self::with_patterns(Self::DEFAULT_PATTERNS)
    }

    /// Create a detector with a custom vocabulary.
    ///
    /// Patterns are matched case-insensitively against the error's display
    /// output; supply them lowercase.
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for MessageRateLimitDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitDetector for MessageRateLimitDetector {
    fn is_rate_limit(&self, error: &(dyn Error + 'static)) -> bool {
        let message = error.to_string().to_lowercase();
        self.patterns.iter().any(|p| message.contains(p.as_str()))
    }
}
