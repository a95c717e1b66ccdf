//! Throttling error types.

/// Error kinds for rate limiting and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ThrottleErrorKind {
    /// Invalid constructor or configuration arguments.
    #[display("Configuration error: {_0}")]
    Config(String),
    /// Named limiter missing from the registry or preset catalog.
    #[display("Not found: {_0}")]
    NotFound(String),
    /// Named limiter already registered.
    #[display("Already exists: {_0}")]
    AlreadyExists(String),
}

/// Throttling error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Throttle Error: {} at line {} in {}", kind, line, file)]
pub struct ThrottleError {
    kind: ThrottleErrorKind,
    line: u32,
    file: &'static str,
}

impl ThrottleError {
    /// Create a new throttling error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ThrottleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tintoretto_error::ThrottleError;
    ///
    /// let err = ThrottleError::config("max_concurrent must be at least 1");
    /// assert!(format!("{}", err).contains("max_concurrent"));
    /// ```
    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ThrottleErrorKind::Config(message.into()))
    }

    /// Create a not-found error.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ThrottleErrorKind::NotFound(message.into()))
    }

    /// Create an already-exists error.
    #[track_caller]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ThrottleErrorKind::AlreadyExists(message.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ThrottleErrorKind {
        &self.kind
    }
}

impl<T> From<T> for ThrottleError
where
    T: Into<ThrottleErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for throttling operations.
pub type ThrottleResult<T> = std::result::Result<T, ThrottleError>;
