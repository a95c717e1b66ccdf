//! Per-item retry policy.

use serde::Serialize;
use std::time::Duration;
use tintoretto_error::{ThrottleError, ThrottleResult};

/// Fixed-interval retry policy applied to each batch item.
///
/// The policy is classifier-agnostic: any error triggers another attempt
/// until `max_attempts` is exhausted, then the final error is surfaced in the
/// item's result slot. Retries run while the item's rate limiter permit is
/// still held, so a struggling item cannot re-queue behind newer arrivals or
/// amplify load during an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    max_attempts: u32,
    wait: Duration,
}

impl Default for RetryPolicy {
    /// One attempt, no retry.
    fn default() -> Self {
        Self {
            max_attempts: 1,
            wait: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Create a retry policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `max_attempts` is zero.
    pub fn new(max_attempts: u32, wait: Duration) -> ThrottleResult<Self> {
        if max_attempts < 1 {
            return Err(ThrottleError::config("max_attempts must be at least 1"));
        }
        Ok(Self { max_attempts, wait })
    }

    /// Total attempts per item, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Sleep between consecutive attempts.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Number of retries after the initial attempt.
    pub(crate) fn retries(&self) -> usize {
        (self.max_attempts - 1) as usize
    }
}
