//! Adaptive concurrency control.
//!
//! An [`AdaptiveController`] governs one [`RateLimiter`] and resizes its
//! concurrency cap in response to observed outcomes: multiplicative backoff
//! on rate limit events, gentle multiplicative recovery after sustained
//! success. This suits APIs with unpredictable or undocumented limits, where
//! the optimal concurrency varies by load or time of day.

use crate::{RateLimitConfig, RateLimiter};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tintoretto_error::{RateLimitHit, ThrottleError, ThrottleResult};
use tracing::{debug, warn};

/// Configuration for adaptive concurrency control.
///
/// The controller keeps the effective cap inside `[min, max]`, starting at
/// `initial`. On a rate limit event the cap is multiplied by
/// `backoff_factor`; after `recovery_threshold` consecutive successes it is
/// multiplied by `recovery_factor`. Defaults halve quickly under pressure
/// and recover by 20% every 10 successes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdaptiveConfig {
    /// Starting concurrency level.
    pub initial: u32,
    /// Concurrency floor for backoff.
    pub min: u32,
    /// Concurrency ceiling for recovery.
    pub max: u32,
    /// Multiplier applied on a rate limit event (0 < b < 1).
    pub backoff_factor: f64,
    /// Consecutive successes required before recovery.
    pub recovery_threshold: u32,
    /// Multiplier applied on recovery (r > 1).
    pub recovery_factor: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            initial: 5,
            min: 1,
            max: 20,
            backoff_factor: 0.5,
            recovery_threshold: 10,
            recovery_factor: 1.2,
        }
    }
}

impl AdaptiveConfig {
    /// Check the configuration for constructor use.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the bounds are inverted
    /// (`min <= initial <= max` must hold with `min >= 1`), when
    /// `backoff_factor` is outside `(0, 1)`, when `recovery_factor` is not
    /// greater than 1, or when `recovery_threshold` is zero.
    pub fn validate(&self) -> ThrottleResult<()> {
        if self.min < 1 {
            return Err(ThrottleError::config("min must be at least 1"));
        }
        if !(self.min <= self.initial && self.initial <= self.max) {
            return Err(ThrottleError::config(
                "bounds must satisfy min <= initial <= max",
            ));
        }
        if !(self.backoff_factor > 0.0 && self.backoff_factor < 1.0) {
            return Err(ThrottleError::config(
                "backoff_factor must be between 0 and 1 exclusive",
            ));
        }
        if !(self.recovery_factor > 1.0) {
            return Err(ThrottleError::config("recovery_factor must exceed 1"));
        }
        if self.recovery_threshold < 1 {
            return Err(ThrottleError::config(
                "recovery_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Snapshot of adaptive throttling statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdaptiveStats {
    /// Current adaptive concurrency level.
    pub current_concurrent: u32,
    /// Total successful outcomes observed.
    pub total_successes: u64,
    /// Total rate limit events observed.
    pub total_rate_limits: u64,
    /// Successes since the last rate limit or recovery step.
    pub consecutive_successes: u64,
}

#[derive(Debug)]
struct AdaptiveState {
    current: u32,
    consecutive_successes: u64,
    total_successes: u64,
    total_rate_limits: u64,
}

/// AIMD controller resizing a rate limiter's concurrency cap.
///
/// The controller owns the limiter it governs; executors acquire from
/// [`limiter`](Self::limiter) and report outcomes through
/// [`on_success`](Self::on_success) and [`on_rate_limit`](Self::on_rate_limit).
/// Resizes swap the limiter's semaphore for future acquirers; permits already
/// out stay valid and release against the instance they came from.
///
/// # Example
///
/// ```
/// use tintoretto_rate_limit::{AdaptiveConfig, AdaptiveController};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let controller = AdaptiveController::new(AdaptiveConfig {
///     initial: 10,
///     min: 2,
///     max: 50,
///     ..AdaptiveConfig::default()
/// })?;
///
/// controller.on_rate_limit(None);
/// assert_eq!(controller.current(), 5); // halved
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AdaptiveController {
    config: AdaptiveConfig,
    limiter: Arc<RateLimiter>,
    state: Mutex<AdaptiveState>,
}

impl AdaptiveController {
    /// Create a controller governing a concurrency-only limiter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: AdaptiveConfig) -> ThrottleResult<Self> {
        Self::with_limits(config, RateLimitConfig::new(config.initial))
    }

    /// Create a controller whose limiter also enforces a throughput cap.
    ///
    /// The `limits.max_concurrent` value is superseded by `config.initial`;
    /// window settings are taken as given.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either record fails validation.
    pub fn with_limits(config: AdaptiveConfig, limits: RateLimitConfig) -> ThrottleResult<Self> {
        config.validate()?;
        let limiter = RateLimiter::new(RateLimitConfig {
            max_concurrent: config.initial,
            ..limits
        })?;
        Ok(Self {
            config,
            limiter: Arc::new(limiter),
            state: Mutex::new(AdaptiveState {
                current: config.initial,
                consecutive_successes: 0,
                total_successes: 0,
                total_rate_limits: 0,
            }),
        })
    }

    /// The limiter governed by this controller.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    /// The controller's configuration.
    pub fn config(&self) -> AdaptiveConfig {
        self.config
    }

    /// Record a rate limit event, backing off the concurrency cap.
    ///
    /// The cap is multiplied by `backoff_factor` (floored, bounded below by
    /// `min`) and the success streak is cleared. An optional [`RateLimitHit`]
    /// supplies hints for the log line.
    pub fn on_rate_limit(&self, hint: Option<&RateLimitHit>) {
        let mut state = self.state.lock().expect("adaptive lock poisoned");
        let old = state.current;
        state.current = (((state.current as f64) * self.config.backoff_factor).floor() as u32)
            .max(self.config.min);
        state.consecutive_successes = 0;
        state.total_rate_limits += 1;

        warn!(
            from = old,
            to = state.current,
            retry_after = hint
                .and_then(|h| h.retry_after())
                .map(|d| d.as_secs_f64()),
            source = hint.and_then(|h| h.source()),
            "rate limit hit, backing off"
        );

        if state.current != old {
            self.resize_to(state.current);
        }
    }

    /// Record a successful outcome, recovering after a sustained streak.
    ///
    /// After `recovery_threshold` consecutive successes the cap is multiplied
    /// by `recovery_factor` (floored, bounded above by `max`) and the streak
    /// restarts.
    pub fn on_success(&self) {
        let mut state = self.state.lock().expect("adaptive lock poisoned");
        state.consecutive_successes += 1;
        state.total_successes += 1;

        if state.consecutive_successes >= self.config.recovery_threshold as u64 {
            let old = state.current;
            state.current = (((state.current as f64) * self.config.recovery_factor).floor()
                as u32)
                .min(self.config.max);
            state.consecutive_successes = 0;

            if state.current != old {
                debug!(from = old, to = state.current, "sustained success, recovering");
                self.resize_to(state.current);
            }
        }
    }

    /// Current adaptive concurrency level.
    pub fn current(&self) -> u32 {
        self.state.lock().expect("adaptive lock poisoned").current
    }

    /// Snapshot of the adaptive statistics.
    pub fn stats(&self) -> AdaptiveStats {
        let state = self.state.lock().expect("adaptive lock poisoned");
        AdaptiveStats {
            current_concurrent: state.current,
            total_successes: state.total_successes,
            total_rate_limits: state.total_rate_limits,
            consecutive_successes: state.consecutive_successes,
        }
    }

    /// Reset all adaptive state.
    ///
    /// Restores the concurrency cap to `initial` and clears every counter,
    /// leaving the controller indistinguishable from a fresh one.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("adaptive lock poisoned");
        state.current = self.config.initial;
        state.consecutive_successes = 0;
        state.total_successes = 0;
        state.total_rate_limits = 0;
        self.resize_to(state.current);
    }

    // Bounds guarantee the new capacity is at least config.min >= 1.
    fn resize_to(&self, capacity: u32) {
        self.limiter
            .resize(capacity as usize)
            .expect("adaptive capacity stays within [min, max]");
    }
}
