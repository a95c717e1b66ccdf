//! Dual-mode rate limiter built on a Tokio semaphore and a sliding window.
//!
//! Two complementary throttling mechanisms are enforced per acquisition:
//! 1. **Concurrency limiting** (semaphore): max simultaneous operations
//! 2. **Throughput limiting** (sliding window): max operations per time window
//!
//! The sliding window tracks individual acquisition timestamps rather than
//! fixed time buckets, which prevents burst behavior at window boundaries.

use crate::RateLimitConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tintoretto_error::{ThrottleError, ThrottleResult};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

// Keeps boundary-sized sleeps from waking a hair too early and spinning.
const WINDOW_EPSILON: Duration = Duration::from_millis(1);

/// Dual-mode rate limiter for async operations.
///
/// # Example
///
/// ```
/// use tintoretto_rate_limit::{RateLimitConfig, RateLimiter};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = Arc::new(RateLimiter::new(RateLimitConfig::with_window(5, 60))?);
///
/// let handles: Vec<_> = (0..20)
///     .map(|i| {
///         let limiter = limiter.clone();
///         tokio::spawn(async move {
///             let _guard = limiter.acquire().await;
///             // at most 5 tasks run this section at once,
///             // at most 60 reach it per minute
///             i
///         })
///     })
///     .collect();
/// # for h in handles { h.await?; }
/// # Ok(())
/// # }
/// ```
pub struct RateLimiter {
    // Current semaphore and its capacity. Resizing swaps the Arc; guards
    // holding permits from the old instance drain against the old instance.
    semaphore: Mutex<(Arc<Semaphore>, usize)>,
    max_per_window: Option<usize>,
    window: Duration,
    // Monotonic acquisition timestamps, oldest first. Never held across await.
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a rate limiter from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `max_concurrent` is zero, when
    /// `max_per_window` is `Some(0)`, or when `window_seconds` is not a
    /// positive finite number.
    pub fn new(config: RateLimitConfig) -> ThrottleResult<Self> {
        config.validate()?;
        let capacity = config.max_concurrent as usize;
        Ok(Self {
            semaphore: Mutex::new((Arc::new(Semaphore::new(capacity)), capacity)),
            max_per_window: config.max_per_window.map(|n| n as usize),
            window: config.window(),
            timestamps: Mutex::new(VecDeque::new()),
        })
    }

    /// Acquire permission to proceed, waiting if rate limited.
    ///
    /// Suspends until both conditions hold:
    /// 1. A semaphore slot is available (concurrency limit)
    /// 2. The sliding window has capacity (throughput limit)
    ///
    /// The returned guard releases the concurrency slot when dropped, on
    /// every exit path including errors and cancellation. If the future is
    /// dropped while waiting on the window, the already-held slot is released
    /// and no timestamp is recorded.
    pub async fn acquire(&self) -> RateLimiterGuard {
        // First gate: concurrency. The guard binds the exact semaphore
        // instance acquired from, so releases survive a later resize.
        let semaphore = self.current_semaphore();
        let permit = semaphore
            .acquire_owned()
            .await
            .expect("Semaphore should not be closed");

        // Second gate: throughput. The window path records the timestamp
        // under its own lock once a slot is free.
        if self.max_per_window.is_some() {
            self.wait_for_window().await;
        } else {
            self.record_acquisition();
        }

        RateLimiterGuard { _permit: permit }
    }

    /// Try to acquire without waiting.
    ///
    /// Returns `None` if either the concurrency cap or the sliding window
    /// would block.
    pub fn try_acquire(&self) -> Option<RateLimiterGuard> {
        let semaphore = self.current_semaphore();
        let permit = semaphore.try_acquire_owned().ok()?;

        if let Some(cap) = self.max_per_window {
            let mut stamps = self.timestamps.lock().expect("timestamp lock poisoned");
            Self::prune(&mut stamps, self.window);
            if stamps.len() >= cap {
                // Dropping the permit returns the slot.
                return None;
            }
            stamps.push_back(Instant::now());
        } else {
            self.record_acquisition();
        }

        Some(RateLimiterGuard { _permit: permit })
    }

    // Sleeps until the trailing window has room, sized off the oldest entry.
    // The timestamp lock is released while sleeping; after waking we re-prune
    // and re-check, since other waiters may have claimed the slot first.
    async fn wait_for_window(&self) {
        let cap = match self.max_per_window {
            Some(cap) => cap,
            None => return,
        };
        loop {
            let wait = {
                let mut stamps = self.timestamps.lock().expect("timestamp lock poisoned");
                let now = Instant::now();
                Self::prune_at(&mut stamps, self.window, now);
                if stamps.len() < cap {
                    stamps.push_back(now);
                    return;
                }
                let oldest = stamps[0];
                self.window.saturating_sub(now.duration_since(oldest)) + WINDOW_EPSILON
            };
            debug!(wait_ms = wait.as_millis() as u64, "window full, waiting");
            tokio::time::sleep(wait).await;
        }
    }

    // Appends an acquisition timestamp, pruning expired entries so the
    // queue stays bounded even without a throughput cap.
    fn record_acquisition(&self) {
        let mut stamps = self.timestamps.lock().expect("timestamp lock poisoned");
        Self::prune(&mut stamps, self.window);
        stamps.push_back(Instant::now());
    }

    fn prune(stamps: &mut VecDeque<Instant>, window: Duration) {
        Self::prune_at(stamps, window, Instant::now());
    }

    fn prune_at(stamps: &mut VecDeque<Instant>, window: Duration, now: Instant) {
        while stamps
            .front()
            .is_some_and(|t| now.duration_since(*t) > window)
        {
            stamps.pop_front();
        }
    }

    fn current_semaphore(&self) -> Arc<Semaphore> {
        self.semaphore.lock().expect("semaphore lock poisoned").0.clone()
    }

    /// Replace the concurrency cap for future acquisitions.
    ///
    /// Swaps in a fresh semaphore of the new capacity. Permits outstanding on
    /// the old semaphore remain outstanding and release against the old
    /// instance when their guards drop; new acquirers see the new cap.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `max_concurrent` is zero.
    pub fn resize(&self, max_concurrent: usize) -> ThrottleResult<()> {
        if max_concurrent < 1 {
            return Err(ThrottleError::config("max_concurrent must be at least 1"));
        }
        let mut slot = self.semaphore.lock().expect("semaphore lock poisoned");
        if slot.1 != max_concurrent {
            debug!(from = slot.1, to = max_concurrent, "resizing concurrency cap");
            slot.0 = Arc::new(Semaphore::new(max_concurrent));
            slot.1 = max_concurrent;
        }
        Ok(())
    }

    /// Maximum simultaneous operations currently allowed.
    pub fn max_concurrent(&self) -> usize {
        self.semaphore.lock().expect("semaphore lock poisoned").1
    }

    /// Maximum operations per time window (`None` = unlimited).
    pub fn max_per_window(&self) -> Option<usize> {
        self.max_per_window
    }

    /// Time window duration.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of acquisitions in the current sliding window.
    pub fn current_window_count(&self) -> usize {
        let mut stamps = self.timestamps.lock().expect("timestamp lock poisoned");
        Self::prune(&mut stamps, self.window);
        stamps.len()
    }

    /// Reset the rate limiter state.
    ///
    /// Clears the sliding window timestamps. Does not revoke permits held by
    /// in-flight callers.
    pub fn reset(&self) {
        self.timestamps
            .lock()
            .expect("timestamp lock poisoned")
            .clear();
    }

    /// The limiter's current configuration, suitable for export.
    pub fn config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_concurrent: self.max_concurrent() as u32,
            max_per_window: self.max_per_window.map(|n| n as u32),
            window_seconds: self.window.as_secs_f64(),
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_concurrent", &self.max_concurrent())
            .field("max_per_window", &self.max_per_window)
            .field("window", &self.window)
            .finish()
    }
}

/// RAII guard for an acquired rate limiter slot.
///
/// Automatically releases the concurrent request slot when dropped. This
/// ensures that even if the protected operation fails or is cancelled, the
/// slot is properly returned to the semaphore it was acquired from.
pub struct RateLimiterGuard {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiterGuard {
    /// Release the slot explicitly. Equivalent to dropping the guard.
    pub fn release(self) {}
}

impl std::fmt::Debug for RateLimiterGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterGuard").finish()
    }
}
