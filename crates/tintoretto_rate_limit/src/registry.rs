//! Process-wide registry of shared rate limiters.
//!
//! Use when multiple executors or flows need to respect the same global
//! budget, e.g. all hitting the same API endpoint from different call sites.

use crate::{Preset, RateLimitConfig, RateLimiter, ThrottleConfig};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use tintoretto_error::{ThrottleError, ThrottleResult};
use tracing::{debug, instrument};

static LIMITERS: LazyLock<Mutex<HashMap<String, Arc<RateLimiter>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Usage statistics for a registered limiter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LimiterStats {
    /// Maximum simultaneous operations.
    pub max_concurrent: usize,
    /// Maximum operations per window (`None` = unlimited).
    pub max_per_window: Option<usize>,
    /// Window duration in seconds.
    pub window_seconds: f64,
    /// Acquisitions inside the current sliding window.
    pub current_window_count: usize,
}

/// Registry for shared rate limiters.
///
/// The registry is a process-wide named map. Register limiters during
/// application startup from a single controller task; after startup,
/// mutation is permitted but must stay serialized by the caller. Reads are
/// safe concurrently, and the [`RateLimiter`] instances themselves are
/// async-safe.
///
/// # Example
///
/// ```
/// use tintoretto_rate_limit::{LimiterRegistry, RateLimitConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Register the shared budget at startup.
/// LimiterRegistry::register("openai-gpt4", RateLimitConfig::with_window(10, 60), false)?;
///
/// // Any call site can then draw from the same budget.
/// let limiter = LimiterRegistry::get("openai-gpt4")?;
/// let _guard = limiter.acquire().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LimiterRegistry;

impl LimiterRegistry {
    /// Register a named shared limiter.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the name is taken and `replace` is false,
    /// or a configuration error if `config` is invalid.
    #[instrument(skip(config))]
    pub fn register(
        name: &str,
        config: RateLimitConfig,
        replace: bool,
    ) -> ThrottleResult<Arc<RateLimiter>> {
        let limiter = Arc::new(RateLimiter::new(config)?);
        let mut map = LIMITERS.lock().expect("registry lock poisoned");
        if map.contains_key(name) && !replace {
            return Err(ThrottleError::already_exists(format!(
                "limiter '{name}' already exists; pass replace to override"
            )));
        }
        debug!(max_concurrent = config.max_concurrent, "registering limiter");
        map.insert(name.to_string(), limiter.clone());
        Ok(limiter)
    }

    /// Register a named limiter from a preset configuration.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the name is taken and `replace` is false.
    pub fn register_preset(
        name: &str,
        preset: Preset,
        replace: bool,
    ) -> ThrottleResult<Arc<RateLimiter>> {
        Self::register(name, preset.config(), replace)
    }

    /// Register every limiter named in a loaded [`ThrottleConfig`].
    ///
    /// Existing entries win; configured entries that collide with an already
    /// registered name are skipped. Intended for the startup path right
    /// after [`ThrottleConfig::load`].
    #[instrument(skip(config))]
    pub fn register_from_config(config: &ThrottleConfig) -> ThrottleResult<()> {
        for (name, limiter_config) in &config.limiters {
            Self::get_or_create(name, *limiter_config)?;
        }
        Ok(())
    }

    /// Get a registered limiter by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no limiter is registered under `name`.
    pub fn get(name: &str) -> ThrottleResult<Arc<RateLimiter>> {
        let map = LIMITERS.lock().expect("registry lock poisoned");
        map.get(name).cloned().ok_or_else(|| {
            ThrottleError::not_found(format!(
                "limiter '{name}' not found; register it first or use get_or_create"
            ))
        })
    }

    /// Get an existing limiter or create one if absent.
    ///
    /// If the limiter already exists, the provided configuration is ignored
    /// and the existing limiter is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a new limiter must be created and
    /// `config` is invalid.
    pub fn get_or_create(name: &str, config: RateLimitConfig) -> ThrottleResult<Arc<RateLimiter>> {
        let mut map = LIMITERS.lock().expect("registry lock poisoned");
        if let Some(existing) = map.get(name) {
            return Ok(existing.clone());
        }
        let limiter = Arc::new(RateLimiter::new(config)?);
        map.insert(name.to_string(), limiter.clone());
        Ok(limiter)
    }

    /// Remove a limiter from the registry.
    ///
    /// Returns true if removed, false if not found. Call sites still holding
    /// the `Arc` keep using the limiter; it simply stops being shared.
    pub fn remove(name: &str) -> bool {
        LIMITERS
            .lock()
            .expect("registry lock poisoned")
            .remove(name)
            .is_some()
    }

    /// Reset one or all limiters.
    ///
    /// With a name, removes that specific limiter; with `None`, clears the
    /// entire registry.
    pub fn reset(name: Option<&str>) {
        let mut map = LIMITERS.lock().expect("registry lock poisoned");
        match name {
            Some(name) => {
                map.remove(name);
            }
            None => map.clear(),
        }
    }

    /// Check whether a limiter is registered.
    pub fn exists(name: &str) -> bool {
        LIMITERS
            .lock()
            .expect("registry lock poisoned")
            .contains_key(name)
    }

    /// Names of all registered limiters.
    pub fn list_names() -> Vec<String> {
        LIMITERS
            .lock()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// All registered limiters with their current configurations.
    pub fn list_all() -> HashMap<String, RateLimitConfig> {
        LIMITERS
            .lock()
            .expect("registry lock poisoned")
            .iter()
            .map(|(name, limiter)| (name.clone(), limiter.config()))
            .collect()
    }

    /// Current usage statistics for a registered limiter.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no limiter is registered under `name`.
    pub fn stats(name: &str) -> ThrottleResult<LimiterStats> {
        let limiter = Self::get(name)?;
        Ok(LimiterStats {
            max_concurrent: limiter.max_concurrent(),
            max_per_window: limiter.max_per_window(),
            window_seconds: limiter.window().as_secs_f64(),
            current_window_count: limiter.current_window_count(),
        })
    }
}
