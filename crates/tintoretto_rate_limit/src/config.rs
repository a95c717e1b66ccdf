//! Configuration records for rate limiting.
//!
//! This module provides the typed [`RateLimitConfig`] record consumed by every
//! limiter constructor, and TOML-based loading of named limiter configurations.
//! The configuration system supports:
//! - Bundled defaults (include_str! from tintoretto.toml)
//! - User overrides (./tintoretto.toml or ~/.config/tintoretto/tintoretto.toml)
//! - Automatic merging with user values taking precedence

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tintoretto_error::{ThrottleError, ThrottleResult};
use tracing::{debug, instrument};

fn default_max_concurrent() -> u32 {
    5
}

fn default_window_seconds() -> f64 {
    60.0
}

/// Rate limit configuration for a single limiter.
///
/// Two complementary caps are expressed here:
/// - `max_concurrent` bounds simultaneous in-flight operations
/// - `max_per_window` bounds completed acquisitions inside any trailing
///   window of `window_seconds` (`None` = unlimited throughput)
///
/// # Example
///
/// ```
/// use tintoretto_rate_limit::RateLimitConfig;
///
/// // OpenAI tier-1 shaped limits: 5 concurrent, 60 requests per minute.
/// let config = RateLimitConfig::with_window(5, 60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Maximum simultaneous operations.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,

    /// Maximum operations per time window (`None` = unlimited).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_window: Option<u32>,

    /// Time window duration in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            max_per_window: None,
            window_seconds: default_window_seconds(),
        }
    }
}

impl RateLimitConfig {
    /// Concurrency-only configuration with the default 60 second window.
    pub fn new(max_concurrent: u32) -> Self {
        Self {
            max_concurrent,
            ..Self::default()
        }
    }

    /// Concurrency plus per-minute throughput configuration.
    pub fn with_window(max_concurrent: u32, max_per_window: u32) -> Self {
        Self {
            max_concurrent,
            max_per_window: Some(max_per_window),
            window_seconds: default_window_seconds(),
        }
    }

    /// Override the window duration, in seconds.
    pub fn window_seconds(mut self, window_seconds: f64) -> Self {
        self.window_seconds = window_seconds;
        self
    }

    /// Window duration as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs_f64(self.window_seconds)
    }

    /// Check the configuration for constructor use.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `max_concurrent` is zero, when
    /// `max_per_window` is `Some(0)`, or when `window_seconds` is not a
    /// positive finite number.
    pub fn validate(&self) -> ThrottleResult<()> {
        if self.max_concurrent < 1 {
            return Err(ThrottleError::config("max_concurrent must be at least 1"));
        }
        if let Some(per_window) = self.max_per_window
            && per_window < 1
        {
            return Err(ThrottleError::config(
                "max_per_window must be at least 1 or unset",
            ));
        }
        if !(self.window_seconds.is_finite() && self.window_seconds > 0.0) {
            return Err(ThrottleError::config("window_seconds must be positive"));
        }
        Ok(())
    }
}

/// Named limiter configurations loaded from TOML.
///
/// Loads limiter definitions with a precedence system:
/// 1. Bundled defaults (include_str! from tintoretto.toml)
/// 2. User override (./tintoretto.toml or ~/.config/tintoretto/tintoretto.toml)
///
/// # Example
///
/// ```no_run
/// use tintoretto_rate_limit::ThrottleConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ThrottleConfig::load()?;
/// let openai = config.get("openai").unwrap();
/// println!("OpenAI budget: {} concurrent", openai.max_concurrent);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ThrottleConfig {
    /// Map of limiter name to rate limit configuration.
    #[serde(default)]
    pub limiters: HashMap<String, RateLimitConfig>,
}

impl ThrottleConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any
    /// limiter entry fails validation.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ThrottleResult<Self> {
        debug!("Loading limiter configuration from file");

        let parsed: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ThrottleError::config(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ThrottleError::config(format!("Failed to parse configuration: {}", e)))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override
    /// earlier):
    /// 1. Bundled defaults (tintoretto.toml shipped with the library)
    /// 2. User config in home directory (~/.config/tintoretto/tintoretto.toml)
    /// 3. User config in current directory (./tintoretto.toml)
    ///
    /// User config files are optional and will be silently skipped if absent.
    #[instrument]
    pub fn load() -> ThrottleResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../tintoretto.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tintoretto/tintoretto.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("tintoretto").required(false));

        let parsed: Self = builder
            .build()
            .map_err(|e| ThrottleError::config(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ThrottleError::config(format!("Failed to parse configuration: {}", e)))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Get the configuration registered under `name`.
    pub fn get(&self, name: &str) -> Option<&RateLimitConfig> {
        self.limiters.get(name)
    }

    /// Names of all configured limiters.
    pub fn names(&self) -> Vec<String> {
        self.limiters.keys().cloned().collect()
    }

    fn validate(&self) -> ThrottleResult<()> {
        for (name, limiter) in &self.limiters {
            limiter
                .validate()
                .map_err(|e| ThrottleError::config(format!("limiter '{}': {}", name, e.kind())))?;
        }
        Ok(())
    }
}
