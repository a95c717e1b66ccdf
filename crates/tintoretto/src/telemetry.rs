//! Tracing subscriber setup for applications embedding Tintoretto.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! application's call. This module wires the common case.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a human-readable tracing subscriber.
///
/// Respects the `RUST_LOG` environment variable for filtering. Call once at
/// application startup, before spawning batch work.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Initialize a JSON tracing subscriber for structured log collection.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_json() -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer().json();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
