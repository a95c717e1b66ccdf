//! Adaptive throttling against a service with a hidden concurrency limit.
//!
//! The executor starts optimistic, gets pushed back by 429-style errors,
//! and settles near the limit the service actually tolerates.
//!
//! Run with: cargo run --example adaptive_backoff

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tintoretto::{
    AdaptiveBatchExecutor, AdaptiveConfig, AdaptiveExecutorConfig, BoxError, RateLimitHit,
    telemetry,
};

// The imaginary service tolerates at most 8 simultaneous calls.
async fn hidden_limit_api(n: u32, in_flight: usize) -> Result<u32, BoxError> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    if in_flight > 8 {
        Err(RateLimitHit::new("HTTP 429 Too Many Requests")
            .with_source("imaginary-api")
            .into())
    } else {
        Ok(n)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init()?;

    let executor = AdaptiveBatchExecutor::new(AdaptiveExecutorConfig {
        adaptive: AdaptiveConfig {
            initial: 16,
            min: 2,
            max: 32,
            ..AdaptiveConfig::default()
        },
        ..AdaptiveExecutorConfig::default()
    })?;

    let in_flight = Arc::new(AtomicUsize::new(0));
    let counter = in_flight.clone();
    let results = executor
        .run((0..40).collect::<Vec<u32>>(), move |n| {
            let in_flight = counter.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                let result = hidden_limit_api(n, now).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                result
            }
        })
        .await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    println!("{succeeded}/{} calls succeeded", results.len());
    println!(
        "settled at {} concurrent, stats: {:?}",
        executor.current_concurrent(),
        executor.stats()
    );
    Ok(())
}
