//! One registered budget shared by two independent executors.
//!
//! Chat and embedding traffic hit the same vendor, so both executors draw
//! from the single "openai" budget instead of each assuming the whole quota.
//!
//! Run with: cargo run --example shared_limiters

use std::time::Duration;
use tintoretto::{
    BoxError, LimiterRegistry, RateLimitConfig, RetryPolicy, ThrottledBatchExecutor, telemetry,
};

async fn call(kind: &str, message: &str) -> Result<String, BoxError> {
    tokio::time::sleep(Duration::from_millis(80)).await;
    Ok(format!("{kind}: {message}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init()?;

    // Registered once at startup; every call site resolves it by name.
    LimiterRegistry::register("openai", RateLimitConfig::with_window(3, 60), false)?;

    let chat = ThrottledBatchExecutor::with_limiter(
        LimiterRegistry::get("openai")?,
        RetryPolicy::default(),
    );
    let embeddings = ThrottledBatchExecutor::with_limiter(
        LimiterRegistry::get("openai")?,
        RetryPolicy::default(),
    );

    let (chats, embeds) = tokio::join!(
        chat.run(vec!["hi", "how are you", "bye"], |m| async move {
            call("chat", m).await
        }),
        embeddings.run(vec!["doc-a", "doc-b", "doc-c"], |m| async move {
            call("embed", m).await
        }),
    );

    // Total in-flight across both executors never exceeded 3.
    println!("chat ok: {}", chats.iter().filter(|r| r.is_ok()).count());
    println!("embed ok: {}", embeds.iter().filter(|r| r.is_ok()).count());
    println!("budget usage: {:?}", LimiterRegistry::stats("openai")?);
    Ok(())
}
