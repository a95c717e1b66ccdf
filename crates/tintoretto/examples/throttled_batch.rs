//! Throttled LLM-style batch: a pile of prompts through tier-1 limits.
//!
//! Run with: cargo run --example throttled_batch

use std::time::{Duration, Instant};
use tintoretto::{BoxError, ExecutorConfig, Preset, RetryPolicy, ThrottledBatchExecutor, telemetry};

async fn fake_llm(prompt: &str) -> Result<String, BoxError> {
    // Stands in for an SDK call; the limiter does not care what happens here.
    tokio::time::sleep(Duration::from_millis(120)).await;
    Ok(format!("summary of '{prompt}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init()?;

    let executor = ThrottledBatchExecutor::new(ExecutorConfig {
        limits: Preset::get("openai_tier1")?.config(),
        retry: RetryPolicy::new(2, Duration::from_secs(1))?,
    })?;

    let prompts: Vec<String> = (1..=8).map(|n| format!("Summarize article #{n}")).collect();

    let start = Instant::now();
    let results = executor
        .run(prompts, |prompt| async move { fake_llm(&prompt).await })
        .await;

    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(answer) => println!("[{index}] {answer}"),
            Err(err) => println!("[{index}] failed: {err}"),
        }
    }
    println!(
        "completed {} prompts in {:?} without tripping the quota",
        results.len(),
        start.elapsed()
    );
    Ok(())
}
