//! Run a multi-step pipeline once per user with flow-level throttling.
//!
//! Each flow instance fetches a profile and then fans out three sub-calls
//! through a node-level throttle, so total concurrency stays at
//! flow cap x node cap.
//!
//! Run with: cargo run --example flow_throttling

use std::time::Duration;
use tintoretto::{
    BoxError, ExecutorConfig, FlowBatchExecutor, FlowConfig, FlowGraph, ParamBundle,
    RateLimitConfig, SharedStore, ThrottledBatchExecutor, telemetry,
};

struct EnrichUser;

#[async_trait::async_trait]
impl FlowGraph for EnrichUser {
    type Output = String;

    async fn execute(
        &self,
        shared: &SharedStore,
        params: &ParamBundle,
    ) -> Result<String, BoxError> {
        let user_id = params
            .get("user_id")
            .and_then(|v| v.as_i64())
            .ok_or("missing user_id")?;

        // Step 1: fetch the profile.
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Step 2: three enrichment sub-calls through a node-level throttle.
        let node_executor = ThrottledBatchExecutor::new(ExecutorConfig {
            limits: RateLimitConfig::new(3),
            ..ExecutorConfig::default()
        })?;
        let fields = node_executor
            .run(vec!["posts", "friends", "likes"], move |field| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(format!("{field}-of-{user_id}"))
            })
            .await;

        let summary = fields
            .into_iter()
            .filter_map(|r| r.ok())
            .collect::<Vec<_>>()
            .join(", ");
        shared.insert(format!("user-{user_id}"), summary.clone());
        Ok(summary)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init()?;

    let flow = FlowBatchExecutor::new(FlowConfig {
        max_concurrent_flows: 4,
        ..FlowConfig::default()
    })?;

    let bundles: Vec<_> = (1..=12)
        .map(|uid| ParamBundle::new().set("user_id", uid))
        .collect();
    let shared = SharedStore::new();

    let outcomes = flow.run(&EnrichUser, bundles, &shared).await;
    for (index, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(summary) => println!("user {}: {summary}", index + 1),
            Err(err) => println!("user {}: failed ({err})", index + 1),
        }
    }
    println!("{:?}", flow.stats());
    Ok(())
}
