//! Tests for the adaptive flow executor.

use tintoretto_error::{BoxError, RateLimitHit};
use tintoretto_flow::{
    AdaptiveFlowConfig, AdaptiveFlowExecutor, FlowGraph, ParamBundle, SharedStore,
};
use tintoretto_rate_limit::AdaptiveConfig;

/// Graph that throttles or succeeds according to its instance parameters.
struct Flaky;

#[async_trait::async_trait]
impl FlowGraph for Flaky {
    type Output = i64;

    async fn execute(
        &self,
        _shared: &SharedStore,
        params: &ParamBundle,
    ) -> Result<i64, BoxError> {
        if params.get("throttle").is_some() {
            return Err(RateLimitHit::new("flow instance was throttled")
                .with_source("upstream")
                .into());
        }
        if params.get("break").is_some() {
            return Err("unrelated failure".into());
        }
        Ok(params.get("user_id").and_then(|v| v.as_i64()).unwrap_or(0))
    }
}

fn adaptive_flow() -> AdaptiveFlowExecutor {
    AdaptiveFlowExecutor::new(AdaptiveFlowConfig {
        adaptive: AdaptiveConfig {
            initial: 8,
            min: 2,
            max: 32,
            backoff_factor: 0.5,
            recovery_threshold: 4,
            recovery_factor: 2.0,
        },
        ..AdaptiveFlowConfig::default()
    })
    .unwrap()
}

fn ok_bundles(count: i64) -> Vec<ParamBundle> {
    (0..count)
        .map(|uid| ParamBundle::new().set("user_id", uid))
        .collect()
}

#[tokio::test]
async fn test_clean_instances_keep_cap() {
    let executor = adaptive_flow();
    let shared = SharedStore::new();

    let outcomes = executor.run(&Flaky, ok_bundles(3), &shared).await;

    assert!(outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(executor.current_concurrent_flows(), 8);

    let stats = executor.stats();
    assert_eq!(stats.completed_flows, 3);
    assert_eq!(stats.total_successes, 3);
}

#[tokio::test]
async fn test_throttled_instance_backs_off() {
    let executor = adaptive_flow();
    let shared = SharedStore::new();

    let outcomes = executor
        .run(
            &Flaky,
            vec![ParamBundle::new().set("throttle", true)],
            &shared,
        )
        .await;

    assert!(outcomes[0].is_err());
    assert_eq!(executor.current_concurrent_flows(), 4);

    let stats = executor.stats();
    assert_eq!(stats.failed_flows, 1);
    assert_eq!(stats.total_rate_limits, 1);
}

#[tokio::test]
async fn test_plain_failure_does_not_back_off() {
    let executor = adaptive_flow();
    let shared = SharedStore::new();

    let outcomes = executor
        .run(&Flaky, vec![ParamBundle::new().set("break", true)], &shared)
        .await;

    assert!(outcomes[0].is_err());
    assert_eq!(executor.current_concurrent_flows(), 8);

    let stats = executor.stats();
    assert_eq!(stats.failed_flows, 1);
    assert_eq!(stats.total_rate_limits, 0);
}

#[tokio::test]
async fn test_recovery_after_sustained_success() {
    let executor = adaptive_flow();
    let shared = SharedStore::new();

    // Two throttled instances: 8 -> 4 -> 2.
    for _ in 0..2 {
        executor
            .run(
                &Flaky,
                vec![ParamBundle::new().set("throttle", true)],
                &shared,
            )
            .await;
    }
    assert_eq!(executor.current_concurrent_flows(), 2);

    // Four clean instances trigger one recovery step: floor(2 * 2.0) = 4.
    executor.run(&Flaky, ok_bundles(4), &shared).await;
    assert_eq!(executor.current_concurrent_flows(), 4);
}

#[tokio::test]
async fn test_limiter_tracks_cap() {
    let executor = adaptive_flow();
    let shared = SharedStore::new();

    executor
        .run(
            &Flaky,
            vec![ParamBundle::new().set("throttle", true)],
            &shared,
        )
        .await;

    assert_eq!(executor.limiter().max_concurrent(), 4);
}

#[tokio::test]
async fn test_reset_adaptive_state() {
    let executor = adaptive_flow();
    let shared = SharedStore::new();

    executor
        .run(
            &Flaky,
            vec![ParamBundle::new().set("throttle", true)],
            &shared,
        )
        .await;
    assert_eq!(executor.current_concurrent_flows(), 4);

    executor.reset_adaptive_state();

    let stats = executor.stats();
    assert_eq!(stats.current_concurrent_flows, 8);
    assert_eq!(stats.total_rate_limits, 0);
    assert_eq!(stats.completed_flows, 0);
    assert_eq!(stats.failed_flows, 0);
    assert_eq!(executor.limiter().max_concurrent(), 8);
}

#[tokio::test]
async fn test_ambient_params_reach_instances() {
    struct NeedsToken;

    #[async_trait::async_trait]
    impl FlowGraph for NeedsToken {
        type Output = String;

        async fn execute(
            &self,
            _shared: &SharedStore,
            params: &ParamBundle,
        ) -> Result<String, BoxError> {
            params
                .get("token")
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| "missing token".into())
        }
    }

    let executor = adaptive_flow().with_params(ParamBundle::new().set("token", "abc"));
    let shared = SharedStore::new();

    let outcomes = executor
        .run(&NeedsToken, vec![ParamBundle::new()], &shared)
        .await;
    assert_eq!(*outcomes[0].as_ref().unwrap(), "abc");
}
