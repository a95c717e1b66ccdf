//! Tests for the throttled flow batch executor.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tintoretto_error::BoxError;
use tintoretto_flow::{FlowBatchExecutor, FlowConfig, FlowGraph, ParamBundle, SharedStore};

/// Graph standing in for a multi-node pipeline: reads its instance
/// parameters, touches the shared store, reports concurrency.
struct ProbeGraph {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    hold: Duration,
}

impl ProbeGraph {
    fn new(hold: Duration) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            hold,
        }
    }
}

#[async_trait::async_trait]
impl FlowGraph for ProbeGraph {
    type Output = i64;

    async fn execute(
        &self,
        shared: &SharedStore,
        params: &ParamBundle,
    ) -> Result<i64, BoxError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        let user_id = params
            .get("user_id")
            .and_then(|v| v.as_i64())
            .ok_or("missing user_id")?;
        if params.get("fail").is_some() {
            return Err(format!("instance {user_id} failed").into());
        }

        // Bundle-keyed slot, so parallel instances never contend.
        shared.insert(format!("seen-{user_id}"), user_id);
        Ok(user_id)
    }
}

fn bundles(count: i64) -> Vec<ParamBundle> {
    (0..count)
        .map(|uid| ParamBundle::new().set("user_id", uid))
        .collect()
}

#[tokio::test]
async fn test_flow_concurrency_is_bounded() {
    let executor = FlowBatchExecutor::new(FlowConfig {
        max_concurrent_flows: 3,
        ..FlowConfig::default()
    })
    .unwrap();
    let graph = ProbeGraph::new(Duration::from_millis(30));
    let shared = SharedStore::new();

    let outcomes = executor.run(&graph, bundles(10), &shared).await;

    assert_eq!(outcomes.len(), 10);
    assert_eq!(graph.peak.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_outcomes_follow_bundle_order() {
    let executor = FlowBatchExecutor::new(FlowConfig::default()).unwrap();
    let graph = ProbeGraph::new(Duration::from_millis(5));
    let shared = SharedStore::new();

    let outcomes = executor.run(&graph, bundles(6), &shared).await;

    for (index, outcome) in outcomes.iter().enumerate() {
        assert_eq!(*outcome.as_ref().unwrap(), index as i64);
    }
}

#[tokio::test]
async fn test_instances_share_the_store() {
    let executor = FlowBatchExecutor::new(FlowConfig::default()).unwrap();
    let graph = ProbeGraph::new(Duration::ZERO);
    let shared = SharedStore::new();

    executor.run(&graph, bundles(4), &shared).await;

    assert_eq!(shared.len(), 4);
    assert_eq!(shared.get("seen-2").unwrap(), 2);
}

#[tokio::test]
async fn test_failed_instance_is_isolated() {
    let executor = FlowBatchExecutor::new(FlowConfig::default()).unwrap();
    let graph = ProbeGraph::new(Duration::ZERO);
    let shared = SharedStore::new();

    let mut all = bundles(4);
    all[1] = all[1].clone().set("fail", true);

    let outcomes = executor.run(&graph, all, &shared).await;

    assert!(outcomes[1].is_err());
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 3);

    let stats = executor.stats();
    assert_eq!(stats.completed_flows, 3);
    assert_eq!(stats.failed_flows, 1);
}

#[tokio::test]
async fn test_stats_reset_between_runs() {
    let executor = FlowBatchExecutor::new(FlowConfig::default()).unwrap();
    let graph = ProbeGraph::new(Duration::ZERO);
    let shared = SharedStore::new();

    executor.run(&graph, bundles(5), &shared).await;
    assert_eq!(executor.stats().completed_flows, 5);

    executor.run(&graph, bundles(2), &shared).await;
    assert_eq!(executor.stats().completed_flows, 2);
}

#[tokio::test]
async fn test_ambient_params_merge_under_bundle() {
    struct EchoRegion;

    #[async_trait::async_trait]
    impl FlowGraph for EchoRegion {
        type Output = String;

        async fn execute(
            &self,
            _shared: &SharedStore,
            params: &ParamBundle,
        ) -> Result<String, BoxError> {
            Ok(params
                .get("region")
                .and_then(|v| v.as_str())
                .unwrap_or("unset")
                .to_string())
        }
    }

    let executor = FlowBatchExecutor::new(FlowConfig::default())
        .unwrap()
        .with_params(ParamBundle::new().set("region", "eu"));
    let shared = SharedStore::new();

    let outcomes = executor
        .run(
            &EchoRegion,
            vec![
                ParamBundle::new(),
                ParamBundle::new().set("region", "us"), // bundle wins
            ],
            &shared,
        )
        .await;

    assert_eq!(*outcomes[0].as_ref().unwrap(), "eu");
    assert_eq!(*outcomes[1].as_ref().unwrap(), "us");
}

#[tokio::test]
async fn test_empty_bundles() {
    let executor = FlowBatchExecutor::new(FlowConfig::default()).unwrap();
    let graph = ProbeGraph::new(Duration::ZERO);
    let shared = SharedStore::new();

    let outcomes = executor.run(&graph, Vec::new(), &shared).await;
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn test_flow_window_throttles_starts() {
    let executor = FlowBatchExecutor::new(FlowConfig {
        max_concurrent_flows: 100,
        max_flows_per_window: Some(5),
        window_seconds: 1.0,
    })
    .unwrap();
    let graph = ProbeGraph::new(Duration::ZERO);
    let shared = SharedStore::new();

    let start = std::time::Instant::now();
    let outcomes = executor.run(&graph, bundles(10), &shared).await;

    assert_eq!(outcomes.len(), 10);
    assert!(start.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn test_reset_flow_limiter_clears_window_and_stats() {
    let executor = FlowBatchExecutor::new(FlowConfig {
        max_concurrent_flows: 5,
        max_flows_per_window: Some(100),
        window_seconds: 60.0,
    })
    .unwrap();
    let graph = ProbeGraph::new(Duration::ZERO);
    let shared = SharedStore::new();

    executor.run(&graph, bundles(3), &shared).await;
    assert_eq!(executor.limiter().current_window_count(), 3);

    executor.reset_flow_limiter();
    assert_eq!(executor.limiter().current_window_count(), 0);
    assert_eq!(executor.stats().completed_flows, 0);
}
