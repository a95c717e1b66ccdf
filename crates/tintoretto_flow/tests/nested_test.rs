//! Nested throttling: flow-level cap multiplied by node-level cap.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tintoretto_error::BoxError;
use tintoretto_executor::{ExecutorConfig, ThrottledBatchExecutor};
use tintoretto_flow::{FlowBatchExecutor, FlowConfig, FlowGraph, ParamBundle, SharedStore};
use tintoretto_rate_limit::RateLimitConfig;

async fn counted_sub_call(active: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) {
    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
    peak.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(15)).await;
    active.fetch_sub(1, Ordering::SeqCst);
}

/// Graph whose single node fans sub-calls out through a throttled executor
/// owned by the instance, the way a scrape-then-summarize pipeline would.
struct PerInstanceFanOut {
    node_cap: u32,
    sub_calls: u32,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl FlowGraph for PerInstanceFanOut {
    type Output = u32;

    async fn execute(
        &self,
        _shared: &SharedStore,
        _params: &ParamBundle,
    ) -> Result<u32, BoxError> {
        // Each instance throttles its own fan-out.
        let executor = ThrottledBatchExecutor::new(ExecutorConfig {
            limits: RateLimitConfig::new(self.node_cap),
            ..ExecutorConfig::default()
        })?;

        let active = self.active.clone();
        let peak = self.peak.clone();
        let results = executor
            .run((0..self.sub_calls).collect(), move |_| {
                let active = active.clone();
                let peak = peak.clone();
                async move {
                    counted_sub_call(active, peak).await;
                    Ok(1u32)
                }
            })
            .await;
        Ok(results.into_iter().filter_map(|r| r.ok()).sum())
    }
}

#[tokio::test]
async fn test_total_in_flight_is_product_of_caps() {
    let flow_cap = 3u32;
    let node_cap = 2u32;

    let graph = PerInstanceFanOut {
        node_cap,
        sub_calls: 4,
        active: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    };

    let flow_executor = FlowBatchExecutor::new(FlowConfig {
        max_concurrent_flows: flow_cap,
        ..FlowConfig::default()
    })
    .unwrap();

    let bundles: Vec<_> = (0..12).map(|_| ParamBundle::new()).collect();
    let shared = SharedStore::new();
    let outcomes = flow_executor.run(&graph, bundles, &shared).await;

    // Every instance completed all of its sub-calls.
    assert_eq!(outcomes.len(), 12);
    for outcome in &outcomes {
        assert_eq!(*outcome.as_ref().unwrap(), 4);
    }

    // Sub-calls in flight never exceed flow cap x node cap.
    let observed = graph.peak.load(Ordering::SeqCst);
    assert!(
        observed <= (flow_cap * node_cap) as usize,
        "observed {observed} concurrent sub-calls"
    );
    // And the layers actually overlapped rather than serializing.
    assert!(observed > node_cap as usize);
}

/// Contrast case: when the node executor is shared across instances, its cap
/// is a global bound, so the shared budget wins over the product.
struct SharedFanOut {
    executor: ThrottledBatchExecutor,
    sub_calls: u32,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl FlowGraph for SharedFanOut {
    type Output = u32;

    async fn execute(
        &self,
        _shared: &SharedStore,
        _params: &ParamBundle,
    ) -> Result<u32, BoxError> {
        let active = self.active.clone();
        let peak = self.peak.clone();
        let results = self
            .executor
            .run((0..self.sub_calls).collect(), move |_| {
                let active = active.clone();
                let peak = peak.clone();
                async move {
                    counted_sub_call(active, peak).await;
                    Ok(1u32)
                }
            })
            .await;
        Ok(results.into_iter().filter_map(|r| r.ok()).sum())
    }
}

#[tokio::test]
async fn test_shared_node_limiter_caps_below_product() {
    let graph = SharedFanOut {
        executor: ThrottledBatchExecutor::new(ExecutorConfig {
            limits: RateLimitConfig::new(2),
            ..ExecutorConfig::default()
        })
        .unwrap(),
        sub_calls: 3,
        active: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    };

    let flow_executor = FlowBatchExecutor::new(FlowConfig {
        max_concurrent_flows: 4,
        ..FlowConfig::default()
    })
    .unwrap();

    let bundles: Vec<_> = (0..8).map(|_| ParamBundle::new()).collect();
    let shared = SharedStore::new();
    flow_executor.run(&graph, bundles, &shared).await;

    assert!(graph.peak.load(Ordering::SeqCst) <= 2);
}
