//! Tests for the batch node adapter drivers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tintoretto_error::{BoxError, RateLimitHit};
use tintoretto_executor::{AdaptiveExecutorConfig, ExecutorConfig};
use tintoretto_flow::{
    AdaptiveBatchNode, BatchNode, SharedStore, ThrottledBatchNode,
};
use tintoretto_rate_limit::{AdaptiveConfig, RateLimitConfig};

/// Node shaped like a translation step: texts in the store, results back.
struct Shout {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Shout {
    fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl BatchNode for Shout {
    type Item = String;
    type Output = String;

    async fn prep(&self, shared: &SharedStore) -> Result<Vec<String>, BoxError> {
        let texts = shared.get("texts").ok_or("missing texts")?;
        Ok(texts
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn exec(&self, text: String) -> Result<String, BoxError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        if text == "poison" {
            return Err("cannot shout poison".into());
        }
        Ok(text.to_uppercase())
    }

    async fn post(
        &self,
        shared: &SharedStore,
        results: &[Result<String, BoxError>],
    ) -> Result<(), BoxError> {
        let ok: Vec<_> = results.iter().filter_map(|r| r.as_deref().ok()).collect();
        shared.insert("shouted", serde_json::json!(ok));
        Ok(())
    }
}

fn store_with_texts(texts: &[&str]) -> SharedStore {
    let shared = SharedStore::new();
    shared.insert("texts", serde_json::json!(texts));
    shared
}

#[tokio::test]
async fn test_node_lifecycle_runs_prep_exec_post() {
    let node = ThrottledBatchNode::new(
        Shout::new(),
        ExecutorConfig {
            limits: RateLimitConfig::new(2),
            ..ExecutorConfig::default()
        },
    )
    .unwrap();

    let shared = store_with_texts(&["hello", "world"]);
    let results = node.run(&shared).await.unwrap();

    assert_eq!(*results[0].as_ref().unwrap(), "HELLO");
    assert_eq!(*results[1].as_ref().unwrap(), "WORLD");
    // post ran and wrote its summary back to the store.
    assert_eq!(
        shared.get("shouted").unwrap(),
        serde_json::json!(["HELLO", "WORLD"])
    );
}

#[tokio::test]
async fn test_node_fan_out_is_throttled() {
    let node = ThrottledBatchNode::new(
        Shout::new(),
        ExecutorConfig {
            limits: RateLimitConfig::new(2),
            ..ExecutorConfig::default()
        },
    )
    .unwrap();

    let shared = store_with_texts(&["a", "b", "c", "d", "e", "f"]);
    node.run(&shared).await.unwrap();

    assert_eq!(node.node().peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_node_item_failure_stays_in_slot() {
    let node = ThrottledBatchNode::new(
        Shout::new(),
        ExecutorConfig {
            limits: RateLimitConfig::new(4),
            ..ExecutorConfig::default()
        },
    )
    .unwrap();

    let shared = store_with_texts(&["fine", "poison", "alsofine"]);
    let results = node.run(&shared).await.unwrap();

    assert!(results[1].is_err());
    // post still saw the ordered results and summarized the survivors.
    assert_eq!(
        shared.get("shouted").unwrap(),
        serde_json::json!(["FINE", "ALSOFINE"])
    );
}

#[tokio::test]
async fn test_node_prep_failure_aborts_run() {
    let node = ThrottledBatchNode::new(
        Shout::new(),
        ExecutorConfig {
            limits: RateLimitConfig::new(2),
            ..ExecutorConfig::default()
        },
    )
    .unwrap();

    // No "texts" key: prep fails before any exec runs.
    let shared = SharedStore::new();
    let err = node.run(&shared).await.unwrap_err();
    assert!(err.to_string().contains("missing texts"));
    assert_eq!(node.node().peak.load(Ordering::SeqCst), 0);
}

/// Node whose exec raises the typed throttling signal for some items.
struct ThrottledUpstream;

#[async_trait::async_trait]
impl BatchNode for ThrottledUpstream {
    type Item = u32;
    type Output = u32;

    async fn prep(&self, shared: &SharedStore) -> Result<Vec<u32>, BoxError> {
        let count = shared
            .get("count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;
        Ok((0..count).collect())
    }

    async fn exec(&self, item: u32) -> Result<u32, BoxError> {
        if item == 0 {
            Err(RateLimitHit::new("429 from upstream").into())
        } else {
            Ok(item)
        }
    }

    async fn post(
        &self,
        _shared: &SharedStore,
        _results: &[Result<u32, BoxError>],
    ) -> Result<(), BoxError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_adaptive_node_backs_off_on_signal() {
    let node = AdaptiveBatchNode::new(
        ThrottledUpstream,
        AdaptiveExecutorConfig {
            adaptive: AdaptiveConfig {
                initial: 8,
                min: 2,
                max: 16,
                ..AdaptiveConfig::default()
            },
            ..AdaptiveExecutorConfig::default()
        },
    )
    .unwrap();

    let shared = SharedStore::new();
    shared.insert("count", 4);
    let results = node.run(&shared).await.unwrap();

    assert!(results[0].is_err());
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);

    let stats = node.executor().stats();
    assert_eq!(stats.total_rate_limits, 1);
    assert_eq!(stats.total_successes, 3);
    assert_eq!(stats.current_concurrent, 4);
}
