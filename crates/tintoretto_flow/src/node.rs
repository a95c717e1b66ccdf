//! Host-framework batch node adapter.
//!
//! The host orchestration framework drives a batch step through three
//! callbacks: `prep` before the batch, `exec` per item, `post` after the
//! batch. The drivers here substitute Tintoretto's throttled fan-out for the
//! host's default parallel fan-out, leaving the callbacks untouched.

use crate::SharedStore;
use tintoretto_error::{BoxError, ThrottleResult};
use tintoretto_executor::{
    AdaptiveBatchExecutor, AdaptiveExecutorConfig, ExecutorConfig, ThrottledBatchExecutor,
};

/// Lifecycle callbacks for one batch step of a pipeline graph.
///
/// # Example
///
/// ```
/// use tintoretto_error::BoxError;
/// use tintoretto_flow::{BatchNode, SharedStore};
///
/// struct Translate;
///
/// #[async_trait::async_trait]
/// impl BatchNode for Translate {
///     type Item = String;
///     type Output = String;
///
///     async fn prep(&self, shared: &SharedStore) -> Result<Vec<String>, BoxError> {
///         let texts = shared.get("texts").unwrap_or_default();
///         Ok(texts
///             .as_array()
///             .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
///             .unwrap_or_default())
///     }
///
///     async fn exec(&self, text: String) -> Result<String, BoxError> {
///         Ok(text.to_uppercase()) // a real node would call the API here
///     }
///
///     async fn post(
///         &self,
///         shared: &SharedStore,
///         results: &[Result<String, BoxError>],
///     ) -> Result<(), BoxError> {
///         let ok: Vec<_> = results.iter().filter_map(|r| r.as_deref().ok()).collect();
///         shared.insert("translations", serde_json::json!(ok));
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait BatchNode: Send + Sync {
    /// One unit of work produced by `prep`.
    type Item: Clone + Send + Sync;
    /// Result of executing one item.
    type Output: Send;

    /// Gather the batch from the shared store before execution.
    async fn prep(&self, shared: &SharedStore) -> Result<Vec<Self::Item>, BoxError>;

    /// Execute one item. Called concurrently, under the throttle.
    async fn exec(&self, item: Self::Item) -> Result<Self::Output, BoxError>;

    /// Consume the ordered results after the batch completes.
    async fn post(
        &self,
        shared: &SharedStore,
        results: &[Result<Self::Output, BoxError>],
    ) -> Result<(), BoxError>;
}

/// Drives a [`BatchNode`] through a throttled fan-out.
///
/// Where the host framework would fire every `exec` at once, this driver
/// queues them behind the executor's rate limiter, preventing 429 errors
/// from external APIs.
#[derive(Debug)]
pub struct ThrottledBatchNode<N: BatchNode> {
    node: N,
    executor: ThrottledBatchExecutor,
}

impl<N: BatchNode> ThrottledBatchNode<N> {
    /// Wrap a node with its own throttled executor.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the limits fail validation.
    pub fn new(node: N, config: ExecutorConfig) -> ThrottleResult<Self> {
        Ok(Self {
            node,
            executor: ThrottledBatchExecutor::new(config)?,
        })
    }

    /// Wrap a node with an existing executor, e.g. one drawing from a
    /// shared limiter.
    pub fn with_executor(node: N, executor: ThrottledBatchExecutor) -> Self {
        Self { node, executor }
    }

    /// The wrapped node.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Run prep, the throttled exec fan-out, then post.
    ///
    /// Returns the ordered per-item results after `post` has seen them.
    ///
    /// # Errors
    ///
    /// Propagates `prep` and `post` failures; per-item `exec` failures stay
    /// in their result slots.
    pub async fn run(
        &self,
        shared: &SharedStore,
    ) -> Result<Vec<Result<N::Output, BoxError>>, BoxError> {
        let items = self.node.prep(shared).await?;
        let results = self.executor.run(items, |item| self.node.exec(item)).await;
        self.node.post(shared, &results).await?;
        Ok(results)
    }
}

/// Drives a [`BatchNode`] through an adaptive throttled fan-out.
///
/// Same lifecycle as [`ThrottledBatchNode`], with the concurrency cap tuning
/// itself to observed rate limit errors.
#[derive(Debug)]
pub struct AdaptiveBatchNode<N: BatchNode> {
    node: N,
    executor: AdaptiveBatchExecutor,
}

impl<N: BatchNode> AdaptiveBatchNode<N> {
    /// Wrap a node with an adaptive executor.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the adaptive bounds fail validation.
    pub fn new(node: N, config: AdaptiveExecutorConfig) -> ThrottleResult<Self> {
        Ok(Self {
            node,
            executor: AdaptiveBatchExecutor::new(config)?,
        })
    }

    /// The wrapped node.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// The adaptive executor, for stats and resets.
    pub fn executor(&self) -> &AdaptiveBatchExecutor {
        &self.executor
    }

    /// Run prep, the adaptive exec fan-out, then post.
    ///
    /// # Errors
    ///
    /// Propagates `prep` and `post` failures; per-item `exec` failures stay
    /// in their result slots.
    pub async fn run(
        &self,
        shared: &SharedStore,
    ) -> Result<Vec<Result<N::Output, BoxError>>, BoxError> {
        let items = self.node.prep(shared).await?;
        let results = self.executor.run(items, |item| self.node.exec(item)).await;
        self.node.post(shared, &results).await?;
        Ok(results)
    }
}
