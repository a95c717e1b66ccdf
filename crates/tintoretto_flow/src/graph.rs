//! Narrow interface to the host orchestration framework.

use crate::{ParamBundle, SharedStore};
use tintoretto_error::BoxError;

/// One pipeline graph, runnable once per parameter bundle.
///
/// This is the only capability the flow executors require from the host
/// orchestration framework: execute the whole graph for one instance, given
/// the caller's shared store and the instance's merged parameters. Node
/// wiring, lifecycle hooks, and action routing stay on the host's side of
/// the seam.
///
/// Raise a [`RateLimitHit`](tintoretto_error::RateLimitHit) from inside a
/// node to signal throttling to an
/// [`AdaptiveFlowExecutor`](crate::AdaptiveFlowExecutor).
#[async_trait::async_trait]
pub trait FlowGraph: Send + Sync {
    /// Result of one complete graph run.
    type Output: Send;

    /// Run the graph once for a single flow instance.
    async fn execute(
        &self,
        shared: &SharedStore,
        params: &ParamBundle,
    ) -> Result<Self::Output, BoxError>;
}
