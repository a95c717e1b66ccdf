//! Flow-level throttling for pipeline graphs.
//!
//! Where [`tintoretto_executor`] throttles items inside a single step, this
//! crate throttles whole pipeline runs: given a graph and a list of
//! per-instance parameter bundles, it executes the graph once per bundle with
//! a bounded number of instances in flight.
//!
//! The orchestration framework itself stays external. The only capability
//! required from it is the [`FlowGraph`] trait: run the whole graph once for
//! one parameter bundle against the caller's [`SharedStore`].
//!
//! Use both layers together for fine-grained control: a flow cap of 5 with a
//! node-level cap of 3 bounds total concurrent external calls at 15.
//!
//! # Example
//!
//! ```
//! use tintoretto_error::BoxError;
//! use tintoretto_flow::{FlowBatchExecutor, FlowConfig, FlowGraph, ParamBundle, SharedStore};
//!
//! struct FetchUser;
//!
//! #[async_trait::async_trait]
//! impl FlowGraph for FetchUser {
//!     type Output = String;
//!
//!     async fn execute(
//!         &self,
//!         _shared: &SharedStore,
//!         params: &ParamBundle,
//!     ) -> Result<String, BoxError> {
//!         Ok(format!("user-{}", params.get("user_id").unwrap()))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), BoxError> {
//! let executor = FlowBatchExecutor::new(FlowConfig {
//!     max_concurrent_flows: 10,
//!     ..FlowConfig::default()
//! })?;
//!
//! let bundles: Vec<_> = (0..100)
//!     .map(|uid| ParamBundle::new().set("user_id", uid))
//!     .collect();
//!
//! let shared = SharedStore::new();
//! let outcomes = executor.run(&FetchUser, bundles, &shared).await;
//! assert_eq!(outcomes.len(), 100);
//! assert_eq!(executor.stats().completed_flows, 100);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adaptive;
mod flow;
mod graph;
mod node;
mod params;
mod store;

pub use adaptive::{AdaptiveFlowConfig, AdaptiveFlowExecutor, AdaptiveFlowStats};
pub use flow::{FlowBatchExecutor, FlowConfig, FlowStats};
pub use graph::FlowGraph;
pub use node::{AdaptiveBatchNode, BatchNode, ThrottledBatchNode};
pub use params::ParamBundle;
pub use store::SharedStore;
