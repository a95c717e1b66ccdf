//! Per-instance parameter bundles.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Named overrides supplied to one flow instance.
///
/// Every flow instance receives the executor's ambient parameters merged
/// with its own bundle (the bundle wins on collision). The core never
/// interprets the contents; nodes read whatever keys they agreed on with the
/// caller.
///
/// # Example
///
/// ```
/// use tintoretto_flow::ParamBundle;
///
/// let ambient = ParamBundle::new().set("region", "eu").set("retries", 3);
/// let bundle = ParamBundle::new().set("user_id", 42).set("retries", 5);
///
/// let merged = ambient.merged(&bundle);
/// assert_eq!(merged.get("region").unwrap(), "eu");
/// assert_eq!(merged.get("retries").unwrap(), 5); // bundle wins
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamBundle(HashMap<String, Value>);

impl ParamBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous value under the key if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Get the value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Merge `overrides` over this bundle into a new bundle.
    pub fn merged(&self, overrides: &ParamBundle) -> ParamBundle {
        let mut merged = self.0.clone();
        merged.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        ParamBundle(merged)
    }

    /// Iterate the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of entries in the bundle.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the bundle has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
