//! Shared store side-channel.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Opaque side-channel map shared across an entire batch of flow instances.
///
/// The store is owned by the caller; the core only propagates the handle and
/// makes no claim about mutation safety between parallel instances. Writers
/// running in parallel should stick to bundle-keyed slots (for example keyed
/// by a `user_id` parameter) so instances never contend for the same key.
///
/// Cloning the handle is cheap and shares the underlying map.
///
/// # Example
///
/// ```
/// use tintoretto_flow::SharedStore;
///
/// let shared = SharedStore::new();
/// shared.insert("texts", serde_json::json!(["Hello", "World"]));
/// assert_eq!(shared.get("texts").unwrap().as_array().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl SharedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value under the key if any.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner
            .write()
            .expect("store lock poisoned")
            .insert(key.into(), value.into())
    }

    /// Get a clone of the value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
    }

    /// Remove and return the value under `key`.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner
            .write()
            .expect("store lock poisoned")
            .remove(key)
    }

    /// Check whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .read()
            .expect("store lock poisoned")
            .contains_key(key)
    }

    /// All keys currently in the store.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.inner.read().expect("store lock poisoned").len()
    }

    /// True when the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
