//! Query cache keyed by request URL
//!
//! Each key holds a `OnceCell`, so concurrent reads of the same key share a
//! single in-flight fetch. A failed fetch leaves the cell empty and the next
//! read tries again.

use crate::error::ClientError;
use dashmap::DashMap;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<String, Arc<OnceCell<Value>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, or the result of `fetch` stored under it.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Value, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>>,
    {
        let cell = Arc::clone(self.entries.entry(key.to_string()).or_default().value());
        let value = cell.get_or_try_init(fetch).await?;
        Ok(value.clone())
    }

    /// Settled value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key)?.value().get().cloned()
    }

    pub fn set(&self, key: &str, value: Value) {
        let cell = OnceCell::new_with(Some(value));
        self.entries.insert(key.to_string(), Arc::new(cell));
    }

    pub fn invalidate(&self, key: &str) {
        if self.entries.remove(key).is_some() {
            debug!("Invalidated {}", key);
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
