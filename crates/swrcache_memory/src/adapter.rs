// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use moka::future::Cache;
use serde_json::Value;
use swrcache_adapter::{CacheAdapter, CacheKey, Error};

/// An in-process cache adapter backed by moka.
///
/// Clones share the same entries. The adapter is unbounded: size-based eviction is
/// left to the caller, who can always [`remove`](CacheAdapter::remove) keys.
#[derive(Debug, Clone)]
pub struct InMemoryAdapter {
    inner: Cache<CacheKey, Value>,
}

impl Default for InMemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAdapter {
    /// Creates a new, empty adapter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }

    /// Creates a new, empty adapter whose underlying cache carries `name`.
    ///
    /// The name shows up in debug output, which helps tell adapters apart when several
    /// are configured.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            inner: Cache::builder().name(name).build(),
        }
    }

    /// Returns the name given at construction, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.inner.contains_key(key)
    }
}

impl CacheAdapter for InMemoryAdapter {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, Error> {
        Ok(self.inner.get(key).await)
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<(), Error> {
        self.inner.insert(key.clone(), value).await;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), Error> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}
