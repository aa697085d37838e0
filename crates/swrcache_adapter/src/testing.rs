// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock adapter implementation for testing.
//!
//! This module provides `MockAdapter`, an in-memory adapter that records all
//! operations and supports failure injection for testing error paths.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use serde_json::Value;

use crate::{CacheAdapter, CacheKey, Error};

/// Recorded adapter operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOp {
    /// A get operation was performed with the given key.
    Get(CacheKey),
    /// A set operation was performed with the given key and value.
    Set {
        /// The key that was written.
        key: CacheKey,
        /// The value that was written.
        value: Value,
    },
    /// A remove operation was performed with the given key.
    Remove(CacheKey),
}

type FailPredicate = Box<dyn Fn(&AdapterOp) -> bool + Send + Sync>;

/// A configurable mock adapter for testing.
///
/// Values are kept in memory; every operation is recorded, and operations can be
/// made to fail on demand. Clones share state, so a clone can be handed to the code
/// under test while the original is used for assertions.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use swrcache_adapter::{CacheAdapter, CacheKey, testing::{AdapterOp, MockAdapter}};
///
/// # futures::executor::block_on(async {
/// let adapter = MockAdapter::new();
/// let key = CacheKey::from("/users/1");
///
/// adapter.set(&key, json!(1)).await.unwrap();
/// assert_eq!(adapter.get(&key).await.unwrap(), Some(json!(1)));
///
/// assert_eq!(adapter.operations(), vec![
///     AdapterOp::Set { key: key.clone(), value: json!(1) },
///     AdapterOp::Get(key),
/// ]);
///
/// adapter.fail_when(|op| matches!(op, AdapterOp::Remove(_)));
/// assert!(adapter.remove(&CacheKey::from("/users/1")).await.is_err());
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockAdapter {
    data: Arc<Mutex<HashMap<CacheKey, Value>>>,
    operations: Arc<Mutex<Vec<AdapterOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAdapter")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl MockAdapter {
    /// Creates a new empty mock adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock adapter with pre-populated data.
    #[must_use]
    pub fn with_data(data: HashMap<CacheKey, Value>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            ..Self::default()
        }
    }

    /// Returns the number of entries held.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if a value is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns the value stored under `key` without recording an operation.
    #[must_use]
    pub fn value(&self, key: &CacheKey) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    /// Sets a predicate that decides which operations fail.
    ///
    /// Failed operations are still recorded but leave the data untouched.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&AdapterOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<AdapterOp> {
        self.operations.lock().clone()
    }

    /// Returns how many recorded operations match `predicate`.
    #[must_use]
    pub fn count_operations(&self, predicate: impl Fn(&AdapterOp) -> bool) -> usize {
        self.operations.lock().iter().filter(|op| predicate(op)).count()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn check(&self, op: AdapterOp, message: &'static str) -> Result<(), Error> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        if fail { Err(Error::from_message(message)) } else { Ok(()) }
    }
}

impl CacheAdapter for MockAdapter {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, Error> {
        self.check(AdapterOp::Get(key.clone()), "mock: get failed")?;
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<(), Error> {
        self.check(
            AdapterOp::Set {
                key: key.clone(),
                value: value.clone(),
            },
            "mock: set failed",
        )?;
        self.data.lock().insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), Error> {
        self.check(AdapterOp::Remove(key.clone()), "mock: remove failed")?;
        self.data.lock().remove(key);
        Ok(())
    }
}
