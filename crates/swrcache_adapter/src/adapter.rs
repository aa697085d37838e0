// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for cache storage backends.

use serde_json::Value;

use crate::{CacheKey, Error};

/// Trait for cache adapter implementations.
///
/// An adapter is a plain key/value contract: `get`, `set` and `remove`. Every
/// operation may suspend on backing-store I/O. Looking up an absent key is not an
/// error and yields `Ok(None)`, and removing an absent key succeeds.
#[dynosaur::dynosaur(pub(crate) DynCacheAdapter = dyn(box) CacheAdapter, bridge(none))]
pub trait CacheAdapter: Send + Sync {
    /// Gets the value stored under `key`, if any.
    fn get(&self, key: &CacheKey) -> impl Future<Output = Result<Option<Value>, Error>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &CacheKey, value: Value) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes the value stored under `key`.
    fn remove(&self, key: &CacheKey) -> impl Future<Output = Result<(), Error>> + Send;
}
