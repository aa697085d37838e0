// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dynamic adapter wrapper for type erasure.

use std::{fmt::Debug, sync::Arc};

use serde_json::Value;

use crate::{CacheAdapter, CacheKey, Error, adapter::DynCacheAdapter};

/// Extension trait for converting any `CacheAdapter` into a `DynamicAdapter`.
///
/// This trait is automatically implemented for all types that implement `CacheAdapter`.
///
/// # Examples
///
/// ```
/// use swrcache_adapter::{DynamicAdapter, DynamicAdapterExt, MemoryStore, StorageAdapter};
///
/// let adapter: DynamicAdapter = StorageAdapter::new(MemoryStore::new()).into_dynamic();
/// ```
pub trait DynamicAdapterExt: Sized {
    /// Converts this adapter into a `DynamicAdapter`.
    fn into_dynamic(self) -> DynamicAdapter;
}

impl<T> DynamicAdapterExt for T
where
    T: CacheAdapter + 'static,
{
    fn into_dynamic(self) -> DynamicAdapter {
        DynamicAdapter::new(self)
    }
}

/// A clonable, type-erased cache adapter.
///
/// Wraps a trait object in an `Arc` so that a single adapter instance can be shared
/// by the loader, the binder and the invalidation service, and so that adapters of
/// different concrete types can be swapped behind one binding.
pub struct DynamicAdapter(Arc<DynCacheAdapter<'static>>);

impl DynamicAdapter {
    /// Creates a new dynamic adapter from any `CacheAdapter` implementation.
    pub fn new<T>(adapter: T) -> Self
    where
        T: CacheAdapter + 'static,
    {
        Self(DynCacheAdapter::new_arc(adapter))
    }

    /// Returns `true` if both handles refer to the same underlying adapter.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for DynamicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicAdapter").finish_non_exhaustive()
    }
}

impl Clone for DynamicAdapter {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl CacheAdapter for DynamicAdapter {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, Error> {
        self.0.get(key).await
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<(), Error> {
        self.0.set(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), Error> {
        self.0.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::MockAdapter;

    #[test]
    fn clone_shares_underlying_adapter() {
        let dynamic = MockAdapter::new().into_dynamic();
        let cloned = dynamic.clone();

        assert!(dynamic.ptr_eq(&cloned));
        assert!(!dynamic.ptr_eq(&MockAdapter::new().into_dynamic()));
    }

    #[test]
    fn forwards_operations() {
        futures::executor::block_on(async {
            let mock = MockAdapter::new();
            let dynamic = mock.clone().into_dynamic();
            let key = CacheKey::from("/users/1");

            dynamic.set(&key, json!({"name": "ada"})).await.expect("set should succeed");
            assert_eq!(mock.value(&key), Some(json!({"name": "ada"})));

            let value = dynamic.get(&key).await.expect("get should succeed");
            assert_eq!(value, Some(json!({"name": "ada"})));

            dynamic.remove(&key).await.expect("remove should succeed");
            assert!(!mock.contains_key(&key));
        });
    }

    #[test]
    fn debug_output() {
        let dynamic = MockAdapter::new().into_dynamic();
        assert!(format!("{dynamic:?}").contains("DynamicAdapter"));
    }
}
