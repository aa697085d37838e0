// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The replaceable adapter binding.

use std::{
    fmt::{self, Debug},
    sync::{
        LazyLock,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::RwLock;
use swrcache_adapter::{CacheKey, DynamicAdapter, DynamicAdapterExt, KeyValueStore, StorageAdapter};
use swrcache_memory::InMemoryAdapter;

use crate::{
    Error, Keys,
    invalidate::invalidate,
    telemetry::{CacheActivity, record},
};

static GLOBAL: LazyLock<AdapterRegistry> = LazyLock::new(AdapterRegistry::with_memory);

/// Where the cache is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    /// An interactive client. Client-side adapters can be created here.
    #[default]
    Client,
    /// A server environment. Adapter creation is skipped.
    Server,
}

/// What an adapter factory produces.
///
/// Either a complete adapter or a synchronous string store that still needs to be
/// wrapped in a [`StorageAdapter`].
pub enum AdapterSource {
    /// A ready-made adapter.
    Adapter(DynamicAdapter),
    /// A string key/value store, encoded as JSON by a [`StorageAdapter`].
    Store(Box<dyn KeyValueStore>),
}

impl AdapterSource {
    /// Creates a source from a key/value store.
    pub fn store(store: impl KeyValueStore + 'static) -> Self {
        Self::Store(Box::new(store))
    }

    /// Turns the source into an adapter.
    #[must_use]
    pub fn into_adapter(self) -> DynamicAdapter {
        match self {
            Self::Adapter(adapter) => adapter,
            Self::Store(store) => StorageAdapter::new(store).into_dynamic(),
        }
    }
}

impl From<DynamicAdapter> for AdapterSource {
    fn from(adapter: DynamicAdapter) -> Self {
        Self::Adapter(adapter)
    }
}

impl From<Box<dyn KeyValueStore>> for AdapterSource {
    fn from(store: Box<dyn KeyValueStore>) -> Self {
        Self::Store(store)
    }
}

impl Debug for AdapterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adapter(adapter) => f.debug_tuple("Adapter").field(adapter).finish(),
            Self::Store(_) => f.debug_tuple("Store").finish_non_exhaustive(),
        }
    }
}

/// Builds a client-side adapter.
///
/// The factory only runs in a [`Client`][ExecutionContext::Client] context; in a
/// server context no adapter is created and `None` is returned. A factory that
/// returns a key/value store has it wrapped in a [`StorageAdapter`].
///
/// # Examples
///
/// ```
/// use swrcache::{AdapterSource, ExecutionContext, MemoryStore, create_cache_adapter};
///
/// let adapter = create_cache_adapter(ExecutionContext::Client, || AdapterSource::store(MemoryStore::new()));
/// assert!(adapter.is_some());
///
/// let adapter = create_cache_adapter(ExecutionContext::Server, || -> AdapterSource { unreachable!() });
/// assert!(adapter.is_none());
/// ```
pub fn create_cache_adapter<F, S>(context: ExecutionContext, factory: F) -> Option<DynamicAdapter>
where
    F: FnOnce() -> S,
    S: Into<AdapterSource>,
{
    match context {
        ExecutionContext::Client => Some(factory().into().into_adapter()),
        ExecutionContext::Server => None,
    }
}

/// Holds the adapter used when no explicit adapter is given.
///
/// A registry starts out with a process-local [`InMemoryAdapter`] and can be pointed
/// at another adapter once via [`configure`][Self::configure]. Loaders and binders
/// read the current binding each time they run, so a reconfiguration is picked up by
/// the next cycle.
///
/// Most applications use the process-wide [`global`][Self::global] registry; tests
/// and multi-tenant hosts can create their own.
pub struct AdapterRegistry {
    current: RwLock<DynamicAdapter>,
    configured: AtomicBool,
}

impl AdapterRegistry {
    /// Creates a registry bound to `adapter`.
    #[must_use]
    pub fn new(adapter: DynamicAdapter) -> Self {
        Self {
            current: RwLock::new(adapter),
            configured: AtomicBool::new(false),
        }
    }

    /// Creates a registry bound to a fresh in-memory adapter.
    #[must_use]
    pub fn with_memory() -> Self {
        Self::new(InMemoryAdapter::named("swrcache-default").into_dynamic())
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the adapter currently bound.
    #[must_use]
    pub fn current(&self) -> DynamicAdapter {
        self.current.read().clone()
    }

    /// Returns `true` once [`configure`][Self::configure] replaced the default binding.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }

    /// Replaces the default binding with the adapter built by `factory`.
    ///
    /// In a [`Server`][ExecutionContext::Server] context this does nothing and the
    /// factory is not called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyConfigured`] if the registry was configured before.
    pub fn configure<F, S>(&self, context: ExecutionContext, factory: F) -> Result<(), Error>
    where
        F: FnOnce() -> S,
        S: Into<AdapterSource>,
    {
        if context == ExecutionContext::Server {
            return Ok(());
        }

        if self.configured.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyConfigured);
        }

        if let Some(adapter) = create_cache_adapter(context, factory) {
            *self.current.write() = adapter;
            record(CacheActivity::Configured, &CacheKey::from("*"));
        }

        Ok(())
    }

    /// Removes `keys` from the currently bound adapter.
    ///
    /// # Errors
    ///
    /// Returns the first adapter failure.
    pub async fn invalidate(&self, keys: impl Into<Keys>) -> Result<(), Error> {
        invalidate(&self.current(), keys).await
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_memory()
    }
}

impl Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use swrcache_adapter::{CacheAdapter, MemoryStore, testing::MockAdapter};

    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(AdapterRegistry: Send, Sync, Debug);
        static_assertions::assert_impl_all!(AdapterSource: Send, Sync);
    }

    #[test]
    fn server_context_never_calls_factory() {
        let adapter = create_cache_adapter(ExecutionContext::Server, || -> AdapterSource {
            panic!("factory must not run on the server")
        });
        assert!(adapter.is_none());
    }

    #[tokio::test]
    async fn store_sources_are_json_encoded() {
        let store = MemoryStore::new();
        let adapter =
            create_cache_adapter(ExecutionContext::Client, || AdapterSource::store(store.clone())).expect("client adapter");

        adapter.set(&CacheKey::from("/k"), json!({"a": 1})).await.expect("set");

        assert_eq!(
            store.get_item("/k").expect("read"),
            Some(r#"{"a":1}"#.to_owned())
        );
    }

    #[tokio::test]
    async fn configure_replaces_binding_once() {
        let registry = AdapterRegistry::with_memory();
        let mock = MockAdapter::new();
        let dynamic = mock.clone().into_dynamic();

        registry
            .configure(ExecutionContext::Client, || dynamic.clone())
            .expect("first configure");
        assert!(registry.current().ptr_eq(&dynamic));
        assert!(registry.is_configured());

        let error = registry
            .configure(ExecutionContext::Client, || MockAdapter::new().into_dynamic())
            .expect_err("second configure");
        assert!(matches!(error, Error::AlreadyConfigured));
        assert!(registry.current().ptr_eq(&dynamic));
    }

    #[test]
    fn configure_on_server_is_a_no_op() {
        let registry = AdapterRegistry::with_memory();
        let before = registry.current();

        registry
            .configure(ExecutionContext::Server, || -> AdapterSource { panic!("not on the server") })
            .expect("no-op");

        assert!(registry.current().ptr_eq(&before));
        assert!(!registry.is_configured());
    }

    #[tokio::test]
    async fn invalidate_uses_current_binding() {
        let mock = MockAdapter::new();
        let key = CacheKey::from("/users");
        mock.set(&key, json!([])).await.expect("set");
        let registry = AdapterRegistry::new(mock.clone().into_dynamic());

        registry.invalidate(&key).await.expect("invalidate");

        assert!(!mock.contains_key(&key));
    }

    #[test]
    fn global_is_shared() {
        assert!(AdapterRegistry::global().current().ptr_eq(&AdapterRegistry::global().current()));
    }
}
