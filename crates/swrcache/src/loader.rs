// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The stale-while-revalidate load orchestrator.

use swrcache_adapter::{CacheAdapter, CacheKey, DynamicAdapter};
use url::Url;

use crate::{
    AdapterRegistry, Error, LoadOutcome, LoaderEnvelope, Revalidation, derive_key,
    telemetry::{CacheActivity, record, record_failure},
};

/// How a cache hit is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoadMode {
    /// Serve the cached value and refresh it in the background.
    #[default]
    Swr,
    /// Serve the cached value and skip the authoritative load entirely.
    Normal,
}

/// Per-call options for [`load_through_cache`] and [`decache_action`].
///
/// Without explicit settings the mode is [`LoadMode::Swr`], the key is derived from
/// the request URL and the adapter is the one bound in the
/// [global registry][AdapterRegistry::global] at the time of the call.
///
/// # Examples
///
/// ```
/// use swrcache::{AdapterRegistry, LoadMode, LoadOptions};
///
/// let registry = AdapterRegistry::with_memory();
/// let options = LoadOptions::new()
///     .mode(LoadMode::Normal)
///     .key("/users")
///     .registry(&registry);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    mode: LoadMode,
    key: Option<CacheKey>,
    adapter: Option<DynamicAdapter>,
}

impl LoadOptions {
    /// Creates options with every setting at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how a cache hit is treated.
    #[must_use]
    pub fn mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Uses `key` instead of the key derived from the request URL.
    #[must_use]
    pub fn key(mut self, key: impl Into<CacheKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Uses `adapter` instead of the registry binding.
    #[must_use]
    pub fn adapter(mut self, adapter: DynamicAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Uses the adapter currently bound in `registry`.
    #[must_use]
    pub fn registry(self, registry: &AdapterRegistry) -> Self {
        self.adapter(registry.current())
    }

    fn resolve(self, url: &Url) -> (LoadMode, CacheKey, DynamicAdapter) {
        let key = self.key.unwrap_or_else(|| derive_key(url));
        let adapter = self.adapter.unwrap_or_else(|| AdapterRegistry::global().current());
        (self.mode, key, adapter)
    }
}

/// Loads page data for `url`, serving cached data first when there is some.
///
/// - On a miss, `load` runs and its data is stored and returned. A redirect or failure
///   is returned as an error and nothing is stored.
/// - On a hit in [`LoadMode::Normal`], the cached value is returned as is and `load`
///   never runs.
/// - On a hit in [`LoadMode::Swr`], the cached value is returned at once together
///   with a [`Revalidation`] that runs `load` in the background. When the background
///   load produces data, it is written to the adapter.
///
/// The authoritative load runs at most once per call.
///
/// # Errors
///
/// Returns [`Error::Adapter`] if the adapter cannot be read or written, and
/// [`Error::Redirect`] or [`Error::Load`] if a miss could not be populated.
///
/// # Panics
///
/// A revalidation is spawned onto the current tokio runtime; calling this outside of
/// a runtime panics on a stale-while-revalidate hit.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use swrcache::{AdapterRegistry, LoadOptions, LoadOutcome, load_through_cache};
/// use url::Url;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = AdapterRegistry::with_memory();
/// let url = Url::parse("https://example.com/users")?;
/// let options = LoadOptions::new().registry(&registry);
///
/// let first = load_through_cache(&url, || async { LoadOutcome::Fresh(json!(["a"])) }, options.clone()).await?;
/// assert!(!first.is_revalidating());
///
/// let second = load_through_cache(&url, || async { LoadOutcome::Fresh(json!(["a", "b"])) }, options).await?;
/// assert_eq!(second.data(), &json!(["a"]));
/// assert_eq!(second.deferred_server_data().unwrap().resolve().await?, json!(["a", "b"]));
/// # Ok(())
/// # }
/// ```
pub async fn load_through_cache<L, Fut>(url: &Url, load: L, options: LoadOptions) -> Result<LoaderEnvelope, Error>
where
    L: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = LoadOutcome> + Send + 'static,
{
    let (mode, key, adapter) = options.resolve(url);

    let (data, revalidate) = match adapter.get(&key).await? {
        Some(cached) if mode == LoadMode::Normal => {
            record(CacheActivity::ShortCircuit, &key);
            return Ok(LoaderEnvelope::new(key, cached, None));
        }
        Some(cached) => {
            record(CacheActivity::Hit, &key);
            (cached, Some(load))
        }
        None => {
            record(CacheActivity::Miss, &key);
            (load().await.into_result()?, None)
        }
    };

    adapter.set(&key, data.clone()).await?;
    record(CacheActivity::Stored, &key);

    let deferred = revalidate.map(|load| Revalidation::spawn(revalidate_in_background(adapter, key.clone(), load)));

    Ok(LoaderEnvelope::new(key, data, deferred))
}

async fn revalidate_in_background<L, Fut>(adapter: DynamicAdapter, key: CacheKey, load: L) -> LoadOutcome
where
    L: FnOnce() -> Fut,
    Fut: Future<Output = LoadOutcome>,
{
    let outcome = load().await;

    if let LoadOutcome::Fresh(value) = &outcome {
        match adapter.set(&key, value.clone()).await {
            Ok(()) => record(CacheActivity::Revalidated, &key),
            Err(error) => record_failure(CacheActivity::WriteFailed, &key, &error),
        }
    }

    outcome
}

/// A loader that always runs through the cache.
///
/// Holds the [`LoadOptions`] for one route so that every navigation to it uses the
/// same mode, key override and adapter.
#[derive(Clone, Debug, Default)]
pub struct CachedLoader {
    options: LoadOptions,
}

impl CachedLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Returns `true`: cached loaders also run when a page is first hydrated, so the
    /// server-rendered data seeds the client cache.
    #[must_use]
    pub fn hydrate(&self) -> bool {
        true
    }

    /// Loads page data for `url` through the cache.
    ///
    /// # Errors
    ///
    /// See [`load_through_cache`].
    pub async fn load<L, Fut>(&self, url: &Url, load: L) -> Result<LoaderEnvelope, Error>
    where
        L: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = LoadOutcome> + Send + 'static,
    {
        load_through_cache(url, load, self.options.clone()).await
    }
}

/// Runs a mutating action and then drops the cached data for `url`.
///
/// The action always runs to completion first; its output is returned unchanged once
/// the cache entry has been removed. The load mode in `options` is ignored.
///
/// # Errors
///
/// Returns [`Error::Adapter`] if the entry cannot be removed. The action has already
/// run at that point.
pub async fn decache_action<A, Fut, T>(url: &Url, action: A, options: LoadOptions) -> Result<T, Error>
where
    A: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let (_, key, adapter) = options.resolve(url);

    let output = action().await;

    adapter.remove(&key).await?;
    record(CacheActivity::Invalidated, &key);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use serde_json::{Value, json};
    use swrcache_adapter::{
        DynamicAdapterExt,
        testing::{AdapterOp, MockAdapter},
    };

    use super::*;
    use crate::{LoadError, Redirect};

    fn url(path: &str) -> Url {
        Url::parse("https://example.com").and_then(|base| base.join(path)).expect("valid url")
    }

    fn counting(calls: &Arc<AtomicUsize>, value: Value) -> impl FnOnce() -> futures::future::Ready<LoadOutcome> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(LoadOutcome::Fresh(value))
        }
    }

    fn options(mock: &MockAdapter) -> LoadOptions {
        LoadOptions::new().adapter(mock.clone().into_dynamic())
    }

    #[tokio::test]
    async fn miss_loads_and_stores() {
        let mock = MockAdapter::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let envelope = load_through_cache(&url("/users"), counting(&calls, json!(["a"])), options(&mock))
            .await
            .expect("load");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(envelope.data(), &json!(["a"]));
        assert_eq!(envelope.key().as_str(), "/users");
        assert!(!envelope.is_revalidating());
        assert_eq!(mock.value(&CacheKey::from("/users")), Some(json!(["a"])));
    }

    #[tokio::test]
    async fn normal_hit_short_circuits() {
        let mock = MockAdapter::new();
        mock.set(&CacheKey::from("/users"), json!("cached")).await.expect("seed");
        mock.clear_operations();
        let calls = Arc::new(AtomicUsize::new(0));

        let envelope = load_through_cache(
            &url("/users"),
            counting(&calls, json!("fresh")),
            options(&mock).mode(LoadMode::Normal),
        )
        .await
        .expect("load");

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(envelope.data(), &json!("cached"));
        assert!(!envelope.is_revalidating());
        assert_eq!(mock.operations(), vec![AdapterOp::Get(CacheKey::from("/users"))]);
    }

    #[tokio::test]
    async fn swr_hit_returns_cached_and_revalidates() {
        let mock = MockAdapter::new();
        mock.set(&CacheKey::from("/users"), json!("stale")).await.expect("seed");
        let calls = Arc::new(AtomicUsize::new(0));

        let envelope = load_through_cache(&url("/users"), counting(&calls, json!("fresh")), options(&mock))
            .await
            .expect("load");

        assert_eq!(envelope.data(), &json!("stale"));
        let revalidation = envelope.deferred_server_data().expect("revalidation");
        assert_eq!(revalidation.resolve().await.expect("fresh"), json!("fresh"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(mock.value(&CacheKey::from("/users")), Some(json!("fresh")));
    }

    #[tokio::test]
    async fn miss_redirect_is_returned_and_not_stored() {
        let mock = MockAdapter::new();

        let error = load_through_cache(
            &url("/private"),
            || async { LoadOutcome::Redirect(Redirect::found("/login")) },
            options(&mock),
        )
        .await
        .expect_err("redirect");

        assert!(matches!(&error, Error::Redirect(redirect) if redirect.location() == "/login"));
        assert_eq!(mock.entry_count(), 0);
    }

    #[tokio::test]
    async fn miss_failure_is_returned_and_not_stored() {
        let mock = MockAdapter::new();

        let error = load_through_cache(
            &url("/users"),
            || async { LoadOutcome::Failed(LoadError::new("offline")) },
            options(&mock),
        )
        .await
        .expect_err("failure");

        assert!(matches!(error, Error::Load(_)));
        assert_eq!(mock.entry_count(), 0);
    }

    #[tokio::test]
    async fn read_failure_propagates() {
        let mock = MockAdapter::new();
        mock.fail_when(|op| matches!(op, AdapterOp::Get(_)));
        let calls = Arc::new(AtomicUsize::new(0));

        let error = load_through_cache(&url("/users"), counting(&calls, json!(1)), options(&mock))
            .await
            .expect_err("read failure");

        assert!(matches!(error, Error::Adapter(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn explicit_key_overrides_derived_key() {
        let mock = MockAdapter::new();

        let envelope = load_through_cache(
            &url("/user/1?tab=posts"),
            || async { LoadOutcome::Fresh(json!(1)) },
            options(&mock).key("user-1"),
        )
        .await
        .expect("load");

        assert_eq!(envelope.key().as_str(), "user-1");
        assert!(mock.contains_key(&CacheKey::from("user-1")));
    }

    #[tokio::test]
    async fn background_write_failure_keeps_outcome() {
        let mock = MockAdapter::new();
        mock.set(&CacheKey::from("/users"), json!("stale")).await.expect("seed");
        let envelope = load_through_cache(&url("/users"), || async { LoadOutcome::Fresh(json!("fresh")) }, options(&mock))
            .await
            .expect("load");
        mock.fail_when(|op| matches!(op, AdapterOp::Set { .. }));

        let revalidation = envelope.deferred_server_data().expect("revalidation");
        assert_eq!(revalidation.resolve().await.expect("fresh"), json!("fresh"));
    }

    #[tokio::test]
    async fn cached_loader_reuses_options() {
        let mock = MockAdapter::new();
        let loader = CachedLoader::new(options(&mock).mode(LoadMode::Normal));
        assert!(loader.hydrate());

        loader.load(&url("/a"), || async { LoadOutcome::Fresh(json!(1)) }).await.expect("miss");
        let envelope = loader.load(&url("/a"), || async { LoadOutcome::Fresh(json!(2)) }).await.expect("hit");

        assert_eq!(envelope.data(), &json!(1));
        assert!(!envelope.is_revalidating());
    }

    #[tokio::test]
    async fn decache_action_runs_action_then_removes() {
        let mock = MockAdapter::new();
        mock.set(&CacheKey::from("/users"), json!([])).await.expect("seed");
        mock.clear_operations();

        let output = decache_action(&url("/users"), || async { "created" }, options(&mock))
            .await
            .expect("decache");

        assert_eq!(output, "created");
        assert!(!mock.contains_key(&CacheKey::from("/users")));
        assert_eq!(mock.operations(), vec![AdapterOp::Remove(CacheKey::from("/users"))]);
    }

    #[tokio::test]
    async fn decache_action_reports_remove_failure() {
        let mock = MockAdapter::new();
        mock.fail_when(|op| matches!(op, AdapterOp::Remove(_)));
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);

        let error = decache_action(
            &url("/users"),
            || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            options(&mock),
        )
        .await
        .expect_err("remove failure");

        assert!(matches!(error, Error::Adapter(_)));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
