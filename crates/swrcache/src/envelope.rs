// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The envelope returned by one loader cycle and its pending revalidation.

use std::{
    fmt::{self, Debug},
    sync::atomic::{AtomicU64, Ordering},
};

use futures::{
    FutureExt,
    future::{self, BoxFuture, Shared},
};
use serde_json::Value;
use swrcache_adapter::CacheKey;

use crate::{Error, LoadError, LoadOutcome, runtime};

static NEXT_ENVELOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the loader cycle that produced an envelope.
///
/// Clones of an envelope share its id, which is how a binder tells a re-delivered
/// envelope apart from the result of a new loader cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvelopeId(u64);

impl EnvelopeId {
    fn next() -> Self {
        Self(NEXT_ENVELOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A pending background revalidation.
///
/// The underlying load starts as soon as the revalidation is created and runs to
/// completion even if nobody awaits it. Clones share the same load; every clone
/// observes the same [`LoadOutcome`].
#[derive(Clone)]
pub struct Revalidation {
    inner: Shared<BoxFuture<'static, LoadOutcome>>,
}

impl Revalidation {
    /// Wraps a future producing a load outcome.
    ///
    /// The future is driven by whoever awaits the revalidation first. Use this to
    /// build envelopes by hand, e.g. when restoring state rendered elsewhere.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = LoadOutcome> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// Creates an already-settled revalidation.
    #[must_use]
    pub fn ready(outcome: LoadOutcome) -> Self {
        Self::new(future::ready(outcome))
    }

    /// Starts `future` as a detached task and tracks its outcome.
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = LoadOutcome> + Send + 'static,
    {
        let handle = runtime::spawn(future);
        Self::new(async move { handle.await.unwrap_or_else(|error| LoadOutcome::Failed(LoadError::new(error))) })
    }

    /// Waits for the revalidation to settle.
    pub async fn outcome(&self) -> LoadOutcome {
        self.inner.clone().await
    }

    /// Waits for the revalidation and returns its data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Redirect`] or [`Error::Load`] if the load did not produce data.
    pub async fn resolve(&self) -> Result<Value, Error> {
        self.outcome().await.into_result()
    }

    /// Returns the outcome if the revalidation has already settled.
    #[must_use]
    pub fn peek(&self) -> Option<&LoadOutcome> {
        self.inner.peek()
    }
}

impl Debug for Revalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Revalidation")
            .field("settled", &self.peek().is_some())
            .finish()
    }
}

/// What one loader cycle hands to the presentation layer.
///
/// Carries the resolved data (cached or freshly loaded), the authoritative data used
/// this cycle, the pending revalidation if one was started, and the cache key.
/// A revalidation is present if and only if the cycle was a cache hit in
/// stale-while-revalidate mode.
#[derive(Clone, Debug)]
pub struct LoaderEnvelope {
    id: EnvelopeId,
    key: CacheKey,
    data: Value,
    server_data: Value,
    deferred_server_data: Option<Revalidation>,
}

impl LoaderEnvelope {
    /// Creates an envelope for a new loader cycle.
    pub fn new(key: impl Into<CacheKey>, server_data: Value, deferred_server_data: Option<Revalidation>) -> Self {
        Self {
            id: EnvelopeId::next(),
            key: key.into(),
            data: server_data.clone(),
            server_data,
            deferred_server_data,
        }
    }

    /// Returns the id of the loader cycle that produced this envelope.
    #[must_use]
    pub fn id(&self) -> EnvelopeId {
        self.id
    }

    /// Returns the cache key used this cycle.
    #[must_use]
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Returns the resolved data: the cached value on a hit, the loaded value on a miss.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the authoritative data fetched or reused this cycle.
    #[must_use]
    pub fn server_data(&self) -> &Value {
        &self.server_data
    }

    /// Returns the pending revalidation, if one was started.
    #[must_use]
    pub fn deferred_server_data(&self) -> Option<&Revalidation> {
        self.deferred_server_data.as_ref()
    }

    /// Returns `true` if a background revalidation was started this cycle.
    #[must_use]
    pub fn is_revalidating(&self) -> bool {
        self.deferred_server_data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(LoaderEnvelope: Send, Sync, Clone);
        static_assertions::assert_impl_all!(Revalidation: Send, Sync, Clone);
    }

    #[test]
    fn new_envelopes_get_distinct_ids_and_clones_share_them() {
        let first = LoaderEnvelope::new("/a", json!(1), None);
        let second = LoaderEnvelope::new("/a", json!(1), None);

        assert_ne!(first.id(), second.id());
        assert_eq!(first.clone().id(), first.id());
    }

    #[test]
    fn data_mirrors_server_data() {
        let envelope = LoaderEnvelope::new("/a", json!({"user": "x"}), None);
        assert_eq!(envelope.data(), envelope.server_data());
        assert!(!envelope.is_revalidating());
    }

    #[test]
    fn revalidation_clones_share_outcome() {
        futures::executor::block_on(async {
            let revalidation = Revalidation::new(async { LoadOutcome::Fresh(json!("fresh")) });
            let clone = revalidation.clone();

            assert!(revalidation.peek().is_none());
            assert_eq!(revalidation.resolve().await.expect("fresh data"), json!("fresh"));
            assert!(matches!(clone.peek(), Some(LoadOutcome::Fresh(_))));
        });
    }

    #[test]
    fn ready_revalidation_reports_settled() {
        let revalidation = Revalidation::ready(LoadOutcome::Fresh(json!(1)));
        // Shared futures only record their output once polled.
        futures::executor::block_on(revalidation.outcome());
        assert!(format!("{revalidation:?}").contains("settled: true"));
    }

    #[tokio::test]
    async fn spawned_revalidation_runs_without_being_awaited() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let _revalidation = Revalidation::spawn(async move {
            let _ = tx.send(());
            LoadOutcome::Fresh(json!(null))
        });

        rx.await.expect("load should run eagerly");
    }

    fn exploding_load() -> LoadOutcome {
        panic!("load exploded")
    }

    #[tokio::test]
    async fn panicking_load_becomes_failure() {
        let revalidation = Revalidation::spawn(async { exploding_load() });
        assert!(matches!(revalidation.outcome().await, LoadOutcome::Failed(_)));
    }
}
