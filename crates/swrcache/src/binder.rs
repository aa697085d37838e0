// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Live reconciliation of loader envelopes with a long-lived view value.

use std::{
    fmt::{self, Debug},
    sync::Arc,
};

use parking_lot::Mutex;
use serde_json::Value;
use swrcache_adapter::{CacheAdapter, CacheKey, DynamicAdapter};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    AdapterRegistry, Error, LoadError, LoadOutcome, LoaderEnvelope, Revalidation,
    envelope::EnvelopeId,
    invalidate::invalidate,
    runtime,
    telemetry::{CacheActivity, record, record_failure},
};

/// The surrounding application, as seen by a [`LiveBinder`].
///
/// Background revalidations can end in a redirect or a failure long after the
/// envelope was handed out. The binder forwards both to the host.
pub trait Host: Send + Sync + 'static {
    /// Navigates to `location`.
    fn navigate(&self, location: &str);

    /// Surfaces a failed background revalidation.
    fn report(&self, error: LoadError);
}

/// What a [`LiveBinder`] returns for an envelope.
#[derive(Clone, Debug)]
pub struct Bound {
    data: Value,
    cache_key: CacheKey,
    adapter: DynamicAdapter,
}

impl Bound {
    /// Returns the reconciled value at the time the envelope was observed.
    ///
    /// Later changes are delivered through [`LiveBinder::subscribe`].
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consumes the binding and returns its data.
    #[must_use]
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Returns the cache key of the envelope.
    #[must_use]
    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }

    /// Removes the envelope's entry from the binder's adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Adapter`] if the entry cannot be removed.
    pub async fn invalidate(&self) -> Result<(), Error> {
        invalidate(&self.adapter, &self.cache_key).await
    }
}

#[derive(Debug, Default)]
struct Reconciler {
    generation: u64,
    last_envelope: Option<EnvelopeId>,
    disposed: bool,
}

struct Shared {
    state: Mutex<Reconciler>,
    value: watch::Sender<Option<Value>>,
}

impl Shared {
    fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Applies a revalidated value if the binder is live and no newer envelope arrived.
    fn apply(&self, generation: u64, value: Value) -> bool {
        let state = self.state.lock();
        if state.disposed || state.generation != generation {
            return false;
        }

        self.value.send_if_modified(|current| {
            if current.as_ref() == Some(&value) {
                false
            } else {
                *current = Some(value);
                true
            }
        });
        true
    }
}

/// Keeps one reconciled value in sync with successive loader envelopes.
///
/// A binder lives as long as the view that shows the data. It is fed every envelope
/// the loader produces for that view and reconciles them into a single value:
///
/// - The first envelope seeds the value with its `server_data`.
/// - Each new envelope carrying a revalidation gets exactly one waiter. When the
///   revalidation produces data, the waiter writes it to the adapter and applies it
///   to the value. A redirect is handed to [`Host::navigate`], a failure to
///   [`Host::report`].
/// - A new envelope whose `server_data` differs from the value replaces it.
///   Deep-equal data leaves the value untouched and notifies nobody.
/// - The latest envelope wins: once a newer envelope is observed, revalidations of
///   older ones still update the adapter but no longer touch the value.
///
/// Re-delivering an envelope that was already observed (a clone with the same
/// [id][LoaderEnvelope::id]) changes nothing.
///
/// After [`dispose`][Self::dispose], or once the binder is dropped, outstanding
/// revalidations still write to the adapter but nothing reaches the value or the
/// host.
pub struct LiveBinder {
    shared: Arc<Shared>,
    adapter: DynamicAdapter,
    host: Arc<dyn Host>,
    waiters: Mutex<Vec<JoinHandle<()>>>,
}

impl LiveBinder {
    /// Creates a binder that writes to the adapter bound in the global registry.
    pub fn new(host: impl Host) -> Self {
        Self::with_registry(AdapterRegistry::global(), host)
    }

    /// Creates a binder that writes to the adapter currently bound in `registry`.
    pub fn with_registry(registry: &AdapterRegistry, host: impl Host) -> Self {
        Self::with_adapter(registry.current(), host)
    }

    /// Creates a binder that writes to `adapter`.
    pub fn with_adapter(adapter: DynamicAdapter, host: impl Host) -> Self {
        let (value, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(Reconciler::default()),
                value,
            }),
            adapter,
            host: Arc::new(host),
            waiters: Mutex::new(Vec::new()),
        }
    }

    /// Observes an envelope and returns the reconciled binding.
    ///
    /// # Panics
    ///
    /// Waiters are spawned onto the current tokio runtime; observing an envelope with a
    /// pending revalidation outside of a runtime panics.
    pub fn on_envelope(&self, envelope: &LoaderEnvelope) -> Bound {
        let generation = {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return self.bound(envelope, envelope.server_data().clone());
            }

            if state.last_envelope == Some(envelope.id()) {
                None
            } else {
                state.last_envelope = Some(envelope.id());
                state.generation += 1;
                self.reconcile(envelope);
                Some(state.generation)
            }
        };

        if let (Some(generation), Some(revalidation)) = (generation, envelope.deferred_server_data()) {
            self.await_revalidation(generation, envelope.key().clone(), revalidation.clone());
        }

        self.bound(envelope, self.current().unwrap_or_else(|| envelope.server_data().clone()))
    }

    /// Returns the reconciled value, or `None` before the first envelope.
    #[must_use]
    pub fn current(&self) -> Option<Value> {
        self.shared.value.borrow().clone()
    }

    /// Subscribes to changes of the reconciled value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Value>> {
        self.shared.value.subscribe()
    }

    /// Waits until every revalidation observed so far has been handled.
    pub async fn settled(&self) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        for waiter in waiters {
            // Waiters do not panic; a cancelled runtime is the only other way out.
            let _ = waiter.await;
        }
    }

    /// Stops applying revalidations and calling the host.
    ///
    /// The last reconciled value stays readable. Revalidations already in flight still
    /// write to the adapter.
    pub fn dispose(&self) {
        self.shared.state.lock().disposed = true;
    }

    /// Returns `true` once the binder has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    fn bound(&self, envelope: &LoaderEnvelope, data: Value) -> Bound {
        Bound {
            data,
            cache_key: envelope.key().clone(),
            adapter: self.adapter.clone(),
        }
    }

    /// Seeds or supersedes the value. Called with the state lock held.
    fn reconcile(&self, envelope: &LoaderEnvelope) {
        let server_data = envelope.server_data();
        let key = envelope.key();

        self.shared.value.send_if_modified(|current| match current {
            Some(existing) if existing == server_data => false,
            Some(existing) => {
                *existing = server_data.clone();
                record(CacheActivity::Superseded, key);
                true
            }
            None => {
                *current = Some(server_data.clone());
                true
            }
        });
    }

    fn await_revalidation(&self, generation: u64, key: CacheKey, revalidation: Revalidation) {
        let shared = Arc::clone(&self.shared);
        let adapter = self.adapter.clone();
        let host = Arc::clone(&self.host);

        let waiter = runtime::spawn(async move {
            match revalidation.outcome().await {
                LoadOutcome::Fresh(value) => {
                    if let Err(error) = adapter.set(&key, value.clone()).await {
                        record_failure(CacheActivity::WriteFailed, &key, &error);
                        if !shared.is_disposed() {
                            host.report(LoadError::new(error));
                        }
                    }

                    if shared.apply(generation, value) {
                        record(CacheActivity::Revalidated, &key);
                    } else {
                        record(CacheActivity::Discarded, &key);
                    }
                }
                LoadOutcome::Redirect(redirect) => {
                    if shared.is_disposed() {
                        record(CacheActivity::Discarded, &key);
                    } else {
                        record(CacheActivity::Redirected, &key);
                        host.navigate(redirect.location());
                    }
                }
                LoadOutcome::Failed(error) => {
                    if shared.is_disposed() {
                        record(CacheActivity::Discarded, &key);
                    } else {
                        record_failure(CacheActivity::RevalidationFailed, &key, &error);
                        host.report(error);
                    }
                }
            }
        });

        let mut waiters = self.waiters.lock();
        waiters.retain(|waiter| !waiter.is_finished());
        waiters.push(waiter);
    }
}

impl Drop for LiveBinder {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Debug for LiveBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("LiveBinder")
            .field("generation", &state.generation)
            .field("disposed", &state.disposed)
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}
