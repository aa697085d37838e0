// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A stale-while-revalidate cache for page data.
//!
//! Navigating to a page whose data was seen before shows the cached data at once and
//! refreshes it in the background. When the fresh data arrives it is written back to
//! the cache and swapped into the live view.
//!
//! The crate provides:
//! - [`load_through_cache`], which serves cached data and starts a background
//!   [`Revalidation`] on a hit, or loads and stores data on a miss
//! - [`LiveBinder`], which reconciles successive [`LoaderEnvelope`]s into one value
//!   that a long-lived view can subscribe to
//! - [`SwrView`], which renders an envelope as an interim view followed by the
//!   revalidated one
//! - [`invalidate`] and [`decache_action`] for dropping entries after mutations
//! - [`AdapterRegistry`], the replaceable binding to a storage adapter
//!
//! Storage is pluggable through [`CacheAdapter`]. The default binding is a
//! process-local in-memory adapter.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use swrcache::{AdapterRegistry, LoadOptions, LoadOutcome, LoadError, LiveBinder, Host, load_through_cache};
//! use url::Url;
//!
//! struct App;
//!
//! impl Host for App {
//!     fn navigate(&self, location: &str) {
//!         println!("navigating to {location}");
//!     }
//!
//!     fn report(&self, error: LoadError) {
//!         eprintln!("refresh failed: {error}");
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = AdapterRegistry::with_memory();
//! let binder = LiveBinder::with_registry(&registry, App);
//! let url = Url::parse("https://example.com/users")?;
//! let options = LoadOptions::new().registry(&registry);
//!
//! // First visit: nothing cached, the load runs in the foreground.
//! let envelope = load_through_cache(&url, || async { LoadOutcome::Fresh(json!(["Leanne"])) }, options.clone()).await?;
//! assert_eq!(binder.on_envelope(&envelope).data(), &json!(["Leanne"]));
//!
//! // Second visit: cached data is shown at once and refreshed in the background.
//! let envelope = load_through_cache(&url, || async { LoadOutcome::Fresh(json!(["Leanne", "Ervin"])) }, options).await?;
//! assert_eq!(binder.on_envelope(&envelope).data(), &json!(["Leanne"]));
//!
//! binder.settled().await;
//! assert_eq!(binder.current(), Some(json!(["Leanne", "Ervin"])));
//! # Ok(())
//! # }
//! ```

mod binder;
mod envelope;
mod error;
mod invalidate;
mod key;
mod loader;
mod outcome;
mod registry;
mod runtime;
mod telemetry;
mod view;

#[doc(inline)]
pub use binder::{Bound, Host, LiveBinder};
#[doc(inline)]
pub use envelope::{EnvelopeId, LoaderEnvelope, Revalidation};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use invalidate::{Keys, invalidate};
#[doc(inline)]
pub use key::derive_key;
#[doc(inline)]
pub use loader::{CachedLoader, LoadMode, LoadOptions, decache_action, load_through_cache};
#[doc(inline)]
pub use outcome::{LoadError, LoadOutcome, Redirect};
#[doc(inline)]
pub use registry::{AdapterRegistry, AdapterSource, ExecutionContext, create_cache_adapter};
#[doc(inline)]
pub use swrcache_adapter::{CacheAdapter, CacheKey, DynamicAdapter, DynamicAdapterExt, KeyValueStore, MemoryStore, StorageAdapter};
#[doc(inline)]
pub use swrcache_memory::InMemoryAdapter;
#[doc(inline)]
pub use view::{Rendered, SwrView};
