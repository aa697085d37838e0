// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Storage adapter abstractions for the `swrcache` page-data cache.
//!
//! This crate defines the [`CacheAdapter`] trait that every storage backend must
//! satisfy, the [`CacheKey`] that addresses cached page data, and the [`Error`] type
//! for fallible adapter operations.
//!
//! Cached values are JSON-like [`serde_json::Value`]s. An adapter has no notion of
//! expiry: presence of a value alone means it is fresh enough to show immediately.
//!
//! # Implementing an Adapter
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//!
//! use serde_json::Value;
//! use swrcache_adapter::{CacheAdapter, CacheKey, Error};
//!
//! struct SimpleAdapter(Mutex<HashMap<CacheKey, Value>>);
//!
//! impl CacheAdapter for SimpleAdapter {
//!     async fn get(&self, key: &CacheKey) -> Result<Option<Value>, Error> {
//!         Ok(self.0.lock().unwrap().get(key).cloned())
//!     }
//!
//!     async fn set(&self, key: &CacheKey, value: Value) -> Result<(), Error> {
//!         self.0.lock().unwrap().insert(key.clone(), value);
//!         Ok(())
//!     }
//!
//!     async fn remove(&self, key: &CacheKey) -> Result<(), Error> {
//!         self.0.lock().unwrap().remove(key);
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Synchronous Stores
//!
//! Key/value stores that only deal in strings implement [`KeyValueStore`] and are
//! wrapped in a [`StorageAdapter`], which encodes values as JSON on the way in and
//! decodes them on the way out, falling back to the raw string when decoding fails.

mod adapter;
mod dynamic;
pub mod error;
mod key;
mod storage;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use adapter::CacheAdapter;
#[doc(inline)]
pub use dynamic::{DynamicAdapter, DynamicAdapterExt};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use key::CacheKey;
#[doc(inline)]
pub use storage::{Decoded, StorageAdapter};
#[doc(inline)]
pub use store::{KeyValueStore, MemoryStore};
