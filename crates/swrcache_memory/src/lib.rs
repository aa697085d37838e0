// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process cache adapter backed by moka.
//!
//! This crate provides [`InMemoryAdapter`], the default adapter used by `swrcache`
//! when no other storage has been configured. Entries are never evicted or expired;
//! they live as long as the adapter does.
//!
//! # Quick Start
//!
//! ```
//! use serde_json::json;
//! use swrcache_adapter::{CacheAdapter, CacheKey};
//! use swrcache_memory::InMemoryAdapter;
//!
//! # futures::executor::block_on(async {
//! let adapter = InMemoryAdapter::new();
//! let key = CacheKey::from("/users/1");
//!
//! adapter.set(&key, json!({"name": "Leanne"})).await?;
//! assert_eq!(adapter.get(&key).await?, Some(json!({"name": "Leanne"})));
//! # Ok::<(), swrcache_adapter::Error>(())
//! # });
//! ```

mod adapter;

#[doc(inline)]
pub use adapter::InMemoryAdapter;
