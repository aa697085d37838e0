// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `InMemoryAdapter`.

use serde_json::json;
use swrcache_adapter::{CacheAdapter, CacheKey, DynamicAdapterExt, Error};
use swrcache_memory::InMemoryAdapter;

type TestResult = Result<(), Error>;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

#[test]
fn get_absent_key_is_none() -> TestResult {
    block_on(async {
        let adapter = InMemoryAdapter::new();
        assert!(adapter.get(&CacheKey::from("/missing")).await?.is_none());
        Ok(())
    })
}

#[test]
fn set_then_get_yields_equal_value() -> TestResult {
    block_on(async {
        let adapter = InMemoryAdapter::default();
        let key = CacheKey::from("/users/2");
        let value = json!({"user": {"id": 2, "name": "Ervin Howell", "website": "anastasia.net"}});

        adapter.set(&key, value.clone()).await?;
        assert_eq!(adapter.get(&key).await?, Some(value));
        Ok(())
    })
}

#[test]
fn set_replaces_previous_value() -> TestResult {
    block_on(async {
        let adapter = InMemoryAdapter::new();
        let key = CacheKey::from("/k");

        adapter.set(&key, json!("old")).await?;
        adapter.set(&key, json!("new")).await?;

        assert_eq!(adapter.get(&key).await?, Some(json!("new")));
        Ok(())
    })
}

#[test]
fn remove_is_idempotent() -> TestResult {
    block_on(async {
        let adapter = InMemoryAdapter::new();
        let key = CacheKey::from("/k");

        adapter.set(&key, json!(1)).await?;
        adapter.remove(&key).await?;
        adapter.remove(&key).await?;

        assert!(adapter.get(&key).await?.is_none());
        assert!(!adapter.contains_key(&key));
        Ok(())
    })
}

#[test]
fn works_behind_dynamic_adapter() -> TestResult {
    block_on(async {
        let adapter = InMemoryAdapter::new();
        let dynamic = adapter.clone().into_dynamic();
        let key = CacheKey::from("/dyn");

        dynamic.set(&key, json!([1, 2, 3])).await?;
        assert_eq!(adapter.get(&key).await?, Some(json!([1, 2, 3])));
        Ok(())
    })
}
