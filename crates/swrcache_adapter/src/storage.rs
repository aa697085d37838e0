// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Adapter over a synchronous string store.

use serde_json::Value;

use crate::{CacheAdapter, CacheKey, Error, KeyValueStore};

/// The result of decoding a stored string.
///
/// Stores may contain values that were not written by a [`StorageAdapter`], such as
/// plain strings set by other code. Those are surfaced as [`Decoded::Raw`] instead of
/// failing the read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// The stored string was valid JSON.
    Parsed(Value),
    /// The stored string was not valid JSON and is returned unchanged.
    Raw(String),
}

impl Decoded {
    /// Decodes a stored string, falling back to the raw string on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use swrcache_adapter::Decoded;
    ///
    /// assert_eq!(Decoded::decode(r#"{"a":1}"#.to_string()), Decoded::Parsed(json!({"a": 1})));
    /// assert_eq!(Decoded::decode("plain".to_string()), Decoded::Raw("plain".to_string()));
    /// ```
    #[must_use]
    pub fn decode(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => Self::Parsed(value),
            Err(_) => Self::Raw(raw),
        }
    }

    /// Returns `true` if decoding fell back to the raw string.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Converts into a cache value. Raw strings become JSON strings.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Parsed(value) => value,
            Self::Raw(raw) => Value::String(raw),
        }
    }
}

/// A [`CacheAdapter`] over a synchronous [`KeyValueStore`].
///
/// Values are encoded as JSON strings on `set`. On `get` the stored string is decoded
/// and, if it is not valid JSON, returned as a raw string value. Decoding never
/// fails the read.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use swrcache_adapter::{CacheAdapter, CacheKey, KeyValueStore, MemoryStore, StorageAdapter};
/// # futures::executor::block_on(async {
///
/// let store = MemoryStore::new();
/// let adapter = StorageAdapter::new(store.clone());
/// let key = CacheKey::from("/users/2");
///
/// adapter.set(&key, json!({"name": "Ervin"})).await?;
/// assert_eq!(store.get_item("/users/2")?, Some(r#"{"name":"Ervin"}"#.to_string()));
/// assert_eq!(adapter.get(&key).await?, Some(json!({"name": "Ervin"})));
/// # Ok::<(), swrcache_adapter::Error>(())
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct StorageAdapter<S> {
    store: S,
}

impl<S> StorageAdapter<S>
where
    S: KeyValueStore,
{
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the adapter and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Reads `key` and reports whether decoding succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. Decoding failures are reported
    /// as [`Decoded::Raw`], not as errors.
    pub fn get_decoded(&self, key: &CacheKey) -> Result<Option<Decoded>, Error> {
        Ok(self.store.get_item(key.as_str())?.map(Decoded::decode))
    }
}

impl<S> CacheAdapter for StorageAdapter<S>
where
    S: KeyValueStore,
{
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, Error> {
        Ok(self.get_decoded(key)?.map(Decoded::into_value))
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<(), Error> {
        let encoded = serde_json::to_string(&value).map_err(Error::encode)?;
        self.store.set_item(key.as_str(), encoded)
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), Error> {
        self.store.remove_item(key.as_str())
    }
}
