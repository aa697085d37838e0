// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Synchronous string key/value stores.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::Error;

/// A synchronous key/value store holding strings.
///
/// This is the shape of browser-style local or session storage. Stores do not know
/// about structured values; wrap one in a [`StorageAdapter`][crate::StorageAdapter]
/// to use it as a [`CacheAdapter`][crate::CacheAdapter].
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw string stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set_item(&self, key: &str, value: String) -> Result<(), Error>;

    /// Removes the value stored under `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), Error>;
}

impl<T> KeyValueStore for Box<T>
where
    T: KeyValueStore + ?Sized,
{
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), Error> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        (**self).remove_item(key)
    }
}

impl<T> KeyValueStore for Arc<T>
where
    T: KeyValueStore + ?Sized,
{
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), Error> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        (**self).remove_item(key)
    }
}

/// An in-process [`KeyValueStore`].
///
/// Clones share the same items, so a clone can be kept around to inspect what an
/// adapter wrote.
///
/// # Examples
///
/// ```
/// use swrcache_adapter::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set_item("greeting", "hello".to_string())?;
/// assert_eq!(store.get_item("greeting")?, Some("hello".to_string()));
/// # Ok::<(), swrcache_adapter::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), Error> {
        self.items.lock().insert(key.to_owned(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.items.lock().remove(key);
        Ok(())
    }
}
