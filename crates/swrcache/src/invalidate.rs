// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Removal of cached entries.

use swrcache_adapter::{CacheAdapter, CacheKey};

use crate::{
    Error,
    telemetry::{CacheActivity, record},
};

/// One or more cache keys to invalidate.
///
/// Built from a single key or from a collection of keys, so that callers can pass
/// whichever they have at hand.
///
/// # Examples
///
/// ```
/// use swrcache::{CacheKey, Keys};
///
/// assert_eq!(Keys::from("/users").len(), 1);
/// assert_eq!(Keys::from(["/users", "/user/1"]).len(), 2);
/// assert_eq!(Keys::from(vec![CacheKey::from("/a")]).len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keys(Vec<CacheKey>);

impl Keys {
    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the keys in the order they were given.
    pub fn iter(&self) -> impl Iterator<Item = &CacheKey> {
        self.0.iter()
    }
}

impl From<CacheKey> for Keys {
    fn from(key: CacheKey) -> Self {
        Self(vec![key])
    }
}

impl From<&CacheKey> for Keys {
    fn from(key: &CacheKey) -> Self {
        Self(vec![key.clone()])
    }
}

impl From<&str> for Keys {
    fn from(key: &str) -> Self {
        Self(vec![CacheKey::from(key)])
    }
}

impl From<String> for Keys {
    fn from(key: String) -> Self {
        Self(vec![CacheKey::from(key)])
    }
}

impl From<Vec<CacheKey>> for Keys {
    fn from(keys: Vec<CacheKey>) -> Self {
        Self(keys)
    }
}

impl From<&[CacheKey]> for Keys {
    fn from(keys: &[CacheKey]) -> Self {
        Self(keys.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Keys {
    fn from(keys: [&str; N]) -> Self {
        keys.into_iter().map(CacheKey::from).collect()
    }
}

impl<const N: usize> From<[CacheKey; N]> for Keys {
    fn from(keys: [CacheKey; N]) -> Self {
        Self(keys.into())
    }
}

impl<'a> IntoIterator for &'a Keys {
    type Item = &'a CacheKey;
    type IntoIter = std::slice::Iter<'a, CacheKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<CacheKey> for Keys {
    fn from_iter<I: IntoIterator<Item = CacheKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Keys {
    type Item = CacheKey;
    type IntoIter = std::vec::IntoIter<CacheKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Removes every given key from `adapter`.
///
/// Keys are removed one after another in the order given. Removing an absent key
/// succeeds, so invalidating twice has the same effect as invalidating once.
///
/// # Errors
///
/// Returns the first adapter failure; keys after the failing one are left untouched.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use swrcache::{CacheAdapter, CacheKey, InMemoryAdapter, invalidate};
///
/// # futures::executor::block_on(async {
/// let adapter = InMemoryAdapter::new();
/// adapter.set(&CacheKey::from("/users"), json!([])).await?;
///
/// invalidate(&adapter, ["/users", "/user/1"]).await?;
/// assert_eq!(adapter.get(&CacheKey::from("/users")).await?, None);
/// # Ok::<(), swrcache::Error>(())
/// # });
/// ```
pub async fn invalidate<A>(adapter: &A, keys: impl Into<Keys>) -> Result<(), Error>
where
    A: CacheAdapter,
{
    for key in keys.into() {
        adapter.remove(&key).await?;
        record(CacheActivity::Invalidated, &key);
    }

    Ok(())
}
