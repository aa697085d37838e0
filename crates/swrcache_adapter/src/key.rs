// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{borrow::Borrow, fmt};

/// Identifies the logical resource a piece of cached page data belongs to.
///
/// The same logical resource must map to the same key across loading and
/// invalidation. Keys are usually derived from a request URL but may be supplied
/// explicitly by the caller.
///
/// # Examples
///
/// ```
/// use swrcache_adapter::CacheKey;
///
/// let key = CacheKey::new("/users/2?tab=posts");
/// assert_eq!(key.as_str(), "/users/2?tab=posts");
/// assert_eq!(key, CacheKey::from("/users/2?tab=posts"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<&CacheKey> for CacheKey {
    fn from(key: &CacheKey) -> Self {
        key.clone()
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn display_matches_inner_string() {
        let key = CacheKey::new("/a?b=1#c");
        assert_eq!(key.to_string(), "/a?b=1#c");
        assert_eq!(key.into_string(), "/a?b=1#c");
    }

    #[test]
    fn borrow_allows_str_lookup() {
        let mut map = HashMap::new();
        map.insert(CacheKey::from("/users"), 1);
        assert_eq!(map.get("/users"), Some(&1));
    }
}
