// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use swrcache_adapter::CacheKey;
use url::Url;

/// Derives the cache key for a request URL.
///
/// The key is the path followed by the query string and the fragment, each with its
/// natural `?` or `#` prefix and omitted when empty. Scheme, host and port are not part
/// of the key.
///
/// # Examples
///
/// ```
/// use swrcache::derive_key;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/user/2?tab=posts#top")?;
/// assert_eq!(derive_key(&url).as_str(), "/user/2?tab=posts#top");
/// # Ok::<(), url::ParseError>(())
/// ```
#[must_use]
pub fn derive_key(url: &Url) -> CacheKey {
    let mut key = String::from(url.path());

    if let Some(query) = url.query().filter(|query| !query.is_empty()) {
        key.push('?');
        key.push_str(query);
    }

    if let Some(fragment) = url.fragment().filter(|fragment| !fragment.is_empty()) {
        key.push('#');
        key.push_str(fragment);
    }

    CacheKey::from(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_for(url: &str) -> String {
        derive_key(&Url::parse(url).expect("valid url")).into_string()
    }

    #[test]
    fn path_only() {
        assert_eq!(key_for("https://example.com/users"), "/users");
        assert_eq!(key_for("https://example.com"), "/");
    }

    #[test]
    fn query_and_fragment_keep_their_order() {
        assert_eq!(key_for("https://example.com/a?x=1&y=2"), "/a?x=1&y=2");
        assert_eq!(key_for("https://example.com/a#section"), "/a#section");
        assert_eq!(key_for("https://example.com/a?x=1#section"), "/a?x=1#section");
    }

    #[test]
    fn empty_query_and_fragment_are_dropped() {
        assert_eq!(key_for("https://example.com/a?#"), "/a");
    }

    #[test]
    fn origin_is_not_part_of_the_key() {
        assert_eq!(
            key_for("https://one.example.com:8443/users/1"),
            key_for("http://two.example.com/users/1")
        );
    }

    #[test]
    fn is_deterministic() {
        let url = Url::parse("https://example.com/user/7?ref=nav").expect("valid url");
        assert_eq!(derive_key(&url), derive_key(&url));
    }
}
