// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{LoadError, Redirect};

/// The result for fallible cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error from a cache operation.
///
/// A missing cache entry is never an error; it is the miss branch of the loader.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The adapter failed to read, write or remove an entry.
    #[error(transparent)]
    Adapter(#[from] swrcache_adapter::Error),

    /// The authoritative load failed while populating a cache miss.
    #[error("authoritative load failed: {0}")]
    Load(#[source] LoadError),

    /// The authoritative load redirected while populating a cache miss.
    #[error("authoritative load redirected to {} ({})", .0.location(), .0.status())]
    Redirect(Redirect),

    /// The global adapter binding was already configured.
    #[error("the cache adapter has already been configured")]
    AlreadyConfigured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Error: Send, Sync);
    }

    #[test]
    fn adapter_error_is_transparent() {
        let error = Error::from(swrcache_adapter::Error::from_message("store offline"));
        assert_eq!(error.to_string(), "store offline");
    }

    #[test]
    fn redirect_display_names_location() {
        let error = Error::Redirect(Redirect::found("/login"));
        assert_eq!(error.to_string(), "authoritative load redirected to /login (302 Found)");
    }

    #[test]
    fn load_error_keeps_source() {
        let error = Error::Load(LoadError::new("timeout"));
        assert_eq!(error.to_string(), "authoritative load failed: timeout");
        assert!(std::error::Error::source(&error).is_some());
    }
}
