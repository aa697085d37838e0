// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for adapter operations.

/// An error from a cache adapter operation.
///
/// This is an opaque error type. Adapters backed by third-party storage wrap their
/// failures with [`Error::from_message`]; use [`std::error::Error::source()`] to get
/// at the underlying cause.
///
/// A value that cannot be decoded is *not* an error: see
/// [`Decoded::Raw`][crate::Decoded::Raw].
///
/// # Example
///
/// ```
/// use swrcache_adapter::Error;
///
/// let error = Error::from_message("quota exceeded");
/// assert_eq!(error.to_string(), "quota exceeded");
/// ```
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(ErrorKind);

#[derive(Debug, thiserror::Error)]
enum ErrorKind {
    #[error("failed to encode cache value")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Creates a new error from any type that can be converted to an error.
    ///
    /// This is the public API for creating adapter errors from external crates.
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(ErrorKind::Other(cause.into()))
    }

    pub(crate) fn encode(error: serde_json::Error) -> Self {
        Self(ErrorKind::Encode(error))
    }

    /// Returns `true` if the error was raised while encoding a value for storage.
    #[must_use]
    pub fn is_encode(&self) -> bool {
        matches!(self.0, ErrorKind::Encode(_))
    }
}

/// A specialized [`Result`] type for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;
