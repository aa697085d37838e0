// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Outcomes of an authoritative load.

use std::{fmt, sync::Arc};

use http::StatusCode;
use serde_json::Value;

use crate::Error;

/// What an authoritative load produced.
///
/// Loads do not signal redirects by failing. A redirect is a regular outcome that the
/// cache either returns to the caller (on a cache miss) or hands to the
/// [`Host`][crate::Host] for navigation (during background revalidation).
#[derive(Clone, Debug)]
pub enum LoadOutcome {
    /// Authoritative data for the requested resource.
    Fresh(Value),
    /// The resource lives elsewhere; navigation should follow.
    Redirect(Redirect),
    /// The load failed.
    Failed(LoadError),
}

impl LoadOutcome {
    /// Converts the outcome into the data it carries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Redirect`] or [`Error::Load`] for the non-data outcomes.
    pub fn into_result(self) -> Result<Value, Error> {
        match self {
            Self::Fresh(value) => Ok(value),
            Self::Redirect(redirect) => Err(Error::Redirect(redirect)),
            Self::Failed(error) => Err(Error::Load(error)),
        }
    }
}

impl From<Value> for LoadOutcome {
    fn from(value: Value) -> Self {
        Self::Fresh(value)
    }
}

impl From<Redirect> for LoadOutcome {
    fn from(redirect: Redirect) -> Self {
        Self::Redirect(redirect)
    }
}

impl From<LoadError> for LoadOutcome {
    fn from(error: LoadError) -> Self {
        Self::Failed(error)
    }
}

/// A redirect signal: a target location and a 3xx status.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use swrcache::Redirect;
///
/// let redirect = Redirect::found("/login");
/// assert_eq!(redirect.location(), "/login");
/// assert_eq!(redirect.status(), StatusCode::FOUND);
///
/// assert!(Redirect::new("/elsewhere", StatusCode::OK).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    location: String,
    status: StatusCode,
}

impl Redirect {
    /// Creates a redirect, or `None` if `status` is not in the 3xx range.
    #[must_use]
    pub fn new(location: impl Into<String>, status: StatusCode) -> Option<Self> {
        status.is_redirection().then(|| Self {
            location: location.into(),
            status,
        })
    }

    /// Creates a `302 Found` redirect.
    #[must_use]
    pub fn found(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: StatusCode::FOUND,
        }
    }

    /// Creates a `303 See Other` redirect.
    #[must_use]
    pub fn see_other(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: StatusCode::SEE_OTHER,
        }
    }

    /// Returns the target location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the redirect status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// A failed authoritative load.
///
/// Cheap to clone, so that one failure can be observed by every consumer of a
/// pending revalidation.
#[derive(Clone)]
pub struct LoadError(Arc<dyn std::error::Error + Send + Sync + 'static>);

impl LoadError {
    /// Wraps an error or message.
    pub fn new(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(Arc::from(cause.into()))
    }
}

impl fmt::Debug for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LoadError").field(&self.0).finish()
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}
