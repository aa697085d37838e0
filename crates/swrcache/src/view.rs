// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rendering of envelopes that may still be revalidating.

use std::fmt::{self, Debug};

use futures::{
    FutureExt, StreamExt,
    future::BoxFuture,
    stream::{self, BoxStream},
};
use serde_json::Value;

use crate::{Error, LoaderEnvelope, Revalidation};

/// Renders an envelope, suspending on its revalidation if it has one.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use swrcache::{LoaderEnvelope, Rendered, SwrView};
///
/// let envelope = LoaderEnvelope::new("/users", json!(["a"]), None);
/// let rendered = SwrView::from(&envelope).render(|users| users.to_string());
///
/// assert!(matches!(rendered, Rendered::Ready(ref view) if view == r#"["a"]"#));
/// ```
#[derive(Clone, Debug)]
pub struct SwrView {
    server_data: Value,
    deferred: Option<Revalidation>,
}

impl From<&LoaderEnvelope> for SwrView {
    fn from(envelope: &LoaderEnvelope) -> Self {
        Self {
            server_data: envelope.server_data().clone(),
            deferred: envelope.deferred_server_data().cloned(),
        }
    }
}

impl SwrView {
    /// Renders the envelope with `render_with`.
    ///
    /// Without a revalidation the result is [`Rendered::Ready`]. With one, the current
    /// data is rendered as the fallback and the revalidated data is rendered once it
    /// arrives.
    pub fn render<T, F>(&self, render_with: F) -> Rendered<T>
    where
        F: Fn(&Value) -> T + Send + 'static,
        T: Send + 'static,
    {
        let fallback = render_with(&self.server_data);

        match &self.deferred {
            None => Rendered::Ready(fallback),
            Some(revalidation) => {
                let revalidation = revalidation.clone();
                Rendered::Suspended {
                    fallback,
                    resume: async move { revalidation.resolve().await.map(|value| render_with(&value)) }.boxed(),
                }
            }
        }
    }
}

/// A rendered view, possibly waiting for fresher data.
pub enum Rendered<T> {
    /// The final view.
    Ready(T),
    /// An interim view and the future producing the final one.
    Suspended {
        /// The view rendered from the data available now.
        fallback: T,
        /// Produces the view rendered from the revalidated data.
        resume: BoxFuture<'static, Result<T, Error>>,
    },
}

impl<T> Rendered<T>
where
    T: Send + 'static,
{
    /// Returns the view to show right now.
    #[must_use]
    pub fn current(&self) -> &T {
        match self {
            Self::Ready(view) | Self::Suspended { fallback: view, .. } => view,
        }
    }

    /// Returns `true` if a fresher view is still on its way.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended { .. })
    }

    /// Waits for the final view.
    ///
    /// # Errors
    ///
    /// Returns the revalidation's redirect or failure.
    pub async fn settle(self) -> Result<T, Error> {
        match self {
            Self::Ready(view) => Ok(view),
            Self::Suspended { resume, .. } => resume.await,
        }
    }

    /// Yields every view in order: the interim one first, then the final one.
    ///
    /// A ready view yields once.
    pub fn into_stream(self) -> BoxStream<'static, Result<T, Error>> {
        match self {
            Self::Ready(view) => stream::once(async move { Ok(view) }).boxed(),
            Self::Suspended { fallback, resume } => stream::once(async move { Ok(fallback) }).chain(stream::once(resume)).boxed(),
        }
    }
}

impl<T: Debug> Debug for Rendered<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(view) => f.debug_tuple("Ready").field(view).finish(),
            Self::Suspended { fallback, .. } => f.debug_struct("Suspended").field("fallback", fallback).finish_non_exhaustive(),
        }
    }
}
