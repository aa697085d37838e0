// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logging of cache activity.
//!
//! When the `logs` feature is enabled, every notable step of the loader, the binder and
//! the invalidation service is emitted as a `tracing` event named `swrcache.activity`
//! with the activity name and the cache key as fields.

use std::fmt::Display;

use swrcache_adapter::CacheKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    ShortCircuit,
    Stored,
    WriteFailed,
    Revalidated,
    Redirected,
    RevalidationFailed,
    Superseded,
    Discarded,
    Invalidated,
    Configured,
}

impl CacheActivity {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::ShortCircuit => "cache.short_circuit",
            Self::Stored => "cache.stored",
            Self::WriteFailed => "cache.write_failed",
            Self::Revalidated => "cache.revalidated",
            Self::Redirected => "cache.redirected",
            Self::RevalidationFailed => "cache.revalidation_failed",
            Self::Superseded => "cache.superseded",
            Self::Discarded => "cache.discarded",
            Self::Invalidated => "cache.invalidated",
            Self::Configured => "cache.configured",
        }
    }
}

#[cfg(feature = "logs")]
macro_rules! emit {
    ($level:expr, $activity:expr, $key:expr) => {
        tracing::event!(
            name: "swrcache.activity",
            $level,
            cache.activity = $activity.as_str(),
            cache.key = %$key,
        )
    };
    ($level:expr, $activity:expr, $key:expr, $error:expr) => {
        tracing::event!(
            name: "swrcache.activity",
            $level,
            cache.activity = $activity.as_str(),
            cache.key = %$key,
            error = %$error,
        )
    };
}

#[cfg_attr(not(feature = "logs"), expect(unused_variables, reason = "unused when logs feature not used"))]
pub(crate) fn record(activity: CacheActivity, key: &CacheKey) {
    #[cfg(feature = "logs")]
    match activity {
        CacheActivity::Hit
        | CacheActivity::Miss
        | CacheActivity::ShortCircuit
        | CacheActivity::Stored
        | CacheActivity::Superseded
        | CacheActivity::Discarded => emit!(tracing::Level::DEBUG, activity, key),
        CacheActivity::Revalidated | CacheActivity::Redirected | CacheActivity::Invalidated | CacheActivity::Configured => {
            emit!(tracing::Level::INFO, activity, key);
        }
        CacheActivity::RevalidationFailed | CacheActivity::WriteFailed => emit!(tracing::Level::WARN, activity, key),
    }
}

#[cfg_attr(not(feature = "logs"), expect(unused_variables, reason = "unused when logs feature not used"))]
pub(crate) fn record_failure(activity: CacheActivity, key: &CacheKey, error: &dyn Display) {
    #[cfg(feature = "logs")]
    emit!(tracing::Level::WARN, activity, key, error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_names_are_stable() {
        assert_eq!(CacheActivity::Hit.as_str(), "cache.hit");
        assert_eq!(CacheActivity::Miss.as_str(), "cache.miss");
        assert_eq!(CacheActivity::ShortCircuit.as_str(), "cache.short_circuit");
        assert_eq!(CacheActivity::Stored.as_str(), "cache.stored");
        assert_eq!(CacheActivity::WriteFailed.as_str(), "cache.write_failed");
        assert_eq!(CacheActivity::Revalidated.as_str(), "cache.revalidated");
        assert_eq!(CacheActivity::Redirected.as_str(), "cache.redirected");
        assert_eq!(CacheActivity::RevalidationFailed.as_str(), "cache.revalidation_failed");
        assert_eq!(CacheActivity::Superseded.as_str(), "cache.superseded");
        assert_eq!(CacheActivity::Discarded.as_str(), "cache.discarded");
        assert_eq!(CacheActivity::Invalidated.as_str(), "cache.invalidated");
        assert_eq!(CacheActivity::Configured.as_str(), "cache.configured");
    }

    #[test]
    fn recording_without_subscriber_is_a_no_op() {
        let key = CacheKey::from("/k");
        record(CacheActivity::Hit, &key);
        record(CacheActivity::RevalidationFailed, &key);
        record_failure(CacheActivity::RevalidationFailed, &key, &"boom");
    }
}
