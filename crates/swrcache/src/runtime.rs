// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Background task spawning.
//!
//! Revalidations and binder waiters run as detached tokio tasks so that they make
//! progress whether or not anybody is polling for their result.

use tokio::task::JoinHandle;

/// Spawns `work` onto the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside of a tokio runtime.
pub(crate) fn spawn<T>(work: T) -> JoinHandle<T::Output>
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    tokio::spawn(work)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawned_work_runs_to_completion() {
        let handle = spawn(async { 21 * 2 });
        assert_eq!(handle.await.expect("task should not panic"), 42);
    }

    #[tokio::test]
    async fn spawned_work_runs_without_being_awaited() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        drop(spawn(async move {
            let _ = tx.send("done");
        }));
        assert_eq!(rx.await.expect("sender should fire"), "done");
    }
}
