//! Detached work that outlives the request that started it.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Tracks fire-and-forget tasks so shutdown can wait for them.
///
/// Task errors are logged, never returned. Once [`shutdown`](Self::shutdown)
/// starts, new tasks are refused; tasks still running after the grace period
/// are cancelled.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
    cancellation: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a detached task.
    ///
    /// # Returns
    /// `false` if shutdown has begun and the task was dropped unstarted
    pub fn spawn<F, E>(&self, name: &'static str, task: F) -> bool
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        if self.tracker.is_closed() {
            tracing::warn!(task = name, "Background task refused during shutdown");
            return false;
        }

        let cancellation = self.cancellation.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    tracing::warn!(task = name, "Background task cancelled");
                }
                result = task => match result {
                    Ok(()) => tracing::debug!(task = name, "Background task completed"),
                    Err(e) => tracing::warn!(task = name, error = %e, "Background task failed"),
                },
            }
        });

        true
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Stop accepting tasks and wait for the running ones.
    ///
    /// # Returns
    /// `true` if every task finished within `grace`, `false` if some had to
    /// be cancelled
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        tracing::info!(
            outstanding = self.tracker.len(),
            grace_ms = grace.as_millis() as u64,
            "Draining background tasks"
        );

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            return true;
        }

        tracing::warn!(
            outstanding = self.tracker.len(),
            "Grace period elapsed, cancelling background tasks"
        );
        self.cancellation.cancel();
        self.tracker.wait().await;
        false
    }
}
