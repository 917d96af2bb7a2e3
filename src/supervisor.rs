//! Task supervision and shutdown coordination.
//!
//! Every connection task and every broadcast fan-out runs under the
//! [`Supervisor`]. On shutdown the supervisor cancels its token, which
//! tells each connection task to deregister and close, and then waits for
//! all tracked tasks to finish.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;

/// Owner of the process-wide shutdown signal and the set of live tasks.
///
/// Cloning is cheap and every clone refers to the same token and tracker.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl Supervisor {
    /// Creates a supervisor with no tasks and an un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token that is cancelled when shutdown begins.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Returns `true` once [`Supervisor::shutdown`] has been called.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Spawns `future` on the runtime as a tracked task.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.tasks.spawn(future));
    }

    /// Returns a guard that keeps shutdown waiting until it is dropped.
    ///
    /// Used for work that some other component spawns, such as the
    /// WebSocket upgrade callback: take the guard before handing the work
    /// off and move it into the spawned future.
    #[must_use]
    pub fn guard(&self) -> TaskTrackerToken {
        self.tasks.token()
    }

    /// Returns the number of tracked tasks still running.
    #[must_use]
    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Cancels the shutdown token and waits up to `grace` for every tracked
    /// task to finish.
    ///
    /// Returns `true` if all tasks finished within the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        tracing::info!(tasks = self.tasks.len(), "shutting down supervised tasks");
        self.shutdown.cancel();
        self.tasks.close();

        if tokio::time::timeout(grace, self.tasks.wait()).await.is_ok() {
            tracing::info!("all supervised tasks finished");
            true
        } else {
            tracing::warn!(
                remaining = self.tasks.len(),
                grace_secs = grace.as_secs(),
                "supervised tasks still running after grace period"
            );
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test]
    async fn shutdown_waits_for_cancellation_aware_tasks() {
        let supervisor = Supervisor::new();
        let cleaned_up = Arc::new(AtomicBool::new(false));

        let token = supervisor.shutdown_token();
        let flag = Arc::clone(&cleaned_up);
        supervisor.spawn(async move {
            token.cancelled().await;
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(supervisor.active_tasks(), 1);

        assert!(supervisor.shutdown(Duration::from_secs(1)).await);
        assert!(cleaned_up.load(Ordering::SeqCst));
        assert!(supervisor.is_shutting_down());
    }

    #[tokio::test]
    async fn shutdown_gives_up_after_grace() {
        let supervisor = Supervisor::new();
        supervisor.spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        assert!(!supervisor.shutdown(Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn guard_counts_until_dropped() {
        let supervisor = Supervisor::new();
        let guard = supervisor.guard();
        assert_eq!(supervisor.active_tasks(), 1);

        let waiter = supervisor.clone();
        let shutdown = tokio::spawn(async move { waiter.shutdown(Duration::from_secs(1)).await });
        tokio::task::yield_now().await;
        drop(guard);

        let Ok(finished) = shutdown.await else {
            panic!("shutdown task panicked");
        };
        assert!(finished);
        assert_eq!(supervisor.active_tasks(), 0);
    }
}
