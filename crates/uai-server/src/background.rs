//! Supervisor for fire-and-forget work such as welcome emails.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};

/// Tracks detached tasks so shutdown can wait for them.
///
/// Tasks run outside the request that spawned them. Once
/// [`BackgroundTasks::shutdown`] starts, new tasks are refused.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    tasks: Mutex<JoinSet<()>>,
    closed: AtomicBool,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawn `task` unless shutdown has begun. Returns whether it was spawned.
    pub fn spawn<F>(&self, name: &'static str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // `shutdown` flips `closed` under the same lock, so a task is either
        // refused or lands in the set that shutdown takes.
        let mut tasks = self.tasks();
        if self.inner.closed.load(Ordering::SeqCst) {
            drop(tasks);
            tracing::warn!(task = name, "background task refused during shutdown");
            return false;
        }

        while let Some(finished) = tasks.try_join_next() {
            log_join(finished);
        }
        tasks.spawn(task);
        tracing::debug!(task = name, pending = tasks.len(), "background task spawned");
        true
    }

    /// Tasks spawned and not yet reaped.
    pub fn pending(&self) -> usize {
        self.tasks().len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Wait for every task spawned so far, without closing.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks());
        while let Some(finished) = tasks.join_next().await {
            log_join(finished);
        }
    }

    /// Stop accepting tasks, wait up to `grace` for running ones, then abort
    /// the rest. Returns how many tasks were aborted.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        let mut tasks = {
            let mut guard = self.tasks();
            self.inner.closed.store(true, Ordering::SeqCst);
            std::mem::take(&mut *guard)
        };

        if tasks.is_empty() {
            return 0;
        }
        tracing::info!(pending = tasks.len(), grace_ms = grace.as_millis() as u64, "waiting for background tasks");

        let drained = tokio::time::timeout(grace, async {
            while let Some(finished) = tasks.join_next().await {
                log_join(finished);
            }
        })
        .await;

        if drained.is_ok() {
            return 0;
        }

        let abandoned = tasks.len();
        tracing::warn!(abandoned, "grace period elapsed, aborting background tasks");
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
        abandoned
    }
}

fn log_join(result: Result<(), JoinError>) {
    if let Err(err) = result {
        if err.is_panic() {
            tracing::error!(error = %err, "background task panicked");
        }
    }
}
