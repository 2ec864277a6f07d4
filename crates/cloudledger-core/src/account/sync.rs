//! Two-state (stopped/running) control for an account's periodic sync
//! task.
//!
//! Cancellation is deterministic: every stopper, concurrent ones
//! included, returns only after the task has fully finished — the task
//! holds a drop guard on a shared wind-down token, and stoppers that
//! find the task slot already taken wait on that token instead of
//! returning early. The tick loop races its body against the cancel
//! token, so an in-flight provider call is dropped before any cache
//! write when stop is requested.
//!
//! [`SyncControl::retire`] additionally tombstones the control: once an
//! account is removed, a racing start observes the tombstone under the
//! same lock and refuses, so no orphaned task can outlive its registry
//! entry.

use std::future::Future;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What [`SyncControl::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartOutcome {
    /// A new task was scheduled.
    Started,
    /// A task is already running; nothing was scheduled.
    AlreadyRunning,
    /// The control is retired (account removed); nothing was scheduled.
    Retired,
}

struct SyncTask {
    cancel: CancellationToken,
    done: CancellationToken,
    handle: JoinHandle<()>,
}

struct Inner {
    task: Option<SyncTask>,
    /// Wind-down signal of a task currently being stopped, for late
    /// stoppers to converge on.
    winddown: Option<CancellationToken>,
    retired: bool,
}

/// Running/stopped handle for one account's scheduled sync task.
pub(crate) struct SyncControl {
    inner: Mutex<Inner>,
}

impl SyncControl {
    pub(crate) const fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                task: None,
                winddown: None,
                retired: false,
            }),
        }
    }

    /// Build the tick loop via `make_loop` and spawn it, unless a task
    /// is already running or the control is retired.
    ///
    /// The retired check and the slot install happen under one lock,
    /// so a start racing [`retire`](Self::retire) either installs a
    /// task that retire then tears down, or observes the tombstone and
    /// schedules nothing.
    pub(crate) fn start<F, Fut>(&self, make_loop: F) -> StartOutcome
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.retired {
            return StartOutcome::Retired;
        }
        if inner.task.is_some() {
            return StartOutcome::AlreadyRunning;
        }
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();
        let tick_loop = make_loop(cancel.clone());
        let guard = done.clone().drop_guard();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            tick_loop.await;
        });
        inner.task = Some(SyncTask {
            cancel,
            done,
            handle,
        });
        StartOutcome::Started
    }

    /// Cancel the running task and wait for it to finish.
    ///
    /// Returns `false` when fully stopped already. A stopper that finds
    /// another stop in flight waits for the same wind-down signal, so
    /// no caller returns while a tick is still running.
    pub(crate) async fn stop(&self) -> bool {
        self.shutdown(false).await
    }

    /// Stop, and tombstone the control so it can never be started
    /// again. Called on account removal.
    pub(crate) async fn retire(&self) -> bool {
        self.shutdown(true).await
    }

    async fn shutdown(&self, retire: bool) -> bool {
        let (task, done) = {
            let mut inner = self.inner.lock();
            if retire {
                inner.retired = true;
            }
            if let Some(task) = inner.task.take() {
                inner.winddown = Some(task.done.clone());
                let done = task.done.clone();
                (Some(task), Some(done))
            } else {
                (None, inner.winddown.clone())
            }
        };
        let Some(done) = done else {
            return false;
        };
        if let Some(task) = task {
            task.cancel.cancel();
            if let Err(err) = task.handle.await {
                if err.is_panic() {
                    tracing::error!(%err, "periodic sync task panicked");
                }
            }
        }
        done.cancelled().await;
        let mut inner = self.inner.lock();
        if inner
            .winddown
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            inner.winddown = None;
        }
        true
    }

    pub(crate) fn is_running(&self) -> bool {
        self.inner.lock().task.is_some()
    }
}
