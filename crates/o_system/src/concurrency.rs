//! Go-like task spawning for overlapping per-tick work.
//!
//! The scheduler's "think" step (`spec.md` §4.6 step 3) may run several
//! providers' `think` calls concurrently within a single tick. `TaskHandle`
//! and `spawn` give it a small, ergonomic surface for that without reaching
//! for unbounded parallelism — callers spawn exactly one task per
//! wake-ready entity, never an open-ended pool.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

pub use tokio::task::JoinError;

/// Handle to a spawned async task.
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    fn new(handle: JoinHandle<T>) -> Self {
        Self { inner: handle }
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Aborts the task. The task is cancelled at its next await point; has
    /// no effect if it has already completed. Used by the scheduler's
    /// watchdog to hard-cancel stalled work (`spec.md` §5).
    pub fn abort(&self) {
        self.inner.abort();
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

/// Spawns an async task and returns a handle to it.
pub fn spawn<F, T>(future: F) -> TaskHandle<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    TaskHandle::new(tokio::spawn(future))
}
