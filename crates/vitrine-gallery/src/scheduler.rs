//! Upload scheduler: bounded worker count with a FIFO wait queue.
//!
//! Each image manager owns its scheduler, so limits never leak between galleries
//! (or between tests). Waiters are admitted in arrival order because
//! [`tokio::sync::Semaphore`] is fair.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use vitrine_core::constants::DEFAULT_MAX_CONCURRENT_UPLOADS;

/// Decrements its counter when dropped, so cancelled waiters do not leak counts.
struct CounterGuard<'a>(&'a AtomicUsize);

impl<'a> CounterGuard<'a> {
    fn increment(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for CounterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct UploadScheduler {
    semaphore: Arc<Semaphore>,
    max_workers: usize,
    queued: AtomicUsize,
    running: AtomicUsize,
    peak_running: AtomicUsize,
}

impl Default for UploadScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_UPLOADS)
    }
}

impl UploadScheduler {
    /// A scheduler running at most `max_workers` tasks at once (at least one).
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            queued: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
            peak_running: AtomicUsize::new(0),
        }
    }

    /// Wait for a worker slot, then run `task` to completion.
    pub async fn run<F>(&self, task: F) -> F::Output
    where
        F: Future,
    {
        let waiting = CounterGuard::increment(&self.queued);
        // The semaphore is never closed; a closed one would only lift the limit.
        let permit = self.semaphore.acquire().await.ok();
        drop(waiting);

        let _running = CounterGuard::increment(&self.running);
        let now_running = self.running.load(Ordering::SeqCst);
        self.peak_running.fetch_max(now_running, Ordering::SeqCst);

        tracing::trace!(
            running = now_running,
            queued = self.queue_len(),
            "Upload slot acquired"
        );

        let output = task.await;
        drop(permit);
        output
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Tasks waiting for a slot.
    pub fn queue_len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Tasks holding a slot.
    pub fn in_flight(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Highest number of tasks that ran at once since creation.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_running.load(Ordering::SeqCst)
    }
}
