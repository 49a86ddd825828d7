//! Scheduler for bounded, order-preserving fan-out
//!
//! This module handles:
//! - Limiting how many detail pages are fetched at once via a semaphore
//! - Tagging every task with its card index
//! - Reassembling results in card order before they are appended
//!
//! All tasks run cooperatively on the calling task; nothing is spawned.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Scheduler for per-card work on one listing page
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Semaphore bounding in-flight tasks
    semaphore: Arc<Semaphore>,

    /// Configured bound
    max_concurrent: usize,
}

impl Scheduler {
    /// Creates a scheduler allowing `max_concurrent` tasks at once
    ///
    /// A bound of 0 is treated as 1.
    pub fn new(max_concurrent: u32) -> Self {
        let max_concurrent = (max_concurrent as usize).max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Returns the configured bound
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Runs `task` for every input and returns the outputs in input order
    ///
    /// At most `max_concurrent` tasks are polled past their permit at any time.
    /// With a bound of 1 the tasks run strictly one after another.
    pub async fn run_ordered<I, T, F, Fut>(&self, inputs: Vec<I>, task: F) -> Vec<T>
    where
        F: Fn(usize, I) -> Fut,
        Fut: Future<Output = T>,
    {
        let tagged = inputs.into_iter().enumerate().map(|(index, input)| {
            let semaphore = Arc::clone(&self.semaphore);
            let work = task(index, input);
            async move {
                // The semaphore is never closed, so acquisition only waits
                let _permit = semaphore.acquire_owned().await.ok();
                (index, work.await)
            }
        });

        let mut results = join_all(tagged).await;
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, output)| output).collect()
    }
}
