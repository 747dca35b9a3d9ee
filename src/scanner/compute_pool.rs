// =============================================================================
// Bounded compute pool
// =============================================================================
//
// Signal evaluation is CPU-bound and must not run on the async workers that
// drive the fetches. Jobs are offloaded with `spawn_blocking`, gated by a
// semaphore so that at most `workers` evaluations run at once regardless of
// how many fetches complete together.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct ComputePool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl ComputePool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` on the blocking pool once a worker slot is free. A panic in
    /// `job` surfaces as an error.
    pub async fn run<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .context("compute pool is closed")?;
        tokio::task::spawn_blocking(job)
            .await
            .context("compute job panicked or was cancelled")
    }
}
