//! Default [`WorkerPool`]: fire-and-forget dispatch onto the ambient tokio
//! runtime via `tokio::spawn`, mirroring the teacher's listener/agent
//! dispatch jobs (each independently spawned, errors logged, never joined).

use chronofuture_kernel::WorkerPool;
use futures::future::BoxFuture;

pub struct LocalWorkerPool;

impl LocalWorkerPool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalWorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerPool for LocalWorkerPool {
    fn spawn(&self, job: BoxFuture<'static, ()>) {
        tokio::spawn(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn spawned_job_runs() {
        let pool = LocalWorkerPool::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = ran.clone();
        pool.spawn(Box::pin(async move {
            ran2.store(true, Ordering::SeqCst);
        }));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
