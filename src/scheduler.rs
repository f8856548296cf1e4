use crate::error::{CardstockError, CardstockResult};

/// Where construction work runs. Submission must not block the caller beyond
/// enqueueing the job.
pub trait BuildScheduler {
    fn spawn(&self, job: Box<dyn FnOnce() + Send + 'static>);
}

/// Bounded worker pool for construction work.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// `threads: None` uses the rayon default (one per core).
    pub fn new(threads: Option<usize>) -> CardstockResult<Self> {
        if let Some(n) = threads
            && n == 0
        {
            return Err(CardstockError::validation(
                "worker pool 'threads' must be >= 1 when set",
            ));
        }

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            CardstockError::scheduling(format!("failed to build worker thread pool: {e}"))
        })?;
        Ok(Self { pool })
    }
}

impl BuildScheduler for WorkerPool {
    fn spawn(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        self.pool.spawn(move || job());
    }
}

/// Runs each job on the calling thread before `spawn` returns. Deterministic,
/// for tests and fully synchronous hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineScheduler;

impl BuildScheduler for InlineScheduler {
    fn spawn(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn worker_pool_rejects_zero_threads() {
        assert!(WorkerPool::new(Some(0)).is_err());
        assert!(WorkerPool::new(Some(1)).is_ok());
    }

    #[test]
    fn worker_pool_runs_jobs_off_thread() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        let (tx, rx) = mpsc::channel();
        pool.spawn(Box::new(move || {
            let _ = tx.send(std::thread::current().id());
        }));
        let worker = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(worker, std::thread::current().id());
    }

    #[test]
    fn inline_scheduler_runs_before_returning() {
        let (tx, rx) = mpsc::channel();
        InlineScheduler.spawn(Box::new(move || {
            let _ = tx.send(());
        }));
        assert!(rx.try_recv().is_ok());
    }
}
