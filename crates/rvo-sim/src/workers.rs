//! Worker pool for the parallel step phases.
//!
//! With the `parallel` feature (on by default) this owns a dedicated
//! `rayon::ThreadPool`; every phase runs inside [`WorkerPool::install`] so its
//! `par_iter` calls use the pool's threads and return only after every task
//! finished.  Without the feature the phases run on the calling thread and
//! the worker count is only recorded.

use crate::SimResult;

/// Default worker count: the platform's available parallelism, at least 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// A bounded pool of worker threads, started lazily.
#[derive(Debug)]
pub struct WorkerPool {
    workers: usize,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

impl WorkerPool {
    /// A pool of `workers` threads (clamped to at least 1).  No thread is
    /// spawned until [`start`](Self::start).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// `true` once the threads are running.
    pub fn is_started(&self) -> bool {
        #[cfg(feature = "parallel")]
        {
            self.pool.is_some()
        }
        #[cfg(not(feature = "parallel"))]
        {
            true
        }
    }

    /// Spawn the threads if they are not running yet.
    pub fn start(&mut self) -> SimResult<()> {
        #[cfg(feature = "parallel")]
        if self.pool.is_none() {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .thread_name(|i| format!("rvo-worker-{i}"))
                .build()
                .map_err(|e| crate::SimError::ThreadPool(e.to_string()))?;
            self.pool = Some(pool);
        }
        Ok(())
    }

    /// Change the worker count.  A running pool is replaced immediately.
    pub fn resize(&mut self, workers: usize) -> SimResult<()> {
        let workers = workers.max(1);
        if workers == self.workers {
            return Ok(());
        }
        self.workers = workers;

        #[cfg(feature = "parallel")]
        if self.pool.take().is_some() {
            self.start()?;
        }
        Ok(())
    }

    /// Stop the threads.  The pool restarts on the next [`start`](Self::start).
    pub fn shutdown(&mut self) {
        #[cfg(feature = "parallel")]
        {
            self.pool = None;
        }
    }

    /// Run `op` with the pool's threads available to rayon.  Falls back to
    /// the calling thread when the pool is not running.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            return pool.install(op);
        }
        op()
    }
}
