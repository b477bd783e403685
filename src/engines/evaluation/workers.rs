use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Fixed-size worker pool for the data-parallel evaluation phase.
///
/// Built once per run and reused every generation. Falls back to the calling
/// thread when a single worker is requested or the pool cannot be built.
pub struct WorkerPool {
    pool: Option<ThreadPool>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(requested: usize) -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let mut workers = requested.max(1);
        if workers > available {
            log::warn!(
                "{} worker threads requested but only {} available, using {}",
                requested,
                available,
                available
            );
            workers = available;
        }

        if workers == 1 {
            return Self::sequential();
        }

        match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gepreg-eval-{}", i))
            .build()
        {
            Ok(pool) => {
                log::debug!("Evaluation pool started with {} workers", workers);
                Self::from_pool(pool)
            }
            Err(e) => {
                log::warn!(
                    "Could not start {} worker threads ({}), evaluating on the calling thread",
                    workers,
                    e
                );
                Self::sequential()
            }
        }
    }

    /// Evaluate on an already built rayon pool, whatever its size.
    pub fn from_pool(pool: ThreadPool) -> Self {
        let workers = pool.current_num_threads();
        Self {
            pool: Some(pool),
            workers,
        }
    }

    pub fn sequential() -> Self {
        Self {
            pool: None,
            workers: 1,
        }
    }

    /// Effective number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `f` to every item; each item is touched by exactly one worker.
    pub fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(&mut T) + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter_mut().for_each(|item| f(item))),
            None => items.iter_mut().for_each(f),
        }
    }
}
