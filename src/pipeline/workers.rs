//! Work distribution for the parallel-safe stages
//!
//! A distributor only has to offer an order-preserving map. The pipeline
//! runs the same stage functions through [`Inline`] or a [`WorkerPool`]
//! and gets identical output.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;
use tracing::info;

/// Order-preserving map over a slice.
pub trait WorkDistributor {
    /// Apply `f` to every item; `result[i]` corresponds to `items[i]`.
    fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send;
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker pool needs at least one thread")]
    InvalidDistribution,
    #[error("failed to start worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}

/// Runs everything on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl WorkDistributor for Inline {
    fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        items.iter().map(f).collect()
    }
}

/// Fixed-size thread pool.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self, WorkerError> {
        if threads == 0 {
            return Err(WorkerError::InvalidDistribution);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("glyph-worker-{}", i))
            .build()?;
        info!(threads, "Started worker pool");
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl WorkDistributor for WorkerPool {
    fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(|item| f(item)).collect())
    }
}

/// Distributor picked from configuration.
pub enum Workers {
    Inline(Inline),
    Pool(WorkerPool),
}

impl Workers {
    /// Zero threads means inline execution.
    pub fn from_threads(threads: usize) -> Result<Self, WorkerError> {
        if threads == 0 {
            Ok(Workers::Inline(Inline))
        } else {
            Ok(Workers::Pool(WorkerPool::new(threads)?))
        }
    }

    pub fn threads(&self) -> usize {
        match self {
            Workers::Inline(_) => 1,
            Workers::Pool(pool) => pool.threads(),
        }
    }
}

impl WorkDistributor for Workers {
    fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match self {
            Workers::Inline(inline) => inline.map(items, f),
            Workers::Pool(pool) => pool.map(items, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_preserves_order() {
        let items: Vec<u32> = (0..100).collect();
        let out = Inline.map(&items, |x| x * 2);
        assert_eq!(out, (0..100).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_pool_matches_inline() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.threads(), 4);
        let items: Vec<u64> = (0..10_000).collect();
        let square = |x: &u64| x * x;
        assert_eq!(pool.map(&items, square), Inline.map(&items, square));
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(WorkerError::InvalidDistribution)));
        assert!(matches!(Workers::from_threads(0), Ok(Workers::Inline(_))));
    }

    #[test]
    fn test_workers_from_threads() {
        let workers = Workers::from_threads(2).unwrap();
        assert_eq!(workers.threads(), 2);
        let out = workers.map(&["a", "bb", "ccc"], |s| s.len());
        assert_eq!(out, vec![1, 2, 3]);
    }
}
