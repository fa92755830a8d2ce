//! Fork-join evaluation of independent work items on a bounded worker pool.
//!
//! Each work item is identified by an index and produces exactly one output
//! slot, so results come back in index order no matter how items were
//! scheduled. There is no cancellation: every dispatched item runs to
//! completion, and failures are only inspected after the join. If more than one
//! item fails, the failure with the lowest index is returned.

use std::sync::Arc;
use once_cell::sync::OnceCell;
use rayon::{
    iter::{ IntoParallelIterator, ParallelIterator },
    ThreadPool,
    ThreadPoolBuilder,
};
use tracing::{ debug, trace };
use crate::{
    config::Config,
    error::{ Result, SimError },
};

static SHARED: OnceCell<Evaluator> = OnceCell::new();

/// A worker pool running at most `max_concurrency` items at once.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone, Debug)]
pub struct Evaluator {
    max_concurrency: usize,
    pool: Arc<ThreadPool>,
}

impl Evaluator {
    /// Create a new evaluator with `max_concurrency` worker threads.
    ///
    /// Fails with [`SimError::InvalidConcurrency`] if `max_concurrency` is
    /// zero.
    pub fn new(max_concurrency: usize) -> Result<Self> {
        if max_concurrency == 0 {
            return Err(SimError::InvalidConcurrency(max_concurrency));
        }
        let pool
            = ThreadPoolBuilder::new()
            .num_threads(max_concurrency)
            .thread_name(|k| format!("lineq-worker-{}", k))
            .build()?;
        debug!(max_concurrency, "built evaluator pool");
        Ok(Self { max_concurrency, pool: Arc::new(pool) })
    }

    /// Create a new evaluator sized by [`Config::max_concurrency`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.max_concurrency)
    }

    /// Process-wide evaluator sized by [`Config::default`], built on first
    /// use.
    pub fn shared() -> Result<&'static Self> {
        SHARED.get_or_try_init(|| Self::from_config(&Config::default()))
    }

    pub fn max_concurrency(&self) -> usize { self.max_concurrency }

    /// Run `f` on every index in `0..count` and collect the outputs in index
    /// order.
    pub fn evaluate<T, F>(&self, count: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync,
    {
        trace!(count, max_concurrency = self.max_concurrency, "dispatching work items");
        let results: Vec<Result<T>>
            = self.pool.install(|| {
                (0..count).into_par_iter().map(&f).collect()
            });
        let failures = results.iter().filter(|r| r.is_err()).count();
        if failures > 0 {
            debug!(failures, count, "work items failed");
        }
        results.into_iter().collect()
    }

    /// Like [`Self::evaluate`], for items that cannot fail.
    pub fn map<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        trace!(count, max_concurrency = self.max_concurrency, "dispatching work items");
        self.pool.install(|| {
            (0..count).into_par_iter().map(&f).collect()
        })
    }
}
