//! Worker pool for clause fan-out and batch prediction using rayon.
//!
//! Samples are processed one after another; parallelism lives inside a
//! sample, across the clauses of a class. Each clause is paired with its own
//! random stream and handed to exactly one task, so updates need no locks
//! and the outcome does not depend on the number of workers.

use rayon::prelude::*;

use crate::{Clause, error::Result, utils::FastRng};

/// Smallest slice of clauses handed to one rayon task.
const MIN_CLAUSES_PER_TASK: usize = 16;

/// Smallest slice of rows handed to one rayon task when predicting.
const MIN_ROWS_PER_TASK: usize = 64;

/// # Overview
///
/// Runs clause-level work inline, on rayon's global pool, or on a dedicated
/// rayon pool.
#[derive(Debug)]
pub enum Executor {
    /// Single worker: everything runs on the calling thread.
    Inline,
    /// Rayon's global pool, used when it already has the requested size.
    Global,
    /// Dedicated pool sized from `n_jobs`.
    Pool(rayon::ThreadPool)
}

impl Executor {
    /// # Overview
    ///
    /// Builds an executor with `workers` threads. One worker runs inline.
    pub fn new(workers: usize) -> Result<Self> {
        if workers <= 1 {
            return Ok(Self::Inline);
        }
        if workers == rayon::current_num_threads() {
            return Ok(Self::Global);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tsetlin-worker-{i}"))
            .build()?;
        Ok(Self::Pool(pool))
    }

    /// # Overview
    ///
    /// Executor for mapping `rows` rows. Batches too small to give every
    /// worker a full task run inline.
    pub fn for_rows(workers: usize, rows: usize) -> Result<Self> {
        if rows < 2 * MIN_ROWS_PER_TASK {
            return Ok(Self::Inline);
        }
        Self::new(workers.min(rows.div_ceil(MIN_ROWS_PER_TASK)))
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        match self {
            Self::Inline => 1,
            Self::Global => rayon::current_num_threads(),
            Self::Pool(pool) => pool.current_num_threads()
        }
    }

    fn parallel<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send
    {
        match self {
            Self::Pool(pool) => pool.install(op),
            Self::Inline | Self::Global => op()
        }
    }

    /// # Overview
    ///
    /// Sums `vote` over all clauses. Integer addition, so the order of
    /// partial sums does not matter.
    pub fn sum_votes<F>(&self, clauses: &[Clause], vote: F) -> i32
    where
        F: Fn(&Clause) -> i32 + Sync + Send
    {
        match self {
            Self::Inline => clauses.iter().map(vote).sum(),
            _ => self.parallel(|| {
                clauses
                    .par_iter()
                    .with_min_len(MIN_CLAUSES_PER_TASK)
                    .map(vote)
                    .sum()
            })
        }
    }

    /// # Overview
    ///
    /// Applies `update` to every clause together with its private stream.
    ///
    /// # Panics
    ///
    /// Debug builds assert `clauses.len() == streams.len()`.
    pub fn for_each_clause<F>(&self, clauses: &mut [Clause], streams: &mut [FastRng], update: F)
    where
        F: Fn(&mut Clause, &mut FastRng) + Sync + Send
    {
        debug_assert_eq!(clauses.len(), streams.len());
        match self {
            Self::Inline => clauses
                .iter_mut()
                .zip(streams.iter_mut())
                .for_each(|(clause, rng)| update(clause, rng)),
            _ => self.parallel(|| {
                clauses
                    .par_iter_mut()
                    .zip(streams.par_iter_mut())
                    .with_min_len(MIN_CLAUSES_PER_TASK)
                    .for_each(|(clause, rng)| update(clause, rng));
            })
        }
    }

    /// # Overview
    ///
    /// Maps every row, preserving order.
    pub fn map_rows<T, F>(&self, rows: &[Vec<u8>], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&[u8]) -> T + Sync + Send
    {
        match self {
            Self::Inline => rows.iter().map(|row| f(row.as_slice())).collect(),
            _ => self.parallel(|| {
                rows.par_iter()
                    .with_min_len(MIN_ROWS_PER_TASK)
                    .map(|row| f(row.as_slice()))
                    .collect()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{rng_from_seed, stream_rng};

    fn clauses(n: usize) -> Vec<Clause> {
        let mut rng = rng_from_seed(5);
        (0..n)
            .map(|i| Clause::random(8, 20, if i % 2 == 0 { 1 } else { -1 }, &mut rng))
            .collect()
    }

    #[test]
    fn single_worker_is_inline() {
        assert!(matches!(Executor::new(1).unwrap(), Executor::Inline));
        assert_eq!(Executor::new(0).unwrap().workers(), 1);
    }

    #[test]
    fn pool_has_requested_workers() {
        let workers = rayon::current_num_threads() + 1;
        let exec = Executor::new(workers).unwrap();
        assert!(matches!(exec, Executor::Pool(_)));
        assert_eq!(exec.workers(), workers);
    }

    #[test]
    fn global_pool_reused_when_sizes_match() {
        let global = rayon::current_num_threads();
        if global > 1 {
            assert!(matches!(Executor::new(global).unwrap(), Executor::Global));
        }
    }

    #[test]
    fn small_batches_run_inline() {
        assert!(matches!(Executor::for_rows(8, 0).unwrap(), Executor::Inline));
        assert!(matches!(
            Executor::for_rows(8, 2 * MIN_ROWS_PER_TASK - 1).unwrap(),
            Executor::Inline
        ));
        assert!(matches!(Executor::for_rows(1, 10_000).unwrap(), Executor::Inline));

        let exec = Executor::for_rows(64, 3 * MIN_ROWS_PER_TASK).unwrap();
        assert_eq!(exec.workers(), 3);
    }

    #[test]
    fn sums_match_across_executors() {
        let cs = clauses(100);
        let x = [1, 0, 1, 1, 0, 0, 1, 0];
        let inline = Executor::new(1).unwrap().sum_votes(&cs, |c| c.vote(&x));
        let pooled = Executor::new(4).unwrap().sum_votes(&cs, |c| c.vote(&x));
        assert_eq!(inline, pooled);
    }

    #[test]
    fn clause_updates_match_across_executors() {
        let run = |workers: usize| {
            let mut cs = clauses(64);
            let mut streams: Vec<FastRng> = (0..64).map(|i| stream_rng(9, i)).collect();
            let exec = Executor::new(workers).unwrap();
            exec.for_each_clause(&mut cs, &mut streams, |clause, rng| {
                let probs = crate::feedback::TypeIProbs::new(3.0, false);
                let x = [1, 1, 0, 0, 1, 0, 1, 0];
                let fires = clause.evaluate(&x);
                crate::feedback::type_i(clause, &x, fires, probs, rng);
            });
            cs
        };
        assert_eq!(run(1), run(4));
    }

    #[test]
    fn map_rows_preserves_order() {
        let rows: Vec<Vec<u8>> = (0..500).map(|i| vec![(i % 2) as u8, 1]).collect();
        let expected: Vec<u8> = (0..500).map(|i| (i % 2) as u8).collect();
        for workers in [2, rayon::current_num_threads(), rayon::current_num_threads() + 1] {
            let exec = Executor::new(workers).unwrap();
            assert_eq!(exec.map_rows(&rows, |r| r[0]), expected);
        }
    }
}
