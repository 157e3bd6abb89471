// A level is split into contiguous groups of pairs like this (with 2 workers):
// ```text
// children  [ worker 0 (2 × group_size) | worker 1 (2 × group_size) | caller (the rest) ]
// parents   [ worker 0 (group_size)     | worker 1 (group_size)     | caller (the rest) ]
// ```
// Every group writes to its own slice of the output, so the result does not depend on the order
// in which the groups finish.

use ethereum_types::H256;
use itertools::Itertools as _;
use log::warn;
use once_cell::sync::Lazy;
use rayon::{
    iter::{IntoParallelRefIterator as _, ParallelIterator as _},
    ThreadPool, ThreadPoolBuilder,
};

use crate::{config::HashingConfig, error::Error, hash, hash_256_256};

/// Default length at which hashing a level is split between threads.
///
/// Shorter levels are cheaper to hash than to hand off to other threads.
pub const MIN_PARALLELIZATION_SIZE: usize = 5000;

static DEFAULT_HASHER: Lazy<ParentLevelHasher> = Lazy::new(|| {
    let config = HashingConfig::default();

    ParentLevelHasher::new(config).unwrap_or_else(|error| {
        warn!("hashing will not be parallelized ({error})");

        ParentLevelHasher {
            config: HashingConfig {
                parallel_workers: 0,
                ..config
            },
            pool: None,
        }
    })
});

#[derive(Debug)]
pub struct ParentLevelHasher {
    config: HashingConfig,
    pool: Option<ThreadPool>,
}

impl ParentLevelHasher {
    pub fn new(config: HashingConfig) -> Result<Self, Error> {
        let pool = if config.parallel_workers == 0 {
            None
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.parallel_workers)
                .thread_name(|index| format!("hashing-{index}"))
                .build()?;

            Some(pool)
        };

        Ok(Self { config, pool })
    }

    /// The process-wide hasher built from [`HashingConfig::default`].
    #[must_use]
    pub fn global() -> &'static Self {
        &DEFAULT_HASHER
    }

    #[must_use]
    pub const fn config(&self) -> HashingConfig {
        self.config
    }

    /// Hashes adjacent pairs of `level` into the level above it.
    ///
    /// `parent[i] = hash_256_256(level[2 * i], level[2 * i + 1])`.
    pub fn build_parent_level(&self, level: &[H256]) -> Result<Vec<H256>, Error> {
        ensure_even(level)?;

        match &self.pool {
            Some(pool) if level.len() >= self.config.min_parallelization_size => {
                features::log!(
                    DebugParallelHashing,
                    "hashing level of {} roots with {} workers",
                    level.len(),
                    self.config.parallel_workers,
                );

                Ok(hash_in_parallel(pool, self.config.parallel_workers, level))
            }
            _ => Ok(hash_pairs(level)),
        }
    }

    /// Hashes every input separately. The output is in the same order as the input.
    pub fn hash_batch<I: AsRef<[u8]> + Sync>(&self, inputs: &[I]) -> Vec<H256> {
        match &self.pool {
            Some(pool) => pool.install(|| inputs.par_iter().map(hash).collect()),
            None => inputs.iter().map(hash).collect(),
        }
    }
}

/// [`ParentLevelHasher::build_parent_level`] using the process-wide hasher.
pub fn build_parent_level(level: &[H256]) -> Result<Vec<H256>, Error> {
    ParentLevelHasher::global().build_parent_level(level)
}

/// Same as [`build_parent_level`] but never leaves the calling thread.
pub fn build_parent_level_serial(level: &[H256]) -> Result<Vec<H256>, Error> {
    ensure_even(level)?;
    Ok(hash_pairs(level))
}

/// [`ParentLevelHasher::hash_batch`] using the process-wide hasher.
pub fn hash_batch<I: AsRef<[u8]> + Sync>(inputs: &[I]) -> Vec<H256> {
    ParentLevelHasher::global().hash_batch(inputs)
}

fn ensure_even(level: &[H256]) -> Result<(), Error> {
    let length = level.len();

    if length % 2 == 1 {
        return Err(Error::OddLength { length });
    }

    Ok(())
}

fn hash_pairs(level: &[H256]) -> Vec<H256> {
    level
        .iter()
        .copied()
        .tuples()
        .map(|(left, right)| hash_256_256(left, right))
        .collect()
}

fn hash_pairs_into(parents: &mut [H256], children: &[H256]) {
    for (parent, (left, right)) in parents.iter_mut().zip(children.iter().copied().tuples()) {
        *parent = hash_256_256(left, right);
    }
}

fn hash_in_parallel(pool: &ThreadPool, workers: usize, level: &[H256]) -> Vec<H256> {
    let mut parents = vec![H256::zero(); level.len() / 2];
    let group_size = parents.len() / (workers + 1);

    if group_size == 0 {
        hash_pairs_into(&mut parents, level);
        return parents;
    }

    let (worker_parents, own_parents) = parents.split_at_mut(workers * group_size);
    let (worker_children, own_children) = level.split_at(2 * workers * group_size);

    // `in_place_scope` runs the closure on the calling thread,
    // which hashes the remainder while the workers hash their groups.
    pool.in_place_scope(|scope| {
        for (parents, children) in worker_parents
            .chunks_mut(group_size)
            .zip(worker_children.chunks(2 * group_size))
        {
            scope.spawn(move |_| hash_pairs_into(parents, children));
        }

        hash_pairs_into(own_parents, own_children);
    });

    parents
}
