use serde::{Deserialize, Serialize};

use crate::parallel::MIN_PARALLELIZATION_SIZE;

/// Tuning knobs for the parallel hashing layer.
///
/// Neither field affects the roots that get computed, only how the work is split.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashingConfig {
    /// Shortest level that gets hashed in parallel.
    pub min_parallelization_size: usize,
    /// Number of threads in the dedicated pool. The calling thread always takes a share too.
    pub parallel_workers: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            min_parallelization_size: MIN_PARALLELIZATION_SIZE,
            parallel_workers: num_cpus::get().saturating_sub(1),
        }
    }
}

impl HashingConfig {
    #[must_use]
    pub const fn serial() -> Self {
        Self {
            min_parallelization_size: usize::MAX,
            parallel_workers: 0,
        }
    }
}
