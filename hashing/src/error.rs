use rayon::ThreadPoolBuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build parent level from a level of odd length {length}")]
    OddLength { length: usize },
    #[error("failed to build hashing thread pool")]
    ThreadPool(#[from] ThreadPoolBuildError),
}
