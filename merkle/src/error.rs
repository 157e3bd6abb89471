use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Hashing(#[from] hashing::Error),
    #[error("{length} roots do not fit in capacity {capacity}")]
    CapacityExceeded { length: usize, capacity: u64 },
    #[error("Merkle tree cannot be built from an empty list of leaves")]
    EmptyLeaves,
    #[error("tree depth {depth} exceeds maximum of {maximum}")]
    ExceededDepth { depth: usize, maximum: usize },
    #[error("index {index} is negative")]
    NegativeIndex { index: i64 },
    #[error("index {index} is out of bounds for tree of depth {depth} with {length} leaves")]
    InvalidIndex {
        index: u64,
        depth: usize,
        length: usize,
    },
    #[error("branch of length {length} is too short for depth {depth}")]
    BranchTooShort { length: usize, depth: usize },
}
