use ethereum_types::H256;
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error("inner node cannot have depth 0")]
    ZeroDepth,
    #[error("{leaf_count} leaves do not fit in subtree of depth {depth}")]
    TooManyLeaves { leaf_count: usize, depth: usize },
    #[error("cannot push leaf into leaf node")]
    LeafCannotPushLeaf,
    #[error("cannot push leaf into finalized node")]
    FinalizedCannotPushLeaf,
    #[error("deposit tree has no deposits")]
    InvalidDepositCount,
    #[error(
        "deposit {index} cannot be used \
         (deposit_count: {deposit_count}, finalized_count: {finalized_count})"
    )]
    InvalidIndex {
        index: u64,
        deposit_count: u64,
        finalized_count: u64,
    },
    #[error("snapshot root is invalid (expected: {expected:?}, actual: {actual:?})")]
    InvalidSnapshotRoot { expected: H256, actual: H256 },
    #[error("deposit tree cannot hold {deposit_count} deposits")]
    TooManyDeposits { deposit_count: u64 },
    #[error("expected deposit with index {expected}, received deposit with index {actual}")]
    UnexpectedIndex { expected: u64, actual: u64 },
    #[error(
        "snapshot with {deposit_count} deposits cannot have {finalized_count} finalized roots"
    )]
    MalformedSnapshot {
        deposit_count: u64,
        finalized_count: usize,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum ReadError {
    #[error("expected at least {minimum} bytes, found {actual} bytes")]
    TooShort { minimum: usize, actual: usize },
    #[error("expected container to have {expected} as the first offset, found {actual}")]
    ContainerFirstOffsetMismatch { expected: usize, actual: usize },
    #[error("list of roots cannot be {length} bytes long")]
    ListLengthNotMultipleOfRoot { length: usize },
    #[error("expected list to have no more than {maximum} elements, found {actual} elements")]
    ListTooLong { maximum: usize, actual: usize },
}
