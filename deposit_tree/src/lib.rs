pub use crate::{
    deposit_tree::{DepositProof, DepositTree, DEPOSIT_CONTRACT_TREE_DEPTH, MAX_DEPOSITS},
    error::{Error, ReadError},
    snapshot::{DepositTreeSnapshot, ExecutionBlock, SNAPSHOT_FIXED_SIZE},
};

mod deposit_tree;
mod error;
mod node;
mod snapshot;
