use ethereum_types::H256;
use log::warn;

use crate::{
    error::Error,
    node::TreeNode,
    snapshot::{DepositTreeSnapshot, ExecutionBlock},
};

pub const DEPOSIT_CONTRACT_TREE_DEPTH: usize = 32;
pub const MAX_DEPOSITS: u64 = 1 << DEPOSIT_CONTRACT_TREE_DEPTH;

/// Siblings of a deposit from the bottom of the tree up, followed by the number of deposits.
pub type DepositProof = [H256; DEPOSIT_CONTRACT_TREE_DEPTH + 1];

/// Incremental Merkle tree of deposits as described in
/// [EIP-4881](https://eips.ethereum.org/EIPS/eip-4881).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DepositTree {
    tree: TreeNode,
    deposit_count: u64,
    finalized_execution_block: ExecutionBlock,
}

impl Default for DepositTree {
    fn default() -> Self {
        Self {
            tree: TreeNode::Zero(DEPOSIT_CONTRACT_TREE_DEPTH),
            deposit_count: 0,
            finalized_execution_block: ExecutionBlock::default(),
        }
    }
}

impl DepositTree {
    /// Root of the tree with the number of deposits mixed in.
    #[must_use]
    pub fn root(&self) -> H256 {
        merkle::mix_in_length(self.tree.root(), self.deposit_count)
    }

    #[must_use]
    pub const fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    #[must_use]
    pub const fn finalized_execution_block(&self) -> ExecutionBlock {
        self.finalized_execution_block
    }

    #[must_use]
    pub fn finalized_deposit_count(&self) -> u64 {
        let (deposit_count, _) = self.tree.finalized();
        deposit_count
    }

    pub fn push_leaf(&mut self, leaf: H256) -> Result<(), Error> {
        if self.deposit_count >= MAX_DEPOSITS {
            return Err(Error::TooManyDeposits {
                deposit_count: self.deposit_count + 1,
            });
        }

        self.tree.push_leaf(leaf, DEPOSIT_CONTRACT_TREE_DEPTH)?;
        self.deposit_count += 1;

        features::log!(
            DebugDepositTree,
            "pushed deposit {} (leaf: {leaf:?})",
            self.deposit_count - 1,
        );

        Ok(())
    }

    /// Adds the deposit with the given `index` and returns the new root.
    ///
    /// Deposits must be pushed in order, so `index` has to equal [`Self::deposit_count`].
    pub fn push(&mut self, index: u64, leaf: H256) -> Result<H256, Error> {
        if index >= MAX_DEPOSITS {
            return Err(Error::TooManyDeposits {
                deposit_count: index.saturating_add(1),
            });
        }

        if index != self.deposit_count {
            return Err(Error::UnexpectedIndex {
                expected: self.deposit_count,
                actual: index,
            });
        }

        self.push_leaf(leaf)?;

        Ok(self.root())
    }

    /// Finalizes deposits up to and including the one at `eth1_deposit_index`.
    ///
    /// Finalizing at an older index than before changes nothing.
    pub fn finalize(
        &mut self,
        eth1_deposit_index: u64,
        execution_block_hash: H256,
        execution_block_height: u64,
    ) -> Result<(), Error> {
        let finalized_count = self.finalized_deposit_count();

        if eth1_deposit_index >= self.deposit_count {
            return Err(Error::InvalidIndex {
                index: eth1_deposit_index,
                deposit_count: self.deposit_count,
                finalized_count,
            });
        }

        let deposits_to_finalize = eth1_deposit_index + 1;

        if deposits_to_finalize < finalized_count {
            warn!(
                "ignoring finalization of {deposits_to_finalize} deposits \
                 because {finalized_count} deposits are already finalized",
            );

            return Ok(());
        }

        self.tree
            .finalize(deposits_to_finalize, DEPOSIT_CONTRACT_TREE_DEPTH)?;

        self.finalized_execution_block = ExecutionBlock {
            hash: execution_block_hash,
            height: execution_block_height,
        };

        features::log!(
            DebugDepositTree,
            "finalized {deposits_to_finalize} deposits \
             (execution_block_hash: {execution_block_hash:?}, \
             execution_block_height: {execution_block_height})",
        );

        Ok(())
    }

    /// Returns the deposit at `index` and a proof of its inclusion in [`Self::root`].
    ///
    /// Finalized deposits cannot be proven because only the roots of finalized subtrees are kept.
    pub fn get_proof(&self, index: u64) -> Result<(H256, DepositProof), Error> {
        if self.deposit_count == 0 {
            return Err(Error::InvalidDepositCount);
        }

        let finalized_count = self.finalized_deposit_count();

        let invalid_index = || Error::InvalidIndex {
            index,
            deposit_count: self.deposit_count,
            finalized_count,
        };

        if index >= self.deposit_count || index < finalized_count {
            return Err(invalid_index());
        }

        let mut proof = [H256::zero(); DEPOSIT_CONTRACT_TREE_DEPTH + 1];
        let mut node = &self.tree;

        for height in (0..DEPOSIT_CONTRACT_TREE_DEPTH).rev() {
            let TreeNode::Inner { left, right, .. } = node else {
                return Err(invalid_index());
            };

            if (index >> height) & 1 == 1 {
                proof[height] = left.root();
                node = right.as_ref();
            } else {
                proof[height] = right.root();
                node = left.as_ref();
            }
        }

        let TreeNode::Leaf(leaf) = node else {
            return Err(invalid_index());
        };

        proof[DEPOSIT_CONTRACT_TREE_DEPTH] = merkle::hash_of_length(self.deposit_count);

        Ok((*leaf, proof))
    }

    /// Finalized part of the tree along with the block it was finalized in.
    ///
    /// Fails with [`Error::MalformedSnapshot`] only if all [`MAX_DEPOSITS`] deposits are finalized.
    pub fn snapshot(&self) -> Result<DepositTreeSnapshot, Error> {
        let (deposit_count, finalized) = self.tree.finalized();

        DepositTreeSnapshot::from_tree_parts(
            finalized,
            deposit_count,
            self.finalized_execution_block,
        )
    }

    /// Restores a tree from a snapshot.
    ///
    /// Deposits that were not finalized when the snapshot was taken have to be pushed again.
    pub fn from_snapshot(snapshot: &DepositTreeSnapshot) -> Result<Self, Error> {
        let DepositTreeSnapshot {
            finalized,
            deposit_root,
            deposit_count,
            ..
        } = snapshot;

        if *deposit_count >= MAX_DEPOSITS {
            return Err(Error::TooManyDeposits {
                deposit_count: *deposit_count,
            });
        }

        let calculated_root = snapshot.calculate_root()?;

        if calculated_root != *deposit_root {
            return Err(Error::InvalidSnapshotRoot {
                expected: *deposit_root,
                actual: calculated_root,
            });
        }

        let tree =
            TreeNode::from_snapshot_parts(finalized, *deposit_count, DEPOSIT_CONTRACT_TREE_DEPTH)?;

        features::log!(
            DebugDepositTree,
            "restored deposit tree with {deposit_count} finalized deposits \
             (deposit_root: {deposit_root:?})",
        );

        Ok(Self {
            tree,
            deposit_count: *deposit_count,
            finalized_execution_block: snapshot.execution_block(),
        })
    }
}
