use ethereum_types::H256;
use hashing::{hash_256_256, ZERO_HASHES};

use crate::{deposit_tree::DEPOSIT_CONTRACT_TREE_DEPTH, error::Error};

/// Node of a right-sparse Merkle tree.
///
/// Only the first `deposit_count` leaves of the tree are populated. Subtrees to the right of them
/// are represented by a single [`TreeNode::Zero`]. Complete subtrees to the left of the
/// finalized boundary are collapsed into [`TreeNode::Finalized`].
///
/// `Zero` and `Inner` can still grow. `Leaf` and `Finalized` are terminal.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TreeNode {
    Zero(usize),
    Leaf(H256),
    Finalized {
        deposit_count: u64,
        hash: H256,
    },
    Inner {
        // Root of `left` and `right`. Updated on every push.
        hash: H256,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl TreeNode {
    /// Builds a subtree of height `depth` holding `leaves` as its leftmost leaves.
    pub fn create(leaves: &[H256], depth: usize) -> Result<Self, Error> {
        Self::build(leaves, depth).ok_or(Error::TooManyLeaves {
            leaf_count: leaves.len(),
            depth,
        })
    }

    fn build(leaves: &[H256], depth: usize) -> Option<Self> {
        if leaves.is_empty() {
            return Some(Self::Zero(depth));
        }

        let Some(child_depth) = depth.checked_sub(1) else {
            let [leaf] = leaves else {
                return None;
            };

            return Some(Self::Leaf(*leaf));
        };

        let left_capacity = u32::try_from(child_depth)
            .ok()
            .and_then(|shift| 1_usize.checked_shl(shift))
            .unwrap_or(usize::MAX);

        let (left_leaves, right_leaves) = leaves.split_at(leaves.len().min(left_capacity));

        Some(Self::inner(
            Self::build(left_leaves, child_depth)?,
            Self::build(right_leaves, child_depth)?,
        ))
    }

    fn inner(left: Self, right: Self) -> Self {
        Self::Inner {
            hash: hash_256_256(left.root(), right.root()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn root(&self) -> H256 {
        match self {
            // The top of an empty deposit tree is computed from its children.
            // It is equal to `ZERO_HASHES[DEPOSIT_CONTRACT_TREE_DEPTH]`.
            Self::Zero(DEPOSIT_CONTRACT_TREE_DEPTH) => {
                let below = ZERO_HASHES[DEPOSIT_CONTRACT_TREE_DEPTH - 1];
                hash_256_256(below, below)
            }
            Self::Zero(depth) => ZERO_HASHES[*depth],
            Self::Leaf(hash) | Self::Finalized { hash, .. } | Self::Inner { hash, .. } => *hash,
        }
    }

    /// Whether no more leaves can be pushed into this subtree.
    #[must_use]
    pub fn is_full(&self) -> bool {
        match self {
            Self::Zero(_) => false,
            Self::Leaf(_) | Self::Finalized { .. } => true,
            Self::Inner { right, .. } => right.is_full(),
        }
    }

    /// Adds `leaf` at the leftmost empty position of this subtree of height `depth`.
    ///
    /// The subtree is left untouched if this fails.
    pub fn push_leaf(&mut self, leaf: H256, depth: usize) -> Result<(), Error> {
        match self {
            Self::Zero(_) => *self = Self::create(&[leaf], depth)?,
            Self::Leaf(_) => return Err(Error::LeafCannotPushLeaf),
            Self::Finalized { .. } => return Err(Error::FinalizedCannotPushLeaf),
            Self::Inner { hash, left, right } => {
                let child_depth = depth.checked_sub(1).ok_or(Error::ZeroDepth)?;

                if left.is_full() {
                    right.push_leaf(leaf, child_depth)?;
                } else {
                    left.push_leaf(leaf, child_depth)?;
                }

                *hash = hash_256_256(left.root(), right.root());
            }
        }

        Ok(())
    }

    /// Collapses complete subtrees covering the first `deposits_to_finalize` leaves.
    ///
    /// The root of the subtree does not change.
    pub fn finalize(&mut self, deposits_to_finalize: u64, depth: usize) -> Result<(), Error> {
        match self {
            Self::Zero(_) | Self::Finalized { .. } => {}
            Self::Leaf(hash) => {
                *self = Self::Finalized {
                    deposit_count: 1,
                    hash: *hash,
                }
            }
            Self::Inner { hash, left, right } => {
                let deposits = 1 << depth;

                if deposits <= deposits_to_finalize {
                    *self = Self::Finalized {
                        deposit_count: deposits,
                        hash: *hash,
                    };

                    return Ok(());
                }

                let child_depth = depth.checked_sub(1).ok_or(Error::ZeroDepth)?;

                left.finalize(deposits_to_finalize, child_depth)?;

                if deposits_to_finalize > deposits / 2 {
                    right.finalize(deposits_to_finalize - deposits / 2, child_depth)?;
                }
            }
        }

        Ok(())
    }

    /// Number of finalized deposits and roots of finalized subtrees from left to right.
    #[must_use]
    pub fn finalized(&self) -> (u64, Vec<H256>) {
        let mut hashes = vec![];
        let deposit_count = self.collect_finalized(&mut hashes);
        (deposit_count, hashes)
    }

    fn collect_finalized(&self, hashes: &mut Vec<H256>) -> u64 {
        match self {
            Self::Zero(_) | Self::Leaf(_) => 0,
            Self::Finalized {
                deposit_count,
                hash,
            } => {
                hashes.push(*hash);
                *deposit_count
            }
            Self::Inner { left, right, .. } => {
                left.collect_finalized(hashes) + right.collect_finalized(hashes)
            }
        }
    }

    /// Rebuilds the finalized frontier of a subtree of height `depth`.
    ///
    /// `finalized` must contain one root for every set bit of `deposit_count`,
    /// starting with the largest subtree.
    pub fn from_snapshot_parts(
        finalized: &[H256],
        deposit_count: u64,
        depth: usize,
    ) -> Result<Self, Error> {
        let malformed = || Error::MalformedSnapshot {
            deposit_count,
            finalized_count: finalized.len(),
        };

        let Some((first, rest)) = finalized.split_first() else {
            return Ok(Self::Zero(depth));
        };

        if deposit_count == 0 {
            return Ok(Self::Zero(depth));
        }

        if deposit_count == 1 << depth {
            return Ok(Self::Finalized {
                deposit_count,
                hash: *first,
            });
        }

        let child_depth = depth.checked_sub(1).ok_or_else(malformed)?;
        let left_capacity = 1 << child_depth;

        let (left, right) = match deposit_count.checked_sub(left_capacity) {
            Some(right_deposits) if right_deposits > 0 => (
                Self::Finalized {
                    deposit_count: left_capacity,
                    hash: *first,
                },
                Self::from_snapshot_parts(rest, right_deposits, child_depth)?,
            ),
            _ => (
                Self::from_snapshot_parts(finalized, deposit_count, child_depth)?,
                Self::Zero(child_depth),
            ),
        };

        Ok(Self::inner(left, right))
    }
}
