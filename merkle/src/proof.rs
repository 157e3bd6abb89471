use bit_field::BitField as _;
use ethereum_types::H256;

use crate::error::Error;

/// Recomputes the root of a tree from a leaf and its sibling hashes.
///
/// `branch` is ordered from the leaf upwards. Bit `height` of `index` tells whether the node at
/// that height is a right child. Elements of `branch` past `depth` are ignored.
pub fn root_from_branch(
    leaf: H256,
    branch: &[H256],
    depth: usize,
    index: u64,
) -> Result<H256, Error> {
    let length = branch.len();

    if length < depth {
        return Err(Error::BranchTooShort { length, depth });
    }

    let mut hash = leaf;

    for (height, node) in branch[..depth].iter().copied().enumerate() {
        if is_right_child(index, height) {
            hash = hashing::hash_256_256(node, hash);
        } else {
            hash = hashing::hash_256_256(hash, node);
        }
    }

    Ok(hash)
}

/// <https://github.com/ethereum/consensus-specs/blob/v1.4.0/specs/phase0/beacon-chain.md#is_valid_merkle_branch>
///
/// Branches shorter than `depth` are invalid.
#[must_use]
pub fn is_valid_merkle_branch(
    leaf: H256,
    branch: &[H256],
    depth: usize,
    index: u64,
    root: H256,
) -> bool {
    root_from_branch(leaf, branch, depth, index).is_ok_and(|computed| computed == root)
}

/// Same as [`is_valid_merkle_branch`] with the depth taken from the length of `proof`.
#[must_use]
pub fn verify_proof(root: H256, leaf: H256, index: u64, proof: &[H256]) -> bool {
    is_valid_merkle_branch(leaf, proof, proof.len(), index, root)
}

// Nodes above height 63 can only be left children of a `u64` index.
fn is_right_child(index: u64, height: usize) -> bool {
    height < u64::BIT_LENGTH && index.get_bit(height)
}
