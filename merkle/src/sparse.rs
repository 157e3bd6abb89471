use ethereum_types::H256;
use hashing::ZERO_HASHES;

use crate::{
    error::Error,
    merkleizer::{self, depth_for_capacity},
};

/// Deepest supported tree. `2^63` leaves would overflow an `i64` index.
pub const MAX_TREE_DEPTH: usize = 62;

/// Fixed-depth Merkle tree that keeps every layer so leaves can be replaced and proven.
///
/// Layers only store the nodes that have at least one real leaf below them.
/// Missing nodes are roots of all-zero subtrees.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SparseMerkleTree {
    depth: usize,
    // `layers[0]` contains the leaves. `layers[depth]` contains only the root.
    layers: Vec<Vec<H256>>,
}

impl SparseMerkleTree {
    pub fn new(leaves: Vec<H256>, depth: usize) -> Result<Self, Error> {
        if depth > MAX_TREE_DEPTH {
            return Err(Error::ExceededDepth {
                depth,
                maximum: MAX_TREE_DEPTH,
            });
        }

        if leaves.is_empty() {
            return Err(Error::EmptyLeaves);
        }

        let capacity = 1 << depth;

        if leaves.len() as u64 > capacity {
            return Err(Error::CapacityExceeded {
                length: leaves.len(),
                capacity,
            });
        }

        let mut layers = Vec::with_capacity(depth + 1);
        layers.push(leaves);

        for height in 0..depth {
            let below = &layers[height];

            let parents = if below.len() % 2 == 1 {
                let mut padded = below.clone();
                padded.push(ZERO_HASHES[height]);
                hashing::build_parent_level(&padded)?
            } else {
                hashing::build_parent_level(below)?
            };

            layers.push(parents);
        }

        Ok(Self { depth, layers })
    }

    /// Tree with the minimum depth that fits `leaves`.
    pub fn from_leaves(leaves: Vec<H256>) -> Result<Self, Error> {
        let depth = depth_for_capacity(leaves.len() as u64);
        Self::new(leaves, depth)
    }

    /// Tree deep enough to hold `max_leaves` leaves.
    pub fn with_max_leaves(leaves: Vec<H256>, max_leaves: u64) -> Result<Self, Error> {
        Self::new(leaves, depth_for_capacity(max_leaves))
    }

    /// Tree of the given depth holding a single zero leaf, which counts as no leaves at all.
    pub fn empty(depth: usize) -> Result<Self, Error> {
        Self::new(vec![H256::zero()], depth)
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn leaves(&self) -> &[H256] {
        &self.layers[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    /// Root of the tree without the number of leaves mixed in.
    #[must_use]
    pub fn root(&self) -> H256 {
        self.layers[self.depth][0]
    }

    /// Root of the tree as an SSZ list: [`Self::root`] with the number of leaves mixed in.
    #[must_use]
    pub fn hash_tree_root(&self) -> H256 {
        merkleizer::mix_in_length(self.root(), self.item_count())
    }

    /// Replaces or adds the leaf at `index` and updates the nodes on its path to the root.
    ///
    /// Any gap between the last leaf and `index` is filled with zero leaves.
    pub fn insert(&mut self, leaf: H256, index: i64) -> Result<(), Error> {
        let index = u64::try_from(index).map_err(|_| Error::NegativeIndex { index })?;

        if index >= 1 << self.depth {
            return Err(self.invalid_index(index));
        }

        let mut position = usize::try_from(index).map_err(|_| self.invalid_index(index))?;
        let mut node = leaf;

        for height in 0..self.depth {
            let layer = &mut self.layers[height];

            set_padded(layer, position, node, ZERO_HASHES[height]);

            let sibling = layer
                .get(position ^ 1)
                .copied()
                .unwrap_or(ZERO_HASHES[height]);

            node = if position % 2 == 0 {
                hashing::hash_256_256(node, sibling)
            } else {
                hashing::hash_256_256(sibling, node)
            };

            position /= 2;
        }

        set_padded(
            &mut self.layers[self.depth],
            position,
            node,
            ZERO_HASHES[self.depth],
        );

        Ok(())
    }

    /// Siblings of the leaf at `index` from the bottom of the tree up.
    ///
    /// The proof has exactly [`Self::depth`] elements.
    pub fn merkle_proof(&self, index: u64) -> Result<Vec<H256>, Error> {
        let position = usize::try_from(index)
            .ok()
            .filter(|position| *position < self.len())
            .ok_or_else(|| self.invalid_index(index))?;

        let proof = self
            .layers
            .iter()
            .take(self.depth)
            .enumerate()
            .map(|(height, layer)| {
                layer
                    .get((position >> height) ^ 1)
                    .copied()
                    .unwrap_or(ZERO_HASHES[height])
            })
            .collect::<Vec<_>>();

        assert_eq!(proof.len(), self.depth, "proof should have one node per level");

        Ok(proof)
    }

    /// [`Self::merkle_proof`] followed by the number of leaves.
    ///
    /// The proof can be verified against [`Self::hash_tree_root`] at depth `depth + 1`.
    pub fn merkle_proof_with_mixin(&self, index: u64) -> Result<Vec<H256>, Error> {
        let mut proof = self.merkle_proof(index)?;
        proof.push(merkleizer::hash_of_length(self.item_count()));
        Ok(proof)
    }

    fn item_count(&self) -> u64 {
        match self.leaves() {
            [leaf] if leaf.is_zero() => 0,
            leaves => leaves.len() as u64,
        }
    }

    fn invalid_index(&self, index: u64) -> Error {
        Error::InvalidIndex {
            index,
            depth: self.depth,
            length: self.len(),
        }
    }
}

fn set_padded(layer: &mut Vec<H256>, position: usize, node: H256, padding: H256) {
    if position >= layer.len() {
        layer.resize(position + 1, padding);
    }

    layer[position] = node;
}
