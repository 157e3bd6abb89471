use byteorder::{ByteOrder as _, LittleEndian};
use ethereum_types::H256;
use hashing::ZERO_HASHES;
use serde::{Deserialize, Serialize};
use serde_with::{As, DisplayFromStr, PickFirst, Same};

use crate::{
    deposit_tree::DEPOSIT_CONTRACT_TREE_DEPTH,
    error::{Error, ReadError},
};

const BYTES_PER_ROOT: usize = H256::len_bytes();
const BYTES_PER_LENGTH_OFFSET: usize = 4;

/// Size of the fixed part of an SSZ-encoded [`DepositTreeSnapshot`].
pub const SNAPSHOT_FIXED_SIZE: usize =
    BYTES_PER_LENGTH_OFFSET + BYTES_PER_ROOT + 8 + BYTES_PER_ROOT + 8;

/// Execution layer block that finalized deposits were taken from.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ExecutionBlock {
    pub hash: H256,
    pub height: u64,
}

/// Finalized part of a deposit tree.
///
/// Field names and the SSZ layout match the `DepositTreeSnapshot` container of
/// [EIP-4881](https://eips.ethereum.org/EIPS/eip-4881#specification).
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DepositTreeSnapshot {
    pub finalized: Vec<H256>,
    pub deposit_root: H256,
    #[serde(with = "As::<PickFirst<(Same, DisplayFromStr)>>")]
    pub deposit_count: u64,
    pub execution_block_hash: H256,
    #[serde(with = "As::<PickFirst<(Same, DisplayFromStr)>>")]
    pub execution_block_height: u64,
}

impl DepositTreeSnapshot {
    /// Builds a snapshot and computes its deposit root.
    pub fn from_tree_parts(
        finalized: Vec<H256>,
        deposit_count: u64,
        execution_block: ExecutionBlock,
    ) -> Result<Self, Error> {
        let mut snapshot = Self {
            finalized,
            deposit_root: H256::zero(),
            deposit_count,
            execution_block_hash: execution_block.hash,
            execution_block_height: execution_block.height,
        };

        snapshot.deposit_root = snapshot.calculate_root()?;

        Ok(snapshot)
    }

    #[must_use]
    pub const fn execution_block(&self) -> ExecutionBlock {
        ExecutionBlock {
            hash: self.execution_block_hash,
            height: self.execution_block_height,
        }
    }

    /// Root of a deposit tree whose first `deposit_count` leaves are covered by `finalized`.
    ///
    /// Every set bit of `deposit_count` corresponds to one finalized subtree, so the finalized
    /// roots are consumed from the smallest subtree (the last one) upwards.
    pub fn calculate_root(&self) -> Result<H256, Error> {
        let malformed = || Error::MalformedSnapshot {
            deposit_count: self.deposit_count,
            finalized_count: self.finalized.len(),
        };

        let mut size = self.deposit_count;
        let mut index = self.finalized.len();
        let mut root = ZERO_HASHES[0];

        for zero_hash in ZERO_HASHES.iter().copied().take(DEPOSIT_CONTRACT_TREE_DEPTH) {
            if size & 1 == 1 {
                index = index.checked_sub(1).ok_or_else(malformed)?;
                root = hashing::hash_256_256(self.finalized[index], root);
            } else {
                root = hashing::hash_256_256(root, zero_hash);
            }

            size >>= 1;
        }

        if index != 0 || size != 0 {
            return Err(malformed());
        }

        Ok(merkle::mix_in_length(root, self.deposit_count))
    }

    #[must_use]
    pub fn to_ssz_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; SNAPSHOT_FIXED_SIZE];

        let offset = u32::try_from(SNAPSHOT_FIXED_SIZE).expect("fixed size should fit in offset");

        let (offset_bytes, fields) = bytes.split_at_mut(BYTES_PER_LENGTH_OFFSET);
        let (deposit_root, fields) = fields.split_at_mut(BYTES_PER_ROOT);
        let (deposit_count, fields) = fields.split_at_mut(8);
        let (execution_block_hash, execution_block_height) = fields.split_at_mut(BYTES_PER_ROOT);

        LittleEndian::write_u32(offset_bytes, offset);
        deposit_root.copy_from_slice(self.deposit_root.as_bytes());
        LittleEndian::write_u64(deposit_count, self.deposit_count);
        execution_block_hash.copy_from_slice(self.execution_block_hash.as_bytes());
        LittleEndian::write_u64(execution_block_height, self.execution_block_height);

        for root in &self.finalized {
            bytes.extend_from_slice(root.as_bytes());
        }

        bytes
    }

    pub fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ReadError> {
        if bytes.len() < SNAPSHOT_FIXED_SIZE {
            return Err(ReadError::TooShort {
                minimum: SNAPSHOT_FIXED_SIZE,
                actual: bytes.len(),
            });
        }

        let (fixed_part, variable_part) = bytes.split_at(SNAPSHOT_FIXED_SIZE);
        let (offset_bytes, fields) = fixed_part.split_at(BYTES_PER_LENGTH_OFFSET);
        let (deposit_root, fields) = fields.split_at(BYTES_PER_ROOT);
        let (deposit_count, fields) = fields.split_at(8);
        let (execution_block_hash, execution_block_height) = fields.split_at(BYTES_PER_ROOT);

        let offset = LittleEndian::read_u32(offset_bytes);

        if usize::try_from(offset).ok() != Some(SNAPSHOT_FIXED_SIZE) {
            return Err(ReadError::ContainerFirstOffsetMismatch {
                expected: SNAPSHOT_FIXED_SIZE,
                actual: usize::try_from(offset).unwrap_or(usize::MAX),
            });
        }

        if variable_part.len() % BYTES_PER_ROOT != 0 {
            return Err(ReadError::ListLengthNotMultipleOfRoot {
                length: variable_part.len(),
            });
        }

        let finalized_count = variable_part.len() / BYTES_PER_ROOT;

        if finalized_count > DEPOSIT_CONTRACT_TREE_DEPTH {
            return Err(ReadError::ListTooLong {
                maximum: DEPOSIT_CONTRACT_TREE_DEPTH,
                actual: finalized_count,
            });
        }

        Ok(Self {
            finalized: variable_part
                .chunks_exact(BYTES_PER_ROOT)
                .map(H256::from_slice)
                .collect(),
            deposit_root: H256::from_slice(deposit_root),
            deposit_count: LittleEndian::read_u64(deposit_count),
            execution_block_hash: H256::from_slice(execution_block_hash),
            execution_block_height: LittleEndian::read_u64(execution_block_height),
        })
    }
}
