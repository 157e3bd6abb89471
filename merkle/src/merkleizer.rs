// Merkleization pads every level to an even length with the root of an all-zero subtree of the
// same height, so only the chunks that are actually present get hashed:
// ```text
// height 2            ┌──────────── x ────────────┐
// height 1      ┌──── ab ────┐            ┌──── c0 ────┐
// height 0      a            b            c          Z[0]
// ```
// With a capacity of 8 the single root at height 2 would be paired with `Z[2]`, and so on.

use ethereum_types::H256;
use hashing::{ParentLevelHasher, ZERO_HASHES};

use crate::error::Error;

pub const BYTES_PER_CHUNK: usize = 32;

/// Computes SSZ hash tree roots of vectors and lists of chunks.
#[derive(Clone, Copy, Debug)]
pub struct Merkleizer<'hasher> {
    hasher: &'hasher ParentLevelHasher,
}

impl Default for Merkleizer<'static> {
    fn default() -> Self {
        Self::new(ParentLevelHasher::global())
    }
}

impl<'hasher> Merkleizer<'hasher> {
    #[must_use]
    pub const fn new(hasher: &'hasher ParentLevelHasher) -> Self {
        Self { hasher }
    }

    /// Root of a vector of `roots` padded with zero chunks up to `max_capacity`.
    pub fn merkleize_vector(&self, roots: &[H256], max_capacity: u64) -> Result<H256, Error> {
        let depth = depth_for_capacity(max_capacity);

        if roots.len() as u64 > max_capacity {
            return Err(Error::CapacityExceeded {
                length: roots.len(),
                capacity: max_capacity,
            });
        }

        if roots.is_empty() {
            return Ok(ZERO_HASHES[depth]);
        }

        features::log!(
            DebugMerkleization,
            "merkleizing {} roots in tree of depth {depth}",
            roots.len(),
        );

        let mut level = roots.to_vec();

        for height in 0..depth {
            if level.len() % 2 == 1 {
                level.push(ZERO_HASHES[height]);
            }

            level = self.hasher.build_parent_level(&level)?;
        }

        assert_eq!(level.len(), 1, "merkleization should end with exactly one root");

        Ok(level[0])
    }

    /// Root of an SSZ list: the vector root with the number of elements mixed in.
    pub fn merkleize_vector_and_mixin_length(
        &self,
        roots: &[H256],
        max_capacity: u64,
    ) -> Result<H256, Error> {
        let root = self.merkleize_vector(roots, max_capacity)?;
        Ok(mix_in_length(root, roots.len() as u64))
    }

    /// Splits `bytes` into chunks (zero-padding the last one) and merkleizes them as a vector.
    pub fn merkleize_bytes(
        &self,
        bytes: impl AsRef<[u8]>,
        max_chunk_count: u64,
    ) -> Result<H256, Error> {
        let chunks = bytes
            .as_ref()
            .chunks(BYTES_PER_CHUNK)
            .map(|partial_chunk| {
                let mut chunk = H256::zero();
                chunk[..partial_chunk.len()].copy_from_slice(partial_chunk);
                chunk
            })
            .collect::<Vec<_>>();

        self.merkleize_vector(&chunks, max_chunk_count)
    }
}

pub fn merkleize_vector(roots: &[H256], max_capacity: u64) -> Result<H256, Error> {
    Merkleizer::default().merkleize_vector(roots, max_capacity)
}

pub fn merkleize_vector_and_mixin_length(
    roots: &[H256],
    max_capacity: u64,
) -> Result<H256, Error> {
    Merkleizer::default().merkleize_vector_and_mixin_length(roots, max_capacity)
}

pub fn merkleize_bytes(bytes: impl AsRef<[u8]>, max_chunk_count: u64) -> Result<H256, Error> {
    Merkleizer::default().merkleize_bytes(bytes, max_chunk_count)
}

#[must_use]
pub fn mix_in_length(root: H256, length: u64) -> H256 {
    hashing::hash_256_256(root, hash_of_length(length))
}

/// `length` as a little-endian integer padded to a full chunk.
#[must_use]
pub fn hash_of_length(length: u64) -> H256 {
    let mut hash = H256::zero();
    hash[..core::mem::size_of::<u64>()].copy_from_slice(&length.to_le_bytes());
    hash
}

// Smallest depth of a tree with at least `capacity` leaves.
pub(crate) fn depth_for_capacity(capacity: u64) -> usize {
    capacity
        .checked_next_power_of_two()
        .map_or(u64::BITS, u64::trailing_zeros)
        .try_into()
        .expect("number of bits in u64 should fit in usize")
}

#[cfg(test)]
mod tests {
    use hashing::{hash_256_256, HashingConfig};
    use hex_literal::hex;
    use test_case::test_case;

    use super::*;

    fn roots(count: u64) -> Vec<H256> {
        (0..count).map(|index| hashing::hash(index.to_le_bytes())).collect()
    }

    #[test_case(0, 0)]
    #[test_case(1, 0)]
    #[test_case(2, 1)]
    #[test_case(3, 2)]
    #[test_case(16, 4)]
    #[test_case(17, 5)]
    #[test_case(1 << 32, 32)]
    #[test_case(u64::MAX, 64)]
    fn depth_for_capacity_rounds_up(capacity: u64, expected: usize) {
        assert_eq!(depth_for_capacity(capacity), expected);
    }

    #[test_case(1)]
    #[test_case(3)]
    #[test_case(16)]
    #[test_case(1 << 32)]
    #[test_case(u64::MAX)]
    fn empty_vector_has_root_of_zero_subtree(capacity: u64) -> Result<(), Error> {
        assert_eq!(
            merkleize_vector(&[], capacity)?,
            ZERO_HASHES[depth_for_capacity(capacity)],
        );

        Ok(())
    }

    #[test]
    fn empty_vector_of_capacity_16_has_root_of_zero_subtree_of_depth_4() -> Result<(), Error> {
        assert_eq!(merkleize_vector(&[], 16)?, hashing::zero_hash(4));
        Ok(())
    }

    #[test]
    fn vector_exceeding_capacity_is_rejected() {
        let root = H256::repeat_byte(1);

        assert!(matches!(
            merkleize_vector(&[root; 4], 3),
            Err(Error::CapacityExceeded {
                length: 4,
                capacity: 3,
            }),
        ));
    }

    #[test]
    fn single_root_of_unit_capacity_is_its_own_root() -> Result<(), Error> {
        let root = H256::repeat_byte(7);
        assert_eq!(merkleize_vector(&[root], 1)?, root);
        Ok(())
    }

    #[test]
    fn every_level_is_padded_with_zero_hash_of_its_own_height() -> Result<(), Error> {
        let [a, b, c] = [1, 2, 3].map(H256::repeat_byte);

        let height_1 = [hash_256_256(a, b), hash_256_256(c, ZERO_HASHES[0])];
        let height_2 = hash_256_256(height_1[0], height_1[1]);

        assert_eq!(merkleize_vector(&[a, b, c], 4)?, height_2);
        assert_eq!(
            merkleize_vector(&[a, b, c], 8)?,
            hash_256_256(height_2, ZERO_HASHES[2]),
        );

        Ok(())
    }

    #[test_case(0)]
    #[test_case(1)]
    #[test_case(5)]
    #[test_case(64)]
    fn list_root_mixes_in_number_of_roots(count: u64) -> Result<(), Error> {
        let roots = roots(count);

        assert_eq!(
            merkleize_vector_and_mixin_length(&roots, 1 << 10)?,
            mix_in_length(merkleize_vector(&roots, 1 << 10)?, count),
        );

        Ok(())
    }

    #[test]
    fn mix_in_length_hashes_root_with_little_endian_length() {
        let root = H256::repeat_byte(0xab);

        let mut concatenation = [0; 64];
        concatenation[..32].copy_from_slice(root.as_bytes());
        concatenation[32..40].copy_from_slice(&0x0102_u64.to_le_bytes());

        assert_eq!(mix_in_length(root, 0x0102), hashing::hash(concatenation));
    }

    #[test]
    fn empty_list_of_depth_32_matches_empty_deposit_root() {
        assert_eq!(
            mix_in_length(ZERO_HASHES[32], 0),
            H256(hex!(
                "d70a234731285c6804c2a4f56711ddb8c82c99740f207854891028af34e27e5e"
            )),
        );
    }

    #[test]
    fn merkleize_bytes_pads_last_chunk_with_zeros() -> Result<(), Error> {
        let bytes = [0xff; 33];

        let mut last_chunk = H256::zero();
        last_chunk.0[0] = 0xff;

        assert_eq!(
            merkleize_bytes(bytes, 2)?,
            hash_256_256(H256::repeat_byte(0xff), last_chunk),
        );

        Ok(())
    }

    #[test]
    fn merkleize_bytes_rejects_too_many_chunks() {
        assert!(matches!(
            merkleize_bytes([0; 65], 2),
            Err(Error::CapacityExceeded {
                length: 3,
                capacity: 2,
            }),
        ));
    }

    #[test_case(1 << 14; "parallel levels")]
    #[test_case(100; "serial levels")]
    fn merkleizers_agree_regardless_of_hasher(count: u64) -> Result<(), Error> {
        let roots = roots(count);

        let serial_hasher = ParentLevelHasher::new(HashingConfig::serial())?;
        let eager_hasher = ParentLevelHasher::new(HashingConfig {
            min_parallelization_size: 2,
            parallel_workers: 3,
        })?;

        let expected = Merkleizer::new(&serial_hasher).merkleize_vector(&roots, 1 << 20)?;

        assert_eq!(merkleize_vector(&roots, 1 << 20)?, expected);
        assert_eq!(
            Merkleizer::new(&eager_hasher).merkleize_vector(&roots, 1 << 20)?,
            expected,
        );

        Ok(())
    }
}
