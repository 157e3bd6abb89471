use ethereum_types::H256;
use once_cell::sync::Lazy;

use crate::hash_256_256;

/// Depth of the deepest all-zero subtree with a precomputed root.
///
/// Any `u64` capacity fits in a tree of this depth, so no merkleization can run past the table.
pub const MAX_ZERO_HASH_DEPTH: usize = 64;

/// Roots of all-zero subtrees indexed by depth.
///
/// `ZERO_HASHES[0]` is the zero chunk itself.
/// Every other entry is the parent of two copies of the entry below it.
/// The table is computed on first access and never changes afterwards.
pub static ZERO_HASHES: Lazy<[H256; MAX_ZERO_HASH_DEPTH + 1]> = Lazy::new(|| {
    let mut zero_hashes = [H256::zero(); MAX_ZERO_HASH_DEPTH + 1];

    for depth in 1..=MAX_ZERO_HASH_DEPTH {
        let below = zero_hashes[depth - 1];
        zero_hashes[depth] = hash_256_256(below, below);
    }

    zero_hashes
});

/// Root of an all-zero subtree of height `depth`.
///
/// # Panics
///
/// Panics if `depth` exceeds [`MAX_ZERO_HASH_DEPTH`].
#[inline]
#[must_use]
pub fn zero_hash(depth: usize) -> H256 {
    ZERO_HASHES[depth]
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use itertools::Itertools as _;
    use test_case::test_case;

    use super::*;

    #[test]
    fn higher_zero_hashes_are_calculated_from_lower_ones() {
        for (lower, higher) in ZERO_HASHES.iter().copied().tuple_windows() {
            assert_eq!(hash_256_256(lower, lower), higher);
        }
    }

    #[test_case(0, hex!("0000000000000000000000000000000000000000000000000000000000000000"))]
    #[test_case(1, hex!("f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"))]
    #[test_case(2, hex!("db56114e00fdd4c1f85c892bf35ac9a89289aaecb1ebd0a96cde606a748b5d71"))]
    #[test_case(4, hex!("536d98837f2dd165a55d5eeae91485954472d56f246df256bf3cae19352a123c"))]
    #[test_case(29, hex!("8869ff2c22b28cc10510d9853292803328be4fb0e80495e8bb8d271f5b889636"))]
    #[test_case(31, hex!("985e929f70af28d0bdd1a90a808f977f597c7c778c489e98d3bd8910d31ac0f7"))]
    #[test_case(32, hex!("c6f67e02e6e4e1bdefb994c6098953f34636ba2b6ca20a4721d2b26a886722ff"))]
    #[test_case(40, hex!("6bfe8d2bcc4237b74a5047058ef455339ecd7360cb63bfbb8ee5448e6430ba04"))]
    fn zero_hash_matches_consensus_constants(depth: usize, expected: [u8; 32]) {
        assert_eq!(zero_hash(depth), H256(expected));
    }

    #[test]
    fn zero_hashes_are_shared_between_threads() {
        let from_other_thread = std::thread::spawn(|| ZERO_HASHES[MAX_ZERO_HASH_DEPTH])
            .join()
            .expect("thread reading zero hashes should not panic");

        assert_eq!(from_other_thread, ZERO_HASHES[MAX_ZERO_HASH_DEPTH]);
    }
}
