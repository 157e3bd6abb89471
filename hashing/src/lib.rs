pub use ethereum_types::H256;

pub use crate::{
    config::HashingConfig,
    error::Error,
    parallel::{
        build_parent_level, build_parent_level_serial, hash_batch, ParentLevelHasher,
        MIN_PARALLELIZATION_SIZE,
    },
    zero_hashes::{zero_hash, MAX_ZERO_HASH_DEPTH, ZERO_HASHES},
};

use generic_array::GenericArray;
use hex_literal::hex;
use sha2::{
    digest::{core_api::BlockSizeUser, generic_array::typenum::Unsigned as _},
    Digest as _, Sha256,
};

mod config;
mod error;
mod parallel;
mod zero_hashes;

// Surprisingly, hardcoding the padding is enough to yield a significant speedup.
// Precomputing its schedule and using it directly in `sha2` has next to no effect.
//
// `sha2::Sha256` also slows down significantly when LTO is enabled.
// `sha2::compress256` does not, so `hash_256_256` is unaffected.

// This one has nothing but padding.
#[rustfmt::skip]
const PADDING_BLOCK_FOR_512_BITS: Sha256Block = hex!("
    80000000 00000000 00000000 00000000
    00000000 00000000 00000000 00000000
    00000000 00000000 00000000 00000000
    00000000 00000000 00000000 00000200
");

type Sha256BlockSize = <Sha256 as BlockSizeUser>::BlockSize;
type Sha256Block = [u8; Sha256BlockSize::USIZE];

struct Sha256State([u32; 8]);

impl Default for Sha256State {
    #[rustfmt::skip]
    fn default() -> Self {
        Self([
            0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a,
            0x510e_527f, 0x9b05_688c, 0x1f83_d9ab, 0x5be0_cd19,
        ])
    }
}

impl Sha256State {
    // Moving blocks into an array is faster than calling `sha2::compress256` multiple times.
    fn compress_multiple(mut self, blocks: &[GenericArray<u8, Sha256BlockSize>]) -> Self {
        sha2::compress256(&mut self.0, blocks);
        self
    }

    fn output(self) -> H256 {
        let mut output = H256::default();

        for (o, s) in output.as_bytes_mut().chunks_exact_mut(4).zip(self.0) {
            o.copy_from_slice(&s.to_be_bytes());
        }

        output
    }
}

/// SHA-256 of an arbitrary byte string.
#[inline]
#[must_use]
pub fn hash(bytes: impl AsRef<[u8]>) -> H256 {
    H256(Sha256::digest(bytes).into())
}

/// Combines two roots into their parent: `SHA-256(left ‖ right)`.
#[inline]
#[must_use]
pub fn hash_256_256(left: H256, right: H256) -> H256 {
    let mut block = GenericArray::default();
    block[..32].copy_from_slice(left.as_bytes());
    block[32..].copy_from_slice(right.as_bytes());

    let padding_block = *GenericArray::from_slice(&PADDING_BLOCK_FOR_512_BITS);

    Sha256State::default()
        .compress_multiple(&[block, padding_block])
        .output()
}
