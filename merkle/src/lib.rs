pub use crate::{
    error::Error,
    merkleizer::{
        hash_of_length, merkleize_bytes, merkleize_vector, merkleize_vector_and_mixin_length,
        mix_in_length, Merkleizer, BYTES_PER_CHUNK,
    },
    proof::{is_valid_merkle_branch, root_from_branch, verify_proof},
    sparse::{SparseMerkleTree, MAX_TREE_DEPTH},
};

mod error;
mod merkleizer;
mod proof;
mod sparse;
