// The `unused_crate_dependencies` lint checks every crate in a package separately.
// See <https://github.com/rust-lang/rust/issues/57274>.
#![allow(unused_crate_dependencies)]

use criterion::{Bencher, Criterion, Throughput};
use ethereum_types::H256;
use sha2::{Digest as _, Sha256};
use tap::Conv as _;

// Criterion macros only add confusion.
fn main() {
    let mut criterion = Criterion::default().configure_from_args();

    criterion
        .benchmark_group("256 bits")
        .throughput(Throughput::Elements(1))
        .bench_function("hashing::hash", hash_a(hashing_hash_256))
        .bench_function("sha2::Sha256", hash_a(sha2_hash_256));

    criterion
        .benchmark_group("256 + 256 = 512 bits")
        .throughput(Throughput::Elements(1))
        .bench_function("hashing::hash_256_256", hash_a_b(hashing::hash_256_256))
        .bench_function("sha2::Sha256", hash_a_b(sha2_hash_256_256));

    criterion.final_summary();
}

fn hash_a<A: Default>(implementation: fn(A) -> H256) -> impl Fn(&mut Bencher) {
    move |bencher| bencher.iter(|| implementation(core::hint::black_box(A::default())))
}

fn hash_a_b<A: Default, B: Default>(implementation: fn(A, B) -> H256) -> impl Fn(&mut Bencher) {
    move |bencher| {
        bencher.iter(|| {
            implementation(
                core::hint::black_box(A::default()),
                core::hint::black_box(B::default()),
            )
        })
    }
}

fn hashing_hash_256(bytes: H256) -> H256 {
    hashing::hash(bytes)
}

fn sha2_hash_256(bytes: H256) -> H256 {
    H256(Sha256::digest(bytes).into())
}

fn sha2_hash_256_256(left: H256, right: H256) -> H256 {
    Sha256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .conv::<[u8; H256::len_bytes()]>()
        .into()
}
