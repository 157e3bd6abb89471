// The `unused_crate_dependencies` lint checks every crate in a package separately.
// See <https://github.com/rust-lang/rust/issues/57274>.
#![allow(unused_crate_dependencies)]

use criterion::{BatchSize, Criterion, Throughput};
use deposit_tree::{DepositTree, MAX_DEPOSITS};
use easy_ext::ext;
use ethereum_types::H256;
use hashing::{HashingConfig, ParentLevelHasher};
use itertools::Itertools as _;
use merkle::Merkleizer;

// Criterion macros only add confusion.
fn main() {
    Criterion::default()
        .configure_from_args()
        .benchmark_parent_level("hashing::build_parent_level with 2 ** 10 nodes", 1 << 10)
        .benchmark_parent_level("hashing::build_parent_level with 2 ** 16 nodes", 1 << 16)
        .benchmark_parent_level("hashing::build_parent_level with 2 ** 20 nodes", 1 << 20)
        .benchmark_merkleize_vector("merkle::merkleize_vector with 2 ** 16 roots", 1 << 16)
        .benchmark_deposit_tree("deposit_tree::DepositTree with 2 ** 12 deposits", 1 << 12)
        .final_summary();
}

#[ext]
impl Criterion {
    fn benchmark_parent_level(&mut self, group_name: &str, length: u64) -> &mut Self {
        let level = nodes(length);
        let serial = parent_level_hasher(HashingConfig::serial());
        let parallel = parent_level_hasher(HashingConfig::default());

        self.benchmark_group(group_name)
            .throughput(Throughput::Elements(length))
            .bench_function("serial", |bencher| {
                bencher.iter(|| serial.build_parent_level(core::hint::black_box(&level)))
            })
            .bench_function("parallel", |bencher| {
                bencher.iter(|| parallel.build_parent_level(core::hint::black_box(&level)))
            });

        self
    }

    fn benchmark_merkleize_vector(&mut self, group_name: &str, length: u64) -> &mut Self {
        let roots = nodes(length);
        let serial = parent_level_hasher(HashingConfig::serial());
        let parallel = parent_level_hasher(HashingConfig::default());

        self.benchmark_group(group_name)
            .throughput(Throughput::Elements(length))
            .bench_function("serial", |bencher| {
                let merkleizer = Merkleizer::new(&serial);
                bencher.iter(|| merkleizer.merkleize_vector(core::hint::black_box(&roots), length))
            })
            .bench_function("parallel", |bencher| {
                let merkleizer = Merkleizer::new(&parallel);
                bencher.iter(|| merkleizer.merkleize_vector(core::hint::black_box(&roots), length))
            })
            .bench_function("parallel with list capacity of deposit tree", |bencher| {
                let merkleizer = Merkleizer::new(&parallel);
                bencher.iter(|| {
                    merkleizer.merkleize_vector(core::hint::black_box(&roots), MAX_DEPOSITS)
                })
            });

        self
    }

    fn benchmark_deposit_tree(&mut self, group_name: &str, length: u64) -> &mut Self {
        let leaves = nodes(length);

        self.benchmark_group(group_name)
            .throughput(Throughput::Elements(length))
            .bench_function("push_leaf", |bencher| {
                bencher.iter_batched_ref(
                    DepositTree::default,
                    |tree| {
                        for leaf in leaves.iter().copied() {
                            tree.push_leaf(leaf)?;
                        }

                        Ok::<_, deposit_tree::Error>(tree.root())
                    },
                    BatchSize::SmallInput,
                )
            })
            .bench_function("get_proof", |bencher| {
                let mut tree = DepositTree::default();

                for leaf in leaves.iter().copied() {
                    tree.push_leaf(leaf)
                        .expect("benchmark tree should have room for every leaf");
                }

                bencher.iter(|| {
                    (0..length)
                        .map(|index| tree.get_proof(core::hint::black_box(index)))
                        .collect_vec()
                })
            });

        self
    }
}

fn nodes(length: u64) -> Vec<H256> {
    (0..length).map(H256::from_low_u64_le).collect()
}

fn parent_level_hasher(config: HashingConfig) -> ParentLevelHasher {
    ParentLevelHasher::new(config).expect("benchmark thread pool should be created")
}
