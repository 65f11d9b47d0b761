use chain_table::bucket_array::BucketArray;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(capacity: usize, n: usize, seed: u64) -> BucketArray<u64> {
    let mut a = BucketArray::new(capacity);
    for (i, x) in lcg(seed).take(n).enumerate() {
        a.insert(key(x), i as u64);
    }
    a
}

// Cost of a single rehash, isolated from the policy.
fn bench_rehash(c: &mut Criterion) {
    c.bench_function("buckets::rehash_50k_into_100k", |b| {
        b.iter_batched(
            || filled(50_000, 50_000, 3),
            |mut a| black_box(a.rehash_into(100_000).unwrap()),
            BatchSize::SmallInput,
        )
    });
}

// Chain walking as buckets fill: 10k records over 10k, 1k and 100 buckets.
fn bench_chain_length(c: &mut Criterion) {
    for buckets in [10_000usize, 1_000, 100] {
        let a = filled(buckets, 10_000, 9);
        let keys: Vec<String> = lcg(9).take(10_000).map(key).collect();
        c.bench_function(&format!("buckets::get_10k_over_{buckets}"), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(a.get(k));
                }
            })
        });
    }
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_rehash, bench_chain_length
}
criterion_main!(benches);
