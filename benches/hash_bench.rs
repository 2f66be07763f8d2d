//! Benchmarks for contenthash.
//!
//! Run with:
//!     cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use contenthash::{ChunkerConfig, Chunker, HashRegistry, HashType, HasherPools, PoolConfig};

fn pseudo_random(size: usize) -> Vec<u8> {
    let mut state = 0x853c_49e6_748f_ea9bu64;
    (0..size)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) as u8
        })
        .collect()
}

fn bench_hash_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_types");
    let pools = HasherPools::new(&HashRegistry::new(), PoolConfig::default());
    let size = 4 * 1024 * 1024;
    let data = pseudo_random(size);

    group.throughput(Throughput::Bytes(size as u64));
    for t in HashType::ALL.into_iter().filter(|t| !t.is_alias()) {
        group.bench_with_input(t.name(), &data, |b, data| {
            b.iter(|| black_box(pools.hash_bytes(t, black_box(data)).unwrap()));
        });
    }

    group.finish();
}

fn bench_chunker(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunker");

    for size in [64 * 1024, 1024 * 1024, 10 * 1024 * 1024] {
        let data = pseudo_random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(format!("random_{}kb", size / 1024), &data, |b, data| {
            let mut chunker = Chunker::new(ChunkerConfig::CHUNK_64K);
            b.iter(|| {
                let chunks = chunker.push(black_box(data));
                black_box((chunks.len(), chunker.finish()))
            });
        });

        // Uniform data never matches or always matches, depending on the table
        let zeros = vec![0u8; size];
        group.bench_with_input(format!("zeros_{}kb", size / 1024), &zeros, |b, data| {
            let mut chunker = Chunker::new(ChunkerConfig::CHUNK_64K);
            b.iter(|| {
                let chunks = chunker.push(black_box(data));
                black_box((chunks.len(), chunker.finish()))
            });
        });
    }

    group.finish();
}

fn bench_pool_acquire(c: &mut Criterion) {
    let pools = HasherPools::default();
    pools.warm(1);

    c.bench_function("pool_acquire_release", |b| {
        b.iter(|| {
            let hasher = pools.acquire(black_box(HashType::Dedup64K)).unwrap();
            hasher.release();
        });
    });
}

criterion_group!(benches, bench_hash_types, bench_chunker, bench_pool_acquire);
criterion_main!(benches);
