use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use bloomlist::services::bloom::{BloomFilterCore, codec};
use bloomlist::services::hash::HashStrategy;
use std::hint::black_box;

fn hashes(count: u32) -> Vec<HashStrategy> {
    (1..=count).map(|n| HashStrategy::repeated(n).unwrap()).collect()
}

fn filled(bits: usize, items: usize) -> BloomFilterCore {
    let mut core = BloomFilterCore::new(bits, hashes(3)).unwrap();
    for i in 0..items {
        core.add(&format!("www.site{}.com", i));
    }
    core
}

fn hash_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_repeated");
    for reps in [1u32, 4, 16] {
        let hash = HashStrategy::repeated(reps).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(reps), &hash, |b, hash| {
            b.iter(|| hash.hash(black_box("www.example.com/some/path")));
        });
    }
    group.finish();
}

fn filter_benchmarks(c: &mut Criterion) {
    c.bench_function("filter_add", |b| {
        let mut core = BloomFilterCore::new(1 << 16, hashes(3)).unwrap();
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            core.add(&format!("www.site{}.com", i))
        });
    });

    let core = filled(1 << 16, 1_000);
    c.bench_function("filter_query_hit", |b| {
        b.iter(|| core.query(black_box("www.site500.com")));
    });
    c.bench_function("filter_query_miss", |b| {
        b.iter(|| core.query(black_box("www.absent.com")));
    });

    let mut group = c.benchmark_group("filter_remove");
    for items in [100usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, &items| {
            b.iter_batched(
                || filled(1 << 16, items),
                |mut core| core.remove("www.site0.com"),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn codec_benchmarks(c: &mut Criterion) {
    let core = filled(1 << 14, 1_000);
    let record = codec::encode(&core);
    c.bench_function("codec_encode", |b| b.iter(|| codec::encode(black_box(&core))));
    c.bench_function("codec_decode", |b| b.iter(|| codec::decode(black_box(&record))));
}

criterion_group!(bloom, hash_benchmarks, filter_benchmarks, codec_benchmarks);
criterion_main!(bloom);
