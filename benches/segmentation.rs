//! Benchmarks for entropy queries and the two segmentation searches.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shannonigans::changepoint::{
    dynp_detect, pelt_detect, DynpConfig, EntropyCost, PeltConfig, SegmentCost,
};
use shannonigans::entropy::{shannon_entropy, HistogramIndex};

/// Zero padding, repeated text, then pseudo-random bytes, in equal thirds.
fn generate_layout(n: usize) -> Vec<u8> {
    let third = n / 3;
    let mut buffer = vec![0u8; third];
    buffer.extend(
        b"lorem ipsum dolor sit amet "
            .iter()
            .cycle()
            .take(third)
            .copied(),
    );
    let mut state = 0x2545_f491_4f6c_dd1du64;
    while buffer.len() < n {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        buffer.push((state >> 56) as u8);
    }
    buffer
}

fn fitted(buffer: &[u8]) -> EntropyCost {
    let mut cost = EntropyCost::new();
    cost.fit(buffer).expect("benchmark input fits");
    cost
}

fn bench_entropy(c: &mut Criterion) {
    let mut group = c.benchmark_group("entropy");

    for size in [1024, 16384, 262144].iter() {
        let buffer = generate_layout(*size);
        let index = HistogramIndex::new(&buffer);

        group.bench_with_input(BenchmarkId::new("direct", size), size, |b, _| {
            b.iter(|| shannon_entropy(black_box(&buffer[size / 4..size * 3 / 4])))
        });

        group.bench_with_input(BenchmarkId::new("index_query", size), size, |b, _| {
            b.iter(|| index.entropy(black_box(size / 4), black_box(size * 3 / 4)))
        });

        group.bench_with_input(BenchmarkId::new("index_build", size), size, |b, _| {
            b.iter(|| HistogramIndex::new(black_box(&buffer)))
        });
    }

    group.finish();
}

fn bench_dynp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynp");
    group.sample_size(10);

    for size in [300, 600, 1200].iter() {
        let buffer = generate_layout(*size);
        let cost = fitted(&buffer);

        group.bench_with_input(BenchmarkId::new("k2", size), size, |b, _| {
            b.iter(|| dynp_detect(black_box(&cost), &DynpConfig::new(2)))
        });

        group.bench_with_input(BenchmarkId::new("k2_jump8", size), size, |b, _| {
            b.iter(|| dynp_detect(black_box(&cost), &DynpConfig::new(2).jump(8)))
        });
    }

    group.finish();
}

fn bench_pelt(c: &mut Criterion) {
    let mut group = c.benchmark_group("pelt");

    for size in [1200, 4800, 19200].iter() {
        let buffer = generate_layout(*size);
        let cost = fitted(&buffer);

        group.bench_with_input(BenchmarkId::new("penalty_40", size), size, |b, _| {
            b.iter(|| pelt_detect(black_box(&cost), &PeltConfig::new(40.0)))
        });

        group.bench_with_input(BenchmarkId::new("bic", size), size, |b, _| {
            b.iter(|| pelt_detect(black_box(&cost), &PeltConfig::with_bic_penalty(*size)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_entropy, bench_dynp, bench_pelt);
criterion_main!(benches);
