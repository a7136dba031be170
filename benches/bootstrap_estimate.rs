//! Bootstrap evaluation cost benchmark
//!
//! One evaluation draws `resamples × samples` random indices, so its cost
//! grows with both. This tracks how long a single tick takes as the sample
//! store fills.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench bootstrap_estimate
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use latconv::stats::{bootstrap_mean, BootstrapEstimate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn latencies(n: usize) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(17);
    (0..n).map(|_| rng.gen_range(500_000..5_000_000)).collect()
}

fn bench_bootstrap_mean(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap_mean");

    for n in [100usize, 1_000, 10_000] {
        let samples = latencies(n);
        let mut rng = StdRng::seed_from_u64(1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &samples, |b, samples| {
            b.iter(|| black_box(bootstrap_mean(black_box(samples), &mut rng).unwrap()));
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap_estimate");
    group.sample_size(20);

    for (n, resamples) in [(1_000usize, 100usize), (1_000, 1_000), (10_000, 1_000)] {
        let samples = latencies(n);
        let mut rng = StdRng::seed_from_u64(1);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}", n), resamples),
            &resamples,
            |b, &resamples| {
                b.iter(|| {
                    black_box(BootstrapEstimate::compute(&samples, resamples, &mut rng).unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_bootstrap_mean, bench_estimate);
criterion_main!(benches);
