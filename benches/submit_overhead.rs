//! Submit hot-path benchmark
//!
//! `submit()` runs once per completed request inside the load generator, so
//! it must stay cheap even while the evaluation loop is snapshotting.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench submit_overhead
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use latconv::{ConvergenceConfig, ConvergenceMonitor, SampleStore};

/// Benchmark: single-threaded submit with no evaluator running
fn bench_store_submit(c: &mut Criterion) {
    let store = SampleStore::new();
    let mut i = 0i64;

    c.bench_function("store_submit", |b| {
        b.iter(|| {
            black_box(store.submit(black_box(1_000_000 + i % 1000)));
            i += 1;
        });
    });
}

/// Benchmark: submit while the evaluation loop ticks in the background
///
/// Negative tolerance keeps the engine evaluating for the whole run.
fn bench_submit_with_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_with_engine");

    for tick_ms in [1u64, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(tick_ms), &tick_ms, |b, &tick_ms| {
            let config = ConvergenceConfig {
                tick_interval_ms: tick_ms,
                resamples: Some(100),
                seed: Some(1),
                ..ConvergenceConfig::new(1000, -1.0)
            };
            let monitor = ConvergenceMonitor::with_config(config).unwrap();
            let handle = monitor.spawn().unwrap();
            let mut i = 0i64;

            b.iter(|| {
                black_box(monitor.submit(black_box(1_000_000 + i % 1000)));
                i += 1;
            });

            handle.shutdown().unwrap();
        });
    }

    group.finish();
}

criterion_group!(benches, bench_store_submit, bench_submit_with_engine);
criterion_main!(benches);
