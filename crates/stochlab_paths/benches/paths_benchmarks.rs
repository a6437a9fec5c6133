//! Criterion benchmarks for the CIR path simulator.
//!
//! Benchmarks cover:
//! - Single full-truncation Euler step
//! - Column sweep with varying path counts
//! - Column sweep vs per-path stream sweep (and rayon with `parallel`)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stochlab_core::rng::LabRng;
use stochlab_paths::{euler_full_truncation_step, CirParams, CirSimulator, SimulationConfig};

fn simulator(n_paths: usize, dt: f64) -> CirSimulator {
    let config = SimulationConfig::builder()
        .horizon(1.0)
        .dt(dt)
        .n_paths(n_paths)
        .build()
        .unwrap();
    CirSimulator::new(CirParams::default(), config)
}

/// Benchmark the per-cell kernel.
fn bench_step(c: &mut Criterion) {
    let params = CirParams::default();
    c.bench_function("euler_full_truncation_step", |b| {
        b.iter(|| {
            euler_full_truncation_step(
                black_box(&params),
                black_box(42.0),
                black_box(1e-4),
                black_box(0.003),
                0,
                1,
            )
        })
    });
}

/// Benchmark the column sweep with varying path counts.
fn bench_column_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_sweep");
    group.sample_size(20);

    for n_paths in [100, 1_000, 10_000] {
        let sim = simulator(n_paths, 0.001);
        group.bench_with_input(BenchmarkId::new("paths", n_paths), &sim, |b, sim| {
            b.iter(|| {
                let mut rng = LabRng::from_seed(42);
                black_box(sim.simulate(&mut rng).unwrap().terminal_mean())
            });
        });
    }

    group.finish();
}

/// Compare the sweep strategies on the same grid.
fn bench_sweep_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_strategy");
    group.sample_size(20);

    let sim = simulator(1_000, 0.001);

    group.bench_function("column", |b| {
        b.iter(|| {
            let mut rng = LabRng::from_seed(42);
            black_box(sim.simulate(&mut rng).unwrap().terminal_mean())
        });
    });

    group.bench_function("streams", |b| {
        b.iter(|| black_box(sim.simulate_streams(42).unwrap().terminal_mean()));
    });

    #[cfg(feature = "parallel")]
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(sim.simulate_parallel(42).unwrap().terminal_mean()));
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_column_sweep, bench_sweep_strategies);
criterion_main!(benches);
