//! Benchmarks for subject estimation and model algebra

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use neurocast_core::sim::{simulate_locations, simulate_subject};
use neurocast_core::{estimate_subject, LocationRegistry, Model, RbfKernel};

fn bench_estimate_subject(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_subject");
    let mut rng = StdRng::seed_from_u64(71);

    for grid_size in [16, 32, 64].iter() {
        let grid = simulate_locations(*grid_size, &mut rng);
        let registry = LocationRegistry::from_locations(&grid);
        let recording = simulate_subject(&grid, 8, 100, &mut rng).expect("simulation succeeds");
        let kernel = RbfKernel::default();

        group.bench_with_input(
            BenchmarkId::from_parameter(grid_size),
            grid_size,
            |b, _| {
                b.iter(|| {
                    let contribution =
                        estimate_subject(black_box(&recording), &registry, &kernel)
                            .expect("estimation succeeds");
                    black_box(contribution)
                });
            },
        );
    }
    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(73);
    let grid = simulate_locations(64, &mut rng);
    let registry = LocationRegistry::from_locations(&grid);
    let cohort: Vec<_> = (0..4)
        .map(|_| simulate_subject(&grid, 8, 100, &mut rng).expect("simulation succeeds"))
        .collect();
    let kernel = RbfKernel::default();
    let a = Model::from_cohort(&cohort[0..2], registry.clone(), kernel).expect("cohort builds");
    let b = Model::from_cohort(&cohort[2..4], registry, kernel).expect("cohort builds");

    c.bench_function("combine_64_grid", |bench| {
        bench.iter(|| {
            let merged = black_box(&a).combine(black_box(&b)).expect("registries match");
            black_box(merged)
        });
    });
}

criterion_group!(benches, bench_estimate_subject, bench_combine);
criterion_main!(benches);
