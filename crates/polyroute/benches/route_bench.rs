//! Criterion benchmarks for the four routing strategies.
//! Focus sizes: quad grids with n in {4, 8, 12} vertices per side.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use polyroute::api::{plane, quad_grid, route, RouterCfg, SternaCfg, SternaRouter, Strategy};

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    let cfg = RouterCfg::default();
    for &n in &[4usize, 8, 12] {
        let g = quad_grid(n, n);
        for strategy in [Strategy::ATrail, Strategy::Euler, Strategy::Sterna, Strategy::Xtrna] {
            group.bench_with_input(BenchmarkId::new(strategy.name(), n), &g, |b, g| {
                b.iter(|| {
                    let _routed = route(g, strategy, &cfg).unwrap();
                })
            });
        }
    }
    group.finish();
}

fn bench_min_kissing_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("sterna_min_kl");
    for &n in &[3usize, 4, 5] {
        let g = plane(n, n);
        let cfg = SternaCfg {
            minimize_kissing_loops: true,
            max_iterations: 2_000,
            ..SternaCfg::default()
        };
        group.bench_with_input(BenchmarkId::new("plane", n), &g, |b, g| {
            b.iter_batched(
                || SternaRouter::new(cfg.clone()),
                |mut router| {
                    let _routed = router.route(g).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_min_kissing_loops);
criterion_main!(benches);
