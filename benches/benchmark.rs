use criterion::{black_box, criterion_group, criterion_main, Criterion};
use collatz_hailstone_net::*;
use num_bigint::BigUint;

fn bench_build_small(c: &mut Criterion) {
    c.bench_function("build 1..=127", |b| {
        b.iter(|| build_graph(black_box(127), DEFAULT_MAX_STEPS))
    });
}

fn bench_build_medium(c: &mut Criterion) {
    c.bench_function("build 1..=1023", |b| {
        b.iter(|| build_graph(black_box(1023), DEFAULT_MAX_STEPS))
    });
}

fn bench_log_radius_layout(c: &mut Criterion) {
    let g = build_graph(1023, DEFAULT_MAX_STEPS).unwrap();
    c.bench_function("log radius layout 1..=1023", |b| {
        b.iter(|| log_radius_layout(black_box(&g)))
    });
}

fn bench_spiral_layout(c: &mut Criterion) {
    let g = build_graph(1023, DEFAULT_MAX_STEPS).unwrap();
    c.bench_function("spiral layout 1..=1023", |b| {
        b.iter(|| spiral_layout(black_box(&g)))
    });
}

fn bench_hierarchy_layout(c: &mut Criterion) {
    let g = build_graph(1023, DEFAULT_MAX_STEPS).unwrap().reversed();
    c.bench_function("hierarchy layout 1..=1023", |b| {
        b.iter(|| hierarchy_layout(black_box(&g), Some(1), &HierarchyOptions::default()))
    });
}

fn bench_trajectory_27(c: &mut Criterion) {
    let start = BigUint::from(27u64);
    c.bench_function("trajectory 27->1", |b| {
        b.iter(|| trace_trajectory(black_box(&start), 1000))
    });
}

criterion_group!(
    benches,
    bench_build_small,
    bench_build_medium,
    bench_log_radius_layout,
    bench_spiral_layout,
    bench_hierarchy_layout,
    bench_trajectory_27,
);
criterion_main!(benches);
