//! Benchmarks for domain construction and index translation.
//!
//! Run with: `cargo bench --bench domain_bench`
//!
//! Covers mask decoding, per-cell offset lookups, and the scatter step
//! that turns active-cell vectors into dense grid blocks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hydrogrid::domain::{Domain, PartitionPolicy};
use hydrogrid::output::scatter_to_grid;

/// Generate an n x n mask with roughly two thirds of the cells active.
fn generate_mask(n: usize) -> Vec<f64> {
    let mut mask = vec![0.0; n * n];
    for y in 0..n {
        for x in 0..n {
            if (x + y) % 3 != 0 {
                mask[y * n + x] = 1.0;
            }
        }
    }
    mask
}

/// Benchmark mask decoding at several grid sizes.
fn bench_domain_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("domain_build");

    for n in [64, 256, 512] {
        let mask = generate_mask(n);
        group.bench_with_input(BenchmarkId::new("from_mask", n), &n, |b, &n| {
            b.iter(|| Domain::from_mask(black_box(&mask), n, n).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the per-cell index lookups a record write performs.
fn bench_index_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_lookups");

    let n = 512;
    let domain = Domain::from_mask(&generate_mask(n), n, n).unwrap();
    let local = domain
        .local_subset(&PartitionPolicy::Contiguous { n_ranks: 16 }, 7)
        .unwrap();

    group.bench_function("grid_offsets", |b| {
        b.iter(|| {
            let mut sum = 0usize;
            for i in 0..domain.ncells_active {
                sum += domain.global_grid_offset(black_box(i));
            }
            sum
        });
    });

    group.bench_function("find_global", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for idx in (0..domain.ncells_global).step_by(97) {
                if local.find_global(black_box(idx)).is_some() {
                    found += 1;
                }
            }
            found
        });
    });

    group.finish();
}

/// Benchmark scattering active-cell values onto the dense grid.
fn bench_scatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("scatter");

    for n in [64, 256, 512] {
        let domain = Domain::from_mask(&generate_mask(n), n, n).unwrap();
        let values: Vec<f64> = (0..domain.ncells_active).map(|i| i as f64).collect();

        group.bench_with_input(BenchmarkId::new("to_grid", n), &n, |b, _| {
            b.iter(|| scatter_to_grid(black_box(&domain), black_box(&values), 0.0));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_domain_build, bench_index_lookups, bench_scatter);
criterion_main!(benches);
