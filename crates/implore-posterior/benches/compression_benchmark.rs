//! Compression and density benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use implore_posterior::{
    kde_1d, sample_compression_1d, sample_covariance, triangular_sample_compression_2d, Bounds,
    GaussianKde,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_samples(count: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(2024);
    let x: Vec<f64> = (0..count).map(|_| rng.random::<f64>()).collect();
    let y: Vec<f64> = x.iter().map(|&xi| xi + 0.3 * rng.random::<f64>()).collect();
    let w: Vec<f64> = (0..count).map(|_| rng.random::<f64>()).collect();
    (x, y, w)
}

fn bench_compression_1d(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_1d");
    for count in [1_000, 10_000, 100_000] {
        let (x, _, w) = generate_samples(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| sample_compression_1d(black_box(&x), Some(&w), 1000, &mut rng))
        });
    }
    group.finish();
}

fn bench_compression_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_2d");
    group.sample_size(20);
    for count in [2_000, 20_000] {
        let (x, y, w) = generate_samples(count);
        let cov = sample_covariance(&x, &y, Some(&w)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| {
                triangular_sample_compression_2d(black_box(&x), black_box(&y), &cov, Some(&w), 1000, &mut rng)
            })
        });
    }
    group.finish();
}

fn bench_kde_1d(c: &mut Criterion) {
    let (x, _, _) = generate_samples(5_000);
    let engine = GaussianKde::default();
    c.bench_function("kde_1d_bounded_5000", |b| {
        b.iter(|| kde_1d(&engine, black_box(&x), Bounds::between(0.0, 1.0)))
    });
}

criterion_group!(benches, bench_compression_1d, bench_compression_2d, bench_kde_1d);
criterion_main!(benches);
