//! Benchmarks for variogram fitting and ordinary kriging.
//!
//! Run with: cargo bench --package kriging --bench kriging_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kriging::{
    krige_2d, refine_axis, ExperimentalVariogram, KrigingConfig, OrdinaryKriging, Variogram,
    VariogramModel, DEFAULT_NLAGS,
};
use ocean_common::{Axis, Field2D};
use rand::Rng;

/// Generate scattered samples over a square with a smooth value plus noise.
fn generate_samples(count: usize, extent: f64) -> (Vec<[f64; 2]>, Vec<f64>) {
    let mut rng = rand::thread_rng();
    let mut points = Vec::with_capacity(count);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let x = rng.gen_range(0.0..extent);
        let y = rng.gen_range(0.0..extent);
        points.push([x, y]);
        values.push(50.0 + 0.01 * x - 0.02 * y + rng.gen_range(-1.0..1.0));
    }
    (points, values)
}

/// Generate a bathymetry-like field on a regular grid.
fn generate_bathymetry(nx: usize, ny: usize, spacing: f64) -> (Axis, Axis, Field2D) {
    let x = Axis::new("x_m", (0..nx).map(|i| i as f64 * spacing).collect()).unwrap();
    let y = Axis::new("y_m", (0..ny).map(|j| j as f64 * spacing).collect()).unwrap();
    let mut values = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let fx = i as f64 / nx as f64;
            let fy = j as f64 / ny as f64;
            values.push(80.0 + 30.0 * (fx * std::f64::consts::PI).sin() - 20.0 * fy);
        }
    }
    (x, y, Field2D::from_dense(ny, nx, values).unwrap())
}

// =============================================================================
// VARIOGRAM BENCHMARKS
// =============================================================================

fn bench_variogram_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("variogram_fit");

    for count in [50, 200, 800] {
        let (points, values) = generate_samples(count, 10_000.0);
        group.throughput(Throughput::Elements((count * (count - 1) / 2) as u64));
        group.bench_with_input(BenchmarkId::new("spherical", count), &count, |b, _| {
            b.iter(|| {
                let ev = ExperimentalVariogram::compute(black_box(&points), black_box(&values), DEFAULT_NLAGS);
                Variogram::fit(VariogramModel::Spherical, &ev)
            });
        });
    }

    group.finish();
}

// =============================================================================
// KRIGING SYSTEM BENCHMARKS
// =============================================================================

fn bench_factor_and_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordinary_kriging");

    for count in [50, 200, 400] {
        let (points, values) = generate_samples(count, 10_000.0);
        group.bench_with_input(BenchmarkId::new("fit", count), &count, |b, _| {
            b.iter(|| {
                OrdinaryKriging::fit(
                    black_box(points.clone()),
                    black_box(values.clone()),
                    VariogramModel::Spherical,
                    DEFAULT_NLAGS,
                )
                .unwrap()
            });
        });

        let model =
            OrdinaryKriging::fit(points.clone(), values.clone(), VariogramModel::Spherical, DEFAULT_NLAGS)
                .unwrap();
        group.bench_with_input(BenchmarkId::new("predict", count), &count, |b, _| {
            b.iter(|| model.predict(black_box(&[5_000.0, 5_000.0])).unwrap());
        });
    }

    group.finish();
}

// =============================================================================
// GRID BENCHMARKS
// =============================================================================

fn bench_krige_2d_refined(c: &mut Criterion) {
    let mut group = c.benchmark_group("krige_2d");
    let config = KrigingConfig::default();

    for (nx, ny, factor) in [(7, 6, 5), (12, 12, 5), (20, 20, 3)] {
        let (x, y, field) = generate_bathymetry(nx, ny, 9_000.0);
        let tx = refine_axis(&x, factor).unwrap();
        let ty = refine_axis(&y, factor).unwrap();
        let name = format!("{}x{}_x{}", nx, ny, factor);
        group.throughput(Throughput::Elements((tx.len() * ty.len()) as u64));
        group.bench_function(BenchmarkId::new("refined", name), |b| {
            b.iter(|| krige_2d(&x, &y, black_box(&field), &tx, &ty, &config).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_variogram_fit,
    bench_factor_and_predict,
    bench_krige_2d_refined
);
criterion_main!(benches);
