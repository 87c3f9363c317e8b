use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cvalign::aligner::ReplicateAligner;
use cvalign::curve::{Curve, CurvePoint};

/// Triangular sweep with a small per-replicate voltage jitter and a few
/// points dropped from the end of later replicates
fn create_replicates(replicates: usize, points: usize) -> Vec<Curve> {
    (0..replicates)
        .map(|r| {
            let jitter = 0.001 * r as f64;
            let len = points.saturating_sub(r * 2).max(1);
            (0..len)
                .map(|i| {
                    let t = i as f64 / points as f64;
                    let voltage = if t < 0.5 { t * 2.0 } else { 2.0 - t * 2.0 } - 0.5 + jitter;
                    CurvePoint::new(voltage, (voltage * 8.0).sin() + r as f64 * 0.01)
                })
                .collect()
        })
        .collect()
}

/// Mostly direct index matches
fn bench_align_replicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_replicates");
    let aligner = ReplicateAligner::default();
    let points = 1000;

    for replicates in [2, 5, 10] {
        let curves = create_replicates(replicates, points);
        group.throughput(Throughput::Elements((replicates * points) as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", replicates, points)),
            &curves,
            |b, curves| {
                b.iter(|| {
                    let averaged = aligner.align(black_box(curves)).unwrap();
                    black_box(averaged)
                });
            },
        );
    }

    group.finish();
}

/// Every point falls back to the nearest-voltage search
fn bench_nearest_fallback(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_fallback");
    let aligner = ReplicateAligner::default();

    for points in [250, 1000, 4000] {
        let reference: Curve = (0..points)
            .map(|i| CurvePoint::new(i as f64 * 0.001, 1.0))
            .collect();
        // Offset by 30 samples (0.03 V) so index matching always misses
        let shifted: Curve = (30..points + 30)
            .map(|i| CurvePoint::new(i as f64 * 0.001, 2.0))
            .collect();
        let curves = vec![reference, shifted];
        group.throughput(Throughput::Elements(points as u64));

        group.bench_with_input(BenchmarkId::from_parameter(points), &curves, |b, curves| {
            b.iter(|| black_box(aligner.align(black_box(curves)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_align_replicates, bench_nearest_fallback);
criterion_main!(benches);
