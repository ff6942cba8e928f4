//! Cell Grid Benchmarks
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --package synopsis-media --bench cell_diff
//! ```
//!
//! # Metrics Measured
//! - Per-pair cell differencing at common lecture resolutions
//! - Cost of masking a presenter region

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{GrayImage, Luma};
use std::time::Duration;
use synopsis_media::keyframes::CellGrid;
use synopsis_media::HumanRegion;

/// Synthetic luma frame with some texture.
fn create_test_frame(width: u32, height: u32, seed: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([((x * 7 + y * 11 + seed * 13) % 256) as u8])
    })
}

fn bench_cell_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_diff");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    // Analysis resolutions after the default 0.5 resize.
    let resolutions = [(960, 540), (640, 360), (320, 180)];

    for (width, height) in resolutions {
        let grid = CellGrid::new(width, height, 16, 9).expect("grid");
        let lhs = create_test_frame(width, height, 1);
        let rhs = create_test_frame(width, height, 2);
        let presenter = HumanRegion::new(0, width / 5, 0, height);

        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::new("unmasked", format!("{}x{}", width, height)),
            &(&lhs, &rhs),
            |b, (lhs, rhs)| b.iter(|| grid.diff(black_box(lhs), black_box(rhs), None)),
        );
        group.bench_with_input(
            BenchmarkId::new("masked", format!("{}x{}", width, height)),
            &(&lhs, &rhs),
            |b, (lhs, rhs)| {
                b.iter(|| grid.diff(black_box(lhs), black_box(rhs), Some(&presenter)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_cell_diff);
criterion_main!(benches);
