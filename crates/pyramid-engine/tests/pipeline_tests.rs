//! End-to-end pyramid pipeline tests: build → decompose → reconstruct.

use pyramid_engine::{
    apply_with_workers, expand, GaussianPyramid, LaplacianPyramid, PyramidOptions,
    ReconstructOptions, Result, RowOperator,
};
use raster_grid::RasterGrid;
use test_utils::{assert_approx_eq, constant_grid, hill_grid, random_grid, with_voids};

fn build(grid: RasterGrid, max_levels: usize) -> GaussianPyramid {
    let options = PyramidOptions {
        max_levels,
        min_cell_count: 1,
    };
    GaussianPyramid::build(grid, &options).unwrap()
}

#[test]
fn test_constant_four_by_four_end_to_end() {
    // 4x4 of constant 10 with two levels: every stage stays constant.
    let gaussian = build(constant_grid(4, 4, 10.0), 2);
    assert_eq!(gaussian.len(), 2);
    assert_eq!((gaussian.level(0).cols(), gaussian.level(0).rows()), (4, 4));
    assert_eq!((gaussian.level(1).cols(), gaussian.level(1).rows()), (2, 2));
    for level in gaussian.levels() {
        for &v in level.values() {
            assert_approx_eq!(v, 10.0, 1e-3);
        }
    }

    let laplacian = LaplacianPyramid::decompose(&gaussian).unwrap();
    for &v in laplacian.band(0).values() {
        assert_approx_eq!(v, 0.0, 1e-3);
    }
    for &v in laplacian.band(1).values() {
        assert_approx_eq!(v, 10.0, 1e-3);
    }

    let restored = laplacian
        .reconstruct(&ReconstructOptions::unit(laplacian.len()))
        .unwrap();
    assert_eq!((restored.cols(), restored.rows()), (4, 4));
    for &v in restored.values() {
        assert_approx_eq!(v, 10.0, 1e-3);
    }
}

#[test]
fn test_round_trip_on_rough_terrain() {
    let original = random_grid(53, 41, 9001);
    let gaussian = GaussianPyramid::build(original.clone(), &PyramidOptions::default()).unwrap();
    let laplacian = LaplacianPyramid::decompose(&gaussian).unwrap();
    let restored = laplacian
        .reconstruct(&ReconstructOptions::unit(laplacian.len()))
        .unwrap();
    for (a, b) in restored.values().iter().zip(original.values()) {
        assert_approx_eq!(*a, *b, 0.1);
    }
}

#[test]
fn test_central_void_does_not_leak() {
    let original = with_voids(hill_grid(17, 17), &[(8, 8)]);
    let gaussian = GaussianPyramid::build(original.clone(), &PyramidOptions::default()).unwrap();

    // The reduction renormalizes around the void, so every coarser level
    // is fully populated.
    for level in &gaussian.levels()[1..] {
        assert!(level.values().iter().all(|v| !v.is_nan()));
    }

    // The finest band carries the void — and only the void.
    let laplacian = LaplacianPyramid::decompose(&gaussian).unwrap();
    let voids = laplacian.band(0).values().iter().filter(|v| v.is_nan()).count();
    assert_eq!(voids, 1);
    assert!(laplacian.band(0).is_void(8, 8));

    // Reconstruction keeps the void void and everything else unchanged.
    let restored = laplacian
        .reconstruct(&ReconstructOptions::unit(laplacian.len()))
        .unwrap();
    assert!(restored.is_void(8, 8));
    for row in 0..17 {
        for col in 0..17 {
            if (col, row) == (8, 8) {
                continue;
            }
            assert_approx_eq!(restored.get(col, row), original.get(col, row), 0.05);
        }
    }
}

#[test]
fn test_suppressed_finest_band_equals_expanded_coarser_level() {
    // Zeroing the finest band's weight turns reconstruction into the
    // expansion of level 1: the coarser part of the round trip is exact.
    let original = random_grid(48, 32, 77);
    let gaussian = build(original, 2);
    let laplacian = LaplacianPyramid::decompose(&gaussian).unwrap();
    let mut options = ReconstructOptions::unit(laplacian.len());
    options.level_weights[0] = pyramid_engine::LevelWeights::uniform(0.0);
    let smoothed = laplacian.reconstruct(&options).unwrap();

    let reference = expand(gaussian.level(1), 48, 32).unwrap();
    for (a, b) in smoothed.values().iter().zip(reference.values()) {
        assert_approx_eq!(*a, *b, 1e-3);
    }
}

/// A deliberately order-sensitive neighborhood operator for checking that
/// chunked execution is invariant in the worker count.
struct BoxMean;

impl RowOperator for BoxMean {
    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        let cols = source.cols() as isize;
        let rows = source.rows() as isize;
        for (row, dest_row) in (start_row..end_row).zip(dest_rows.chunks_mut(cols as usize)) {
            for (col, dst) in dest_row.iter_mut().enumerate() {
                let mut sum = 0.0;
                let mut count = 0;
                for dr in -2isize..=2 {
                    for dc in -2isize..=2 {
                        let c = (col as isize + dc).clamp(0, cols - 1) as usize;
                        let r = (row as isize + dr).clamp(0, rows - 1) as usize;
                        let v = source.get(c, r);
                        if !v.is_nan() {
                            sum += v;
                            count += 1;
                        }
                    }
                }
                *dst = if count > 0 { sum / count as f32 } else { f32::NAN };
            }
        }
        Ok(())
    }
}

#[test]
fn test_worker_count_invariance_on_voided_terrain() {
    let grid = with_voids(random_grid(64, 47, 3), &[(0, 0), (13, 22), (63, 46), (30, 30)]);
    let serial = apply_with_workers(&BoxMean, &grid, 1).unwrap();
    for workers in [2, 5, 16] {
        let parallel = apply_with_workers(&BoxMean, &grid, workers).unwrap();
        assert_eq!(serial.values(), parallel.values(), "workers = {workers}");
    }
}
