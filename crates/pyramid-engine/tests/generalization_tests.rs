//! Adaptive reconstruction tests: distance weighting, level-of-detail
//! masks, and curvature-directed ridge/valley weights.

use pyramid_engine::{
    curvature_weight_pyramid, expand, AboveThresholdMask, CurvatureWeighting, CurvatureWeights,
    DistanceWeightInterpolator, GaussianPyramid, LaplacianPyramid, LevelWeights, PyramidOptions,
    RasterMask, ReconstructOptions,
};
use raster_grid::RasterGrid;
use test_utils::{assert_approx_eq, random_grid, unit_layout};

fn two_level(grid: RasterGrid) -> (GaussianPyramid, LaplacianPyramid) {
    let options = PyramidOptions {
        max_levels: 2,
        min_cell_count: 1,
    };
    let gaussian = GaussianPyramid::build(grid, &options).unwrap();
    let laplacian = LaplacianPyramid::decompose(&gaussian).unwrap();
    (gaussian, laplacian)
}

#[test]
fn test_distance_weight_ramps_detail_across_grid() {
    let original = random_grid(40, 24, 11);
    let (gaussian, laplacian) = two_level(original.clone());
    let interpolator = DistanceWeightInterpolator::new(0.0);
    let mut options = ReconstructOptions::unit(laplacian.len());
    // Full detail at the west edge (weight 0 there picks the background),
    // fully smoothed at the east edge.
    options.level_weights[0] = LevelWeights {
        foreground: 0.0,
        background: 1.0,
    };
    options.interpolator = Some(&interpolator);
    let result = laplacian.reconstruct(&options).unwrap();

    let smoothed = expand(gaussian.level(1), 40, 24).unwrap();
    for row in 0..24 {
        // West edge keeps the original surface.
        assert_approx_eq!(result.get(0, row), original.get(0, row), 0.05);
        // East edge is the expanded coarse level.
        assert_approx_eq!(result.get(39, row), smoothed.get(39, row), 0.05);
    }
}

#[test]
fn test_lod_mask_confines_smoothing_to_high_ground() {
    // West half at elevation 100, east half at 900, detail everywhere.
    let cols = 32;
    let rows = 16;
    let mut values = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let base = if col < cols / 2 { 100.0 } else { 900.0 };
            let detail = if (col + row) % 2 == 0 { 4.0 } else { -4.0 };
            values.push(base + detail);
        }
    }
    let original = RasterGrid::new(unit_layout(cols, rows), values).unwrap();
    let (gaussian, laplacian) = two_level(original.clone());

    // Suppress bands only where the mask fires: above 500 m.
    let mask = AboveThresholdMask::new(gaussian.clone(), 500.0, 0.0);
    let mut options = ReconstructOptions::unit(laplacian.len());
    options.level_weights[0] = LevelWeights::uniform(0.0);
    options.mask = Some(&mask);
    let result = laplacian.reconstruct(&options).unwrap();

    let smoothed = expand(gaussian.level(1), cols, rows).unwrap();
    for row in 2..rows - 2 {
        // Low ground: mask weight 0 forces w = 1, the band passes intact.
        assert_approx_eq!(result.get(4, row), original.get(4, row), 1e-3);
        // High ground: band suppressed, coarse surface remains.
        assert_approx_eq!(result.get(cols - 4, row), smoothed.get(cols - 4, row), 1e-3);
    }
}

#[test]
fn test_zero_raster_mask_disables_weighting() {
    let original = random_grid(24, 24, 5);
    let (_, laplacian) = two_level(original);

    // A raster mask of all zeros pins w = 1 everywhere, so even aggressive
    // band weights fall back to plain summation.
    let zeros = GaussianPyramid::build(
        RasterGrid::filled(unit_layout(24, 24), 0.0).unwrap(),
        &PyramidOptions {
            max_levels: 2,
            min_cell_count: 1,
        },
    )
    .unwrap();
    let mask = RasterMask::new(zeros);
    let mut masked = ReconstructOptions::unit(laplacian.len());
    masked.level_weights[0] = LevelWeights::uniform(3.0);
    masked.mask = Some(&mask);
    let with_mask = laplacian.reconstruct(&masked).unwrap();

    let plain = laplacian
        .reconstruct(&ReconstructOptions::unit(laplacian.len()))
        .unwrap();
    for (a, b) in with_mask.values().iter().zip(plain.values()) {
        assert_approx_eq!(*a, *b, 1e-4);
    }
}

#[test]
fn test_zero_curvature_bands_change_nothing() {
    let original = random_grid(32, 32, 21);
    let (_, laplacian) = two_level(original);

    let flat: Vec<RasterGrid> = laplacian
        .bands()
        .iter()
        .map(|band| RasterGrid::filled(band.layout(), 0.0).unwrap())
        .collect();
    let curvature = CurvatureWeighting {
        weights: CurvatureWeights {
            ridges: LevelWeights::uniform(9.0),
            valleys: LevelWeights::uniform(-9.0),
            exponent: 2.0,
        },
        bands: &flat,
    };
    let mut options = ReconstructOptions::unit(laplacian.len());
    options.curvature = Some(curvature);
    let adaptive = laplacian.reconstruct(&options).unwrap();
    let plain = laplacian
        .reconstruct(&ReconstructOptions::unit(laplacian.len()))
        .unwrap();
    // Zero strength everywhere: the ridge/valley term vanishes exactly.
    assert_eq!(adaptive.values(), plain.values());
}

#[test]
fn test_curvature_weighting_amplifies_relief() {
    let original = random_grid(48, 48, 13);
    let options = PyramidOptions::default();
    let gaussian = GaussianPyramid::build(original, &options).unwrap();
    let laplacian = LaplacianPyramid::decompose(&gaussian).unwrap();
    let strengths = curvature_weight_pyramid(&gaussian).unwrap();

    let curvature = CurvatureWeighting {
        weights: CurvatureWeights {
            ridges: LevelWeights::uniform(2.0),
            valleys: LevelWeights::uniform(2.0),
            exponent: 1.0,
        },
        bands: &strengths,
    };
    let mut boosted_options = ReconstructOptions::unit(laplacian.len());
    boosted_options.curvature = Some(curvature);
    let boosted = laplacian.reconstruct(&boosted_options).unwrap();
    let plain = laplacian
        .reconstruct(&ReconstructOptions::unit(laplacian.len()))
        .unwrap();

    // Extra positive band weight on both forms exaggerates relief: the
    // value range must widen.
    let (lo_b, hi_b) = boosted.min_max().unwrap();
    let (lo_p, hi_p) = plain.min_max().unwrap();
    assert!(hi_b - lo_b > hi_p - lo_p);
}
