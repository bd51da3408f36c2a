//! Level-of-detail masks: per-cell, per-level band weighting.
//!
//! A mask controls how strongly a Laplacian band contributes during
//! reconstruction at each cell. The three variants (threshold-above,
//! threshold-below, raster-backed) all answer through the one capability
//! trait; there is no mask class hierarchy and no process-wide mask state —
//! masks are threaded through reconstruction as explicit arguments.

use crate::gaussian::GaussianPyramid;
use raster_grid::RasterGrid;

/// A per-cell, per-pyramid-level weight in [0, 1].
///
/// Stateless apart from construction-time parameters; shared read-only
/// across the reconstruction workers.
pub trait LevelOfDetailMask: Sync {
    /// Weight for cell `(col, row)` of pyramid level `level`.
    fn weight(&self, col: usize, row: usize, level: usize) -> f32;
}

/// Clamped read of the mask's backing pyramid.
///
/// Levels beyond the backing pyramid fall back to its coarsest level, and
/// indices are clamped to the level's dimensions, so a mask built from a
/// slightly different grid never panics mid-reconstruction.
fn backing_value(pyramid: &GaussianPyramid, col: usize, row: usize, level: usize) -> f32 {
    let grid: &RasterGrid = pyramid.level(level.min(pyramid.len() - 1));
    grid.get(col.min(grid.cols() - 1), row.min(grid.rows() - 1))
}

/// 0 below `threshold - margin`, 1 above `threshold + margin`, linear ramp
/// between.
fn ramp(value: f32, threshold: f32, margin: f32) -> f32 {
    if margin <= 0.0 {
        return if value >= threshold { 1.0 } else { 0.0 };
    }
    ((value - (threshold - margin)) / (2.0 * margin)).clamp(0.0, 1.0)
}

/// Full weight above a value threshold, none below, with a linear ramp of
/// half-width `margin` around the threshold. Values come from an owned
/// pyramid of the masking quantity (typically elevation).
///
/// A void backing cell yields weight 1.0: where the mask has no data, the
/// band passes through unattenuated.
pub struct AboveThresholdMask {
    pyramid: GaussianPyramid,
    threshold: f32,
    margin: f32,
}

impl AboveThresholdMask {
    pub fn new(pyramid: GaussianPyramid, threshold: f32, margin: f32) -> Self {
        Self {
            pyramid,
            threshold,
            margin,
        }
    }
}

impl LevelOfDetailMask for AboveThresholdMask {
    fn weight(&self, col: usize, row: usize, level: usize) -> f32 {
        let value = backing_value(&self.pyramid, col, row, level);
        if value.is_nan() {
            return 1.0;
        }
        ramp(value, self.threshold, self.margin)
    }
}

/// Mirror image of [`AboveThresholdMask`]: full weight below the
/// threshold, none above.
pub struct BelowThresholdMask {
    pyramid: GaussianPyramid,
    threshold: f32,
    margin: f32,
}

impl BelowThresholdMask {
    pub fn new(pyramid: GaussianPyramid, threshold: f32, margin: f32) -> Self {
        Self {
            pyramid,
            threshold,
            margin,
        }
    }
}

impl LevelOfDetailMask for BelowThresholdMask {
    fn weight(&self, col: usize, row: usize, level: usize) -> f32 {
        let value = backing_value(&self.pyramid, col, row, level);
        if value.is_nan() {
            return 1.0;
        }
        1.0 - ramp(value, self.threshold, self.margin)
    }
}

/// A mask backed by a pyramid of weights read directly (clamped to [0, 1]).
pub struct RasterMask {
    pyramid: GaussianPyramid,
}

impl RasterMask {
    pub fn new(pyramid: GaussianPyramid) -> Self {
        Self { pyramid }
    }
}

impl LevelOfDetailMask for RasterMask {
    fn weight(&self, col: usize, row: usize, level: usize) -> f32 {
        let value = backing_value(&self.pyramid, col, row, level);
        if value.is_nan() {
            return 1.0;
        }
        value.clamp(0.0, 1.0)
    }
}
