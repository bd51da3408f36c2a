//! Plan curvature support for ridge/valley-adaptive reconstruction.
//!
//! Only the curvature *sign* separates ridges from valleys, so a 3×3
//! second-derivative stencil against the 4-neighbor mean is enough; the
//! magnitude pyramid built by [`curvature_weight_pyramid`] is min-max
//! normalized per level into [0, 1] for use as reconstruction curvature
//! bands.

use crate::gaussian::GaussianPyramid;
use crate::parallel::{apply, RowOperator};
use crate::Result;
use raster_grid::RasterGrid;

/// Plan curvature of `grid` at `(col, row)`: positive on convex forms
/// (ridges), negative on concave forms (valleys).
///
/// Neighbors are edge-replicated; void neighbors are dropped from the
/// mean. Void at the center, or no valid neighbor, yields NaN.
#[inline]
pub fn plan_curvature(grid: &RasterGrid, col: usize, row: usize) -> f32 {
    let center = grid.get(col, row);
    if center.is_nan() {
        return f32::NAN;
    }
    let cols = grid.cols() as isize;
    let rows = grid.rows() as isize;
    let mut sum = 0.0f32;
    let mut count = 0u32;
    let offsets = [(0isize, -1isize), (0, 1), (-1, 0), (1, 0)];
    for (dc, dr) in offsets {
        let c = (col as isize + dc).clamp(0, cols - 1) as usize;
        let r = (row as isize + dr).clamp(0, rows - 1) as usize;
        let v = grid.get(c, r);
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        return f32::NAN;
    }
    center - sum / count as f32
}

struct PlanCurvatureOp;

impl RowOperator for PlanCurvatureOp {
    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        let cols = source.cols();
        for (row, dest_row) in (start_row..end_row).zip(dest_rows.chunks_mut(cols)) {
            for (col, dst) in dest_row.iter_mut().enumerate() {
                *dst = plan_curvature(source, col, row);
            }
        }
        Ok(())
    }
}

/// Per-level normalized [0, 1] curvature magnitudes for a Gaussian
/// pyramid, sized identically to its levels — suitable as the curvature
/// bands of an adaptive reconstruction.
pub fn curvature_weight_pyramid(pyramid: &GaussianPyramid) -> Result<Vec<RasterGrid>> {
    let mut bands = Vec::with_capacity(pyramid.len());
    for level in pyramid.levels() {
        let mut magnitudes = apply(&PlanCurvatureOp, level)?;
        for v in magnitudes.values_mut() {
            *v = v.abs();
        }
        if let Some((lo, hi)) = magnitudes.min_max() {
            let span = hi - lo;
            if span > 0.0 {
                for v in magnitudes.values_mut() {
                    *v = (*v - lo) / span;
                }
            } else {
                for v in magnitudes.values_mut() {
                    if !v.is_nan() {
                        *v = 0.0;
                    }
                }
            }
        }
        bands.push(magnitudes);
    }
    Ok(bands)
}
