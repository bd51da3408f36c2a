//! Laplacian (band-pass) pyramids: decomposition, adaptive reconstruction,
//! and mask-driven merging.
//!
//! A band is the cell-wise difference between a Gaussian level and the
//! expansion of the next coarser level; the coarsest band is the coarsest
//! Gaussian level verbatim. Summing the bands back up (expanding the
//! running sum before each addition) reproduces the original grid, and
//! weighting each band's contribution per cell — by distance across the
//! grid, by terrain form (ridge vs valley), and by a level-of-detail mask —
//! yields the generalized raster.

use crate::curvature::plan_curvature;
use crate::distance::DistanceWeightInterpolator;
use crate::expand::expand;
use crate::gaussian::GaussianPyramid;
use crate::lod::LevelOfDetailMask;
use crate::parallel::{apply, apply_in_place, RowOperator};
use crate::{EngineError, Result};
use raster_grid::RasterGrid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A band's base weight at the two ends of the front/back axis.
///
/// Without a [`DistanceWeightInterpolator`] the foreground value is used
/// everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelWeights {
    pub foreground: f32,
    pub background: f32,
}

impl LevelWeights {
    /// The same weight at both ends.
    pub fn uniform(weight: f32) -> Self {
        Self {
            foreground: weight,
            background: weight,
        }
    }
}

impl Default for LevelWeights {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Ridge/valley weighting parameters for curvature-adaptive
/// reconstruction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurvatureWeights {
    /// Extra band weight on convex forms, fore/back interpolated.
    pub ridges: LevelWeights,
    /// Extra band weight on concave forms, fore/back interpolated.
    pub valleys: LevelWeights,
    /// Exponent applied to the smoothed curvature strength in [0, 1].
    pub exponent: f32,
}

impl Default for CurvatureWeights {
    fn default() -> Self {
        Self {
            ridges: LevelWeights::default(),
            valleys: LevelWeights::default(),
            exponent: 1.0,
        }
    }
}

/// Curvature weighting plus the per-level smoothed curvature grids
/// (typically from [`curvature_weight_pyramid`]) that scale it.
///
/// [`curvature_weight_pyramid`]: crate::curvature::curvature_weight_pyramid
#[derive(Debug, Clone, Copy)]
pub struct CurvatureWeighting<'a> {
    pub weights: CurvatureWeights,
    /// One [0, 1] curvature grid per band, sized like the bands.
    pub bands: &'a [RasterGrid],
}

/// Everything that shapes an adaptive reconstruction. All weighting
/// sources are explicit arguments; there is no process-wide mask state.
pub struct ReconstructOptions<'a> {
    /// One entry per band, finest first.
    pub level_weights: Vec<LevelWeights>,
    pub curvature: Option<CurvatureWeighting<'a>>,
    pub mask: Option<&'a dyn LevelOfDetailMask>,
    pub interpolator: Option<&'a DistanceWeightInterpolator>,
}

impl ReconstructOptions<'_> {
    /// Unit weights, no curvature, no mask, no interpolator: exact
    /// summation, the inverse of [`LaplacianPyramid::decompose`].
    pub fn unit(levels: usize) -> Self {
        ReconstructOptions {
            level_weights: vec![LevelWeights::default(); levels],
            curvature: None,
            mask: None,
            interpolator: None,
        }
    }
}

/// Band-pass pyramid derived from a [`GaussianPyramid`], finest band
/// first.
#[derive(Debug, Clone)]
pub struct LaplacianPyramid {
    bands: Vec<RasterGrid>,
}

impl LaplacianPyramid {
    /// Derive the band-pass bands of a Gaussian pyramid.
    ///
    /// `bands[i] = levels[i] − expand(levels[i+1])` cell-wise (void where
    /// either operand is void); the coarsest band is the coarsest level
    /// verbatim.
    pub fn decompose(pyramid: &GaussianPyramid) -> Result<Self> {
        let levels = pyramid.levels();
        let Some(last) = levels.len().checked_sub(1) else {
            return Err(EngineError::EmptyPyramid);
        };
        let mut bands = Vec::with_capacity(levels.len());
        for level in 0..last {
            let fine = &levels[level];
            let expanded = expand(&levels[level + 1], fine.cols(), fine.rows())?;
            fine.ensure_same_extent(&expanded)?;
            bands.push(apply(&DifferenceOp { subtrahend: &expanded }, fine)?);
        }
        bands.push(levels[last].clone());
        debug!(bands = bands.len(), "decomposed gaussian pyramid");
        Ok(Self { bands })
    }

    /// All bands, finest first.
    pub fn bands(&self) -> &[RasterGrid] {
        &self.bands
    }

    /// Band `i`; band 0 has the resolution of the source grid.
    ///
    /// # Panics
    /// Panics when `i` is out of range.
    pub fn band(&self, i: usize) -> &RasterGrid {
        &self.bands[i]
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Consume the pyramid, returning its bands finest first.
    pub fn into_bands(self) -> Vec<RasterGrid> {
        self.bands
    }

    /// Recombine the bands into a raster, weighting each band's
    /// contribution per cell.
    ///
    /// Starting from the coarsest band (pre-scaled by the fore/back blend
    /// when an interpolator is supplied), the running sum is expanded to
    /// the next band's size and each cell accumulates
    /// `band · w` with
    ///
    /// ```text
    /// w = 1 + (w_band + w_ridge_or_valley · w_curv − 1) · w_mask
    /// ```
    ///
    /// where `w_band` is the level weight (fore/back interpolated), the
    /// ridge/valley weight is chosen by the sign of the plan curvature of
    /// the running sum at that cell and scaled by the smoothed curvature
    /// strength raised to the configured exponent, and `w_mask` is the
    /// level-of-detail mask weight (1 without a mask). With unit weights
    /// and neither curvature nor mask this is exact summation.
    pub fn reconstruct(&self, options: &ReconstructOptions<'_>) -> Result<RasterGrid> {
        let Some(last) = self.bands.len().checked_sub(1) else {
            return Err(EngineError::EmptyPyramid);
        };
        if options.level_weights.len() != self.bands.len() {
            return Err(EngineError::LevelCountMismatch {
                what: "level weight",
                got: options.level_weights.len(),
                expected: self.bands.len(),
            });
        }
        if let Some(curvature) = &options.curvature {
            if curvature.bands.len() != self.bands.len() {
                return Err(EngineError::LevelCountMismatch {
                    what: "curvature band",
                    got: curvature.bands.len(),
                    expected: self.bands.len(),
                });
            }
            for (curv, band) in curvature.bands.iter().zip(&self.bands) {
                band.ensure_same_extent(curv)?;
            }
        }

        let mut sum = self.bands[last].clone();
        if let Some(interpolator) = options.interpolator {
            let prescale = PrescaleOp {
                weights: options.level_weights[last],
                interpolator,
                cols: sum.cols(),
                rows: sum.rows(),
            };
            apply_in_place(&prescale, &mut sum)?;
        }
        for level in (0..last).rev() {
            let band = &self.bands[level];
            let expanded = expand(&sum, band.cols(), band.rows())?;
            band.ensure_same_extent(&expanded)?;
            let accumulate = AccumulateBandOp {
                band,
                level,
                weights: options.level_weights[level],
                curvature: options.curvature,
                mask: options.mask,
                interpolator: options.interpolator,
            };
            sum = apply(&accumulate, &expanded)?;
        }
        Ok(sum)
    }

    /// Blend another pyramid into this one under a binary spatial mask,
    /// level by level, finest to coarsest.
    ///
    /// The mask is softened first — cells 4-adjacent to a 0/1 boundary get
    /// weight 0.5 — then each band becomes `a·w + b·(1−w)` in place (w = 1
    /// keeps this pyramid's cell verbatim, w = 0 takes the other's), and
    /// the mask is decimated by stride-2 subsampling, no filtering, for
    /// the next coarser level.
    pub fn merge(&mut self, other: &LaplacianPyramid, spatial_mask: &RasterGrid) -> Result<()> {
        if self.bands.len() != other.bands.len() {
            return Err(EngineError::LevelCountMismatch {
                what: "merge band",
                got: other.bands.len(),
                expected: self.bands.len(),
            });
        }
        let levels = self.bands.len();
        let mut mask = spatial_mask.clone();
        for level in 0..levels {
            let band = &mut self.bands[level];
            band.ensure_same_extent(&other.bands[level])?;
            band.ensure_same_extent(&mask)?;
            let softened = apply(&SoftenMaskOp, &mask)?;
            let blend = BlendOp {
                other: &other.bands[level],
                weights: &softened,
            };
            apply_in_place(&blend, band)?;
            if level + 1 < levels {
                mask = apply(&DecimateMaskOp, &mask)?;
            }
        }
        debug!(levels, "merged pyramids under spatial mask");
        Ok(())
    }
}

/// Cell-wise `source − subtrahend`; void where either operand is void.
struct DifferenceOp<'a> {
    subtrahend: &'a RasterGrid,
}

impl RowOperator for DifferenceOp<'_> {
    fn in_place_safe(&self) -> bool {
        true
    }

    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        _end_row: usize,
    ) -> Result<()> {
        let offset = start_row * source.cols();
        let minuend = &source.values()[offset..offset + dest_rows.len()];
        let subtrahend = &self.subtrahend.values()[offset..offset + dest_rows.len()];
        for ((dst, &a), &b) in dest_rows.iter_mut().zip(minuend).zip(subtrahend) {
            *dst = a - b;
        }
        Ok(())
    }

    fn operate_in_place(&self, rows: &mut [f32], start_row: usize, _end_row: usize) -> Result<()> {
        let offset = start_row * self.subtrahend.cols();
        let subtrahend = &self.subtrahend.values()[offset..offset + rows.len()];
        for (dst, &b) in rows.iter_mut().zip(subtrahend) {
            *dst -= b;
        }
        Ok(())
    }
}

/// Scales the coarsest band by the fore/back blend before accumulation.
struct PrescaleOp<'a> {
    weights: LevelWeights,
    interpolator: &'a DistanceWeightInterpolator,
    cols: usize,
    rows: usize,
}

impl PrescaleOp<'_> {
    #[inline]
    fn factor(&self, col: usize, row: usize) -> f32 {
        self.interpolator.interpolate(
            self.weights.foreground,
            self.weights.background,
            col,
            row,
            self.cols,
            self.rows,
        )
    }
}

impl RowOperator for PrescaleOp<'_> {
    fn in_place_safe(&self) -> bool {
        true
    }

    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        let offset = start_row * self.cols;
        let src = &source.values()[offset..offset + dest_rows.len()];
        for (i, (dst, &v)) in dest_rows.iter_mut().zip(src).enumerate() {
            let (col, row) = (i % self.cols, start_row + i / self.cols);
            debug_assert!(row < end_row);
            *dst = v * self.factor(col, row);
        }
        Ok(())
    }

    fn operate_in_place(&self, rows: &mut [f32], start_row: usize, _end_row: usize) -> Result<()> {
        for (i, v) in rows.iter_mut().enumerate() {
            let (col, row) = (i % self.cols, start_row + i / self.cols);
            *v *= self.factor(col, row);
        }
        Ok(())
    }
}

/// One reconstruction step: `dest = sum + band · w` with the adaptive
/// per-cell weight. Reads a 3×3 neighborhood of the accumulator for the
/// curvature sign, so it refuses in-place use.
struct AccumulateBandOp<'a> {
    band: &'a RasterGrid,
    level: usize,
    weights: LevelWeights,
    curvature: Option<CurvatureWeighting<'a>>,
    mask: Option<&'a dyn LevelOfDetailMask>,
    interpolator: Option<&'a DistanceWeightInterpolator>,
}

impl AccumulateBandOp<'_> {
    #[inline]
    fn interpolated(&self, weights: LevelWeights, col: usize, row: usize) -> f32 {
        match self.interpolator {
            Some(interpolator) => interpolator.interpolate(
                weights.foreground,
                weights.background,
                col,
                row,
                self.band.cols(),
                self.band.rows(),
            ),
            None => weights.foreground,
        }
    }

    /// The adaptive weight `w` for one cell, given the accumulator so far.
    fn cell_weight(&self, accumulator: &RasterGrid, col: usize, row: usize) -> f32 {
        let w_band = self.interpolated(self.weights, col, row);
        let mut detail = w_band;
        if let Some(curvature) = &self.curvature {
            let strength = curvature.bands[self.level].get(col, row);
            if strength.is_finite() && strength > 0.0 {
                let form = if plan_curvature(accumulator, col, row) >= 0.0 {
                    curvature.weights.ridges
                } else {
                    curvature.weights.valleys
                };
                let w_form = self.interpolated(form, col, row);
                detail += w_form * strength.powf(curvature.weights.exponent);
            }
        }
        let w_mask = self
            .mask
            .map_or(1.0, |mask| mask.weight(col, row, self.level));
        1.0 + (detail - 1.0) * w_mask
    }
}

impl RowOperator for AccumulateBandOp<'_> {
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
                let w = self.cell_weight(source, col, row);
                *dst = source.get(col, row) + self.band.get(col, row) * w;
            }
        }
        Ok(())
    }
}

/// Marks mask cells 4-adjacent to a 0/1 boundary with weight 0.5.
struct SoftenMaskOp;

impl RowOperator for SoftenMaskOp {
    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        let cols = source.cols() as isize;
        let rows = source.rows() as isize;
        let offsets = [(0isize, -1isize), (0, 1), (-1, 0), (1, 0)];
        for (row, dest_row) in (start_row..end_row).zip(dest_rows.chunks_mut(cols as usize)) {
            for (col, dst) in dest_row.iter_mut().enumerate() {
                let v = source.get(col, row);
                let mut w = v;
                for (dc, dr) in offsets {
                    let c = col as isize + dc;
                    let r = row as isize + dr;
                    if (0..cols).contains(&c)
                        && (0..rows).contains(&r)
                        && source.get(c as usize, r as usize) != v
                    {
                        w = 0.5;
                        break;
                    }
                }
                *dst = w;
            }
        }
        Ok(())
    }
}

/// In-place blend `a·w + b·(1−w)` with the softened mask weights. The
/// extremes short-circuit so a void in the non-selected pyramid cannot
/// leak into the result.
struct BlendOp<'a> {
    other: &'a RasterGrid,
    weights: &'a RasterGrid,
}

#[inline]
fn blend(a: f32, b: f32, w: f32) -> f32 {
    if w >= 1.0 {
        a
    } else if w <= 0.0 {
        b
    } else {
        a * w + b * (1.0 - w)
    }
}

impl RowOperator for BlendOp<'_> {
    fn in_place_safe(&self) -> bool {
        true
    }

    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        _end_row: usize,
    ) -> Result<()> {
        let offset = start_row * source.cols();
        let len = dest_rows.len();
        let a = &source.values()[offset..offset + len];
        let b = &self.other.values()[offset..offset + len];
        let w = &self.weights.values()[offset..offset + len];
        for i in 0..len {
            dest_rows[i] = blend(a[i], b[i], w[i]);
        }
        Ok(())
    }

    fn operate_in_place(&self, rows: &mut [f32], start_row: usize, _end_row: usize) -> Result<()> {
        let offset = start_row * self.other.cols();
        let len = rows.len();
        let b = &self.other.values()[offset..offset + len];
        let w = &self.weights.values()[offset..offset + len];
        for i in 0..len {
            rows[i] = blend(rows[i], b[i], w[i]);
        }
        Ok(())
    }
}

/// Stride-2 subsampling of the spatial mask, no filtering.
struct DecimateMaskOp;

impl RowOperator for DecimateMaskOp {
    fn output_layout(&self, source: &RasterGrid) -> raster_grid::GridLayout {
        source.layout().halved()
    }

    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        let out_cols = source.cols().div_ceil(2);
        for (row, dest_row) in (start_row..end_row).zip(dest_rows.chunks_mut(out_cols)) {
            for (col, dst) in dest_row.iter_mut().enumerate() {
                *dst = source.get(2 * col, 2 * row);
            }
        }
        Ok(())
    }
}
