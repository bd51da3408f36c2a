//! Gaussian image pyramid construction.

use crate::reduce::ReductionFilter;
use crate::Result;
use raster_grid::RasterGrid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Limits for pyramid construction.
///
/// Serde-derived so a host application can carry these in generalization
/// presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PyramidOptions {
    /// Upper bound on the number of levels, including level 0. Treated as
    /// at least 1.
    pub max_levels: usize,
    /// A level with fewer cells than this is not added.
    pub min_cell_count: usize,
}

impl Default for PyramidOptions {
    fn default() -> Self {
        Self {
            max_levels: 32,
            min_cell_count: 4,
        }
    }
}

/// An ordered sequence of grids, finest first.
///
/// Level 0 is the input grid unmodified; each subsequent level is the
/// [`ReductionFilter::reduce_half`] of its predecessor: ⌈n/2⌉ per side,
/// doubled cell size, shared origin. Construction stops at `max_levels`,
/// when the next level would hold fewer than `min_cell_count` cells, or
/// once a level that can no longer be halved (a side of 2 or less) has
/// been emitted. No level smaller than that terminal size ever exists.
#[derive(Debug, Clone)]
pub struct GaussianPyramid {
    levels: Vec<RasterGrid>,
}

impl GaussianPyramid {
    /// Build the pyramid for `grid`.
    pub fn build(grid: RasterGrid, options: &PyramidOptions) -> Result<Self> {
        let filter = ReductionFilter;
        let max_levels = options.max_levels.max(1);
        let mut levels = vec![grid];
        loop {
            if levels.len() >= max_levels {
                break;
            }
            let current = &levels[levels.len() - 1];
            if current.cols() <= 2 || current.rows() <= 2 {
                break;
            }
            let next = filter.reduce_half(current)?;
            if next.cols() * next.rows() < options.min_cell_count {
                break;
            }
            levels.push(next);
        }
        debug!(
            levels = levels.len(),
            base_cols = levels[0].cols(),
            base_rows = levels[0].rows(),
            "built gaussian pyramid"
        );
        Ok(Self { levels })
    }

    /// All levels, finest first. Never empty.
    pub fn levels(&self) -> &[RasterGrid] {
        &self.levels
    }

    /// Level `i`; level 0 is the input grid.
    ///
    /// # Panics
    /// Panics when `i` is out of range.
    pub fn level(&self, i: usize) -> &RasterGrid {
        &self.levels[i]
    }

    /// Number of levels, at least 1.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The full-resolution level.
    pub fn finest(&self) -> &RasterGrid {
        &self.levels[0]
    }

    /// The lowest-resolution level.
    pub fn coarsest(&self) -> &RasterGrid {
        &self.levels[self.levels.len() - 1]
    }

    /// Consume the pyramid, returning its levels finest first.
    pub fn into_levels(self) -> Vec<RasterGrid> {
        self.levels
    }
}
