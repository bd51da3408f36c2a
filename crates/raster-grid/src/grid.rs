//! The raster grid entity and its world-space layout.

use crate::{GridError, GridResult};
use serde::{Deserialize, Serialize};

/// World-space layout of a raster grid.
///
/// `cell_size` is in world units per cell; `west`/`north` locate the outer
/// edge of the top-left cell. All pyramid levels derived from a grid share
/// the same origin while cell size doubles per level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Number of columns
    pub cols: usize,
    /// Number of rows
    pub rows: usize,
    /// Size of one cell in world units
    pub cell_size: f64,
    /// X world coordinate of the west edge
    pub west: f64,
    /// Y world coordinate of the north edge
    pub north: f64,
}

impl GridLayout {
    /// Create a layout, validating the grid invariants.
    pub fn new(cols: usize, rows: usize, cell_size: f64, west: f64, north: f64) -> GridResult<Self> {
        let layout = Self {
            cols,
            rows,
            cell_size,
            west,
            north,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check the layout invariants: at least one cell per side, positive
    /// finite cell size.
    pub fn validate(&self) -> GridResult<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(GridError::InvalidDimensions {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// True when the layout describes no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same layout with different dimensions (origin and cell size kept).
    pub fn with_size(&self, cols: usize, rows: usize) -> Self {
        Self { cols, rows, ..*self }
    }

    /// Layout of the next coarser pyramid level: ⌈n/2⌉ per side, doubled
    /// cell size, fixed origin.
    pub fn halved(&self) -> Self {
        Self {
            cols: self.cols.div_ceil(2),
            rows: self.rows.div_ceil(2),
            cell_size: self.cell_size * 2.0,
            ..*self
        }
    }

    /// Layout of the next finer pyramid level, clamped to `(max_cols,
    /// max_rows)` so expansion phase-aligns with levels whose dimensions do
    /// not halve evenly.
    pub fn expanded(&self, max_cols: usize, max_rows: usize) -> Self {
        Self {
            cols: (self.cols * 2).min(max_cols),
            rows: (self.rows * 2).min(max_rows),
            cell_size: self.cell_size / 2.0,
            ..*self
        }
    }

    /// Whether two layouts describe the same extent at the same resolution:
    /// identical dimensions, cell size, and origin. Binary grid operators
    /// require this before touching any data.
    pub fn same_extent_and_resolution(&self, other: &Self) -> bool {
        self.cols == other.cols
            && self.rows == other.rows
            && self.cell_size == other.cell_size
            && self.west == other.west
            && self.north == other.north
    }
}

/// A row-major grid of `f32` cells. `NaN` cells are void (no data).
///
/// Ownership follows the producer: whichever operator allocates a grid is
/// its single writer during construction; once handed downstream the grid
/// is read-only (or cloned).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    layout: GridLayout,
    values: Vec<f32>,
}

impl RasterGrid {
    /// Create a grid from a row-major value buffer.
    pub fn new(layout: GridLayout, values: Vec<f32>) -> GridResult<Self> {
        layout.validate()?;
        if values.len() != layout.len() {
            return Err(GridError::ValueLengthMismatch {
                cols: layout.cols,
                rows: layout.rows,
                expected: layout.len(),
                got: values.len(),
            });
        }
        Ok(Self { layout, values })
    }

    /// Create a grid with every cell set to `value`.
    pub fn filled(layout: GridLayout, value: f32) -> GridResult<Self> {
        layout.validate()?;
        let values = vec![value; layout.len()];
        Ok(Self { layout, values })
    }

    /// Create an all-void grid. Destination grids are allocated this way so
    /// unwritten cells read as missing data rather than garbage.
    pub fn void(layout: GridLayout) -> GridResult<Self> {
        Self::filled(layout, f32::NAN)
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn cols(&self) -> usize {
        self.layout.cols
    }

    pub fn rows(&self) -> usize {
        self.layout.rows
    }

    pub fn cell_size(&self) -> f64 {
        self.layout.cell_size
    }

    pub fn west(&self) -> f64 {
        self.layout.west
    }

    pub fn north(&self) -> f64 {
        self.layout.north
    }

    /// Cell value at `(col, row)`. `NaN` means void.
    ///
    /// # Panics
    /// Panics on out-of-bounds indices.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f32 {
        debug_assert!(col < self.layout.cols && row < self.layout.rows);
        self.values[row * self.layout.cols + col]
    }

    /// Set the cell value at `(col, row)`.
    ///
    /// # Panics
    /// Panics on out-of-bounds indices.
    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: f32) {
        debug_assert!(col < self.layout.cols && row < self.layout.rows);
        self.values[row * self.layout.cols + col] = value;
    }

    /// True when the cell at `(col, row)` holds no data.
    #[inline]
    pub fn is_void(&self, col: usize, row: usize) -> bool {
        self.get(col, row).is_nan()
    }

    /// Row-major view of all cells.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Mutable row-major view of all cells.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Minimum and maximum over non-void cells, or `None` when every cell
    /// is void.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for &v in &self.values {
            if v.is_nan() {
                continue;
            }
            range = Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        range
    }

    /// Whether this grid and `other` cover the same extent at the same
    /// resolution.
    pub fn same_extent_and_resolution(&self, other: &Self) -> bool {
        self.layout.same_extent_and_resolution(&other.layout)
    }

    /// Precondition check for binary operators: error unless both grids
    /// share dimensions, cell size, and origin.
    pub fn ensure_same_extent(&self, other: &Self) -> GridResult<()> {
        if self.same_extent_and_resolution(other) {
            Ok(())
        } else {
            Err(GridError::ExtentMismatch {
                left: self.layout,
                right: other.layout,
            })
        }
    }

    /// Consume the grid, returning its value buffer.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}
