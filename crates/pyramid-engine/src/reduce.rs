//! Void-aware separable 5-tap reduction filter.
//!
//! The 2D low-pass is separable: a horizontal 5-tap pass into a call-local
//! intermediate grid, then the same 5-tap pass applied vertically. Each
//! pass is one [`apply`] call; the join between them is the stage barrier.
//!
//! Void handling: a void tap is dropped and the remaining tap weights are
//! rescaled so their sum equals the full-kernel unity gain. A cell whose
//! entire stencil is void stays void — no sentinel value is ever produced.
//! Border cells replicate the nearest edge value for the missing outer
//! taps (index clamping, which folds the replicated tap weight onto the
//! edge cell).

use crate::parallel::{apply, RowOperator};
use crate::Result;
use raster_grid::{GridLayout, RasterGrid};

/// Center tap weight.
pub(crate) const KERNEL_A: f32 = 0.40;
/// Weight at offset ±1.
pub(crate) const KERNEL_B: f32 = 0.25;
/// Weight at offset ±2.
pub(crate) const KERNEL_C: f32 = 0.05;

const TAPS: [f32; 5] = [KERNEL_C, KERNEL_B, KERNEL_A, KERNEL_B, KERNEL_C];

/// Fixed 5×5 weighted-average low-pass filter with 2:1 decimation support.
///
/// Kernel weights along one axis sum to exactly unity gain
/// (0.05 + 0.25 + 0.40 + 0.25 + 0.05), so uniform input is preserved by
/// both [`reduce`](Self::reduce) and [`reduce_half`](Self::reduce_half).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReductionFilter;

impl ReductionFilter {
    /// Low-pass the grid without changing its size.
    pub fn reduce(&self, grid: &RasterGrid) -> Result<RasterGrid> {
        let horizontal = apply(&HorizontalReduce { decimate: false }, grid)?;
        apply(&VerticalReduce { decimate: false }, &horizontal)
    }

    /// Low-pass and decimate 2:1: the filtered value is kept only at even
    /// row/col indices, halving each side to ⌈n/2⌉, doubling the cell size
    /// and keeping the origin fixed.
    pub fn reduce_half(&self, grid: &RasterGrid) -> Result<RasterGrid> {
        let horizontal = apply(&HorizontalReduce { decimate: true }, grid)?;
        apply(&VerticalReduce { decimate: true }, &horizontal)
    }
}

/// Accumulate 5 taps centered on `center`, dropping voids and
/// renormalizing. `value_at` must clamp out-of-range indices itself.
#[inline]
fn filter_taps(center: isize, limit: isize, value_at: impl Fn(usize) -> f32) -> f32 {
    let mut sum = 0.0f32;
    let mut weight = 0.0f32;
    for (k, &w) in TAPS.iter().enumerate() {
        let idx = (center + k as isize - 2).clamp(0, limit - 1) as usize;
        let v = value_at(idx);
        if !v.is_nan() {
            sum += w * v;
            weight += w;
        }
    }
    if weight > 0.0 {
        sum / weight
    } else {
        f32::NAN
    }
}

struct HorizontalReduce {
    decimate: bool,
}

impl RowOperator for HorizontalReduce {
    fn output_layout(&self, source: &RasterGrid) -> GridLayout {
        let layout = source.layout();
        if self.decimate {
            // Intermediate grid: columns already halved, rows and cell
            // size untouched until the vertical pass.
            layout.with_size(layout.cols.div_ceil(2), layout.rows)
        } else {
            layout
        }
    }

    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        let src_cols = source.cols() as isize;
        let out_cols = self.output_layout(source).cols;
        for (row, dest_row) in (start_row..end_row).zip(dest_rows.chunks_mut(out_cols)) {
            for (col, dst) in dest_row.iter_mut().enumerate() {
                let center = if self.decimate { 2 * col } else { col } as isize;
                *dst = filter_taps(center, src_cols, |c| source.get(c, row));
            }
        }
        Ok(())
    }
}

struct VerticalReduce {
    decimate: bool,
}

impl RowOperator for VerticalReduce {
    fn output_layout(&self, source: &RasterGrid) -> GridLayout {
        let layout = source.layout();
        if self.decimate {
            GridLayout {
                rows: layout.rows.div_ceil(2),
                cell_size: layout.cell_size * 2.0,
                ..layout
            }
        } else {
            layout
        }
    }

    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        let src_rows = source.rows() as isize;
        let cols = source.cols();
        for (row, dest_row) in (start_row..end_row).zip(dest_rows.chunks_mut(cols)) {
            let center = if self.decimate { 2 * row } else { row } as isize;
            for (col, dst) in dest_row.iter_mut().enumerate() {
                *dst = filter_taps(center, src_rows, |r| source.get(col, r));
            }
        }
        Ok(())
    }
}
