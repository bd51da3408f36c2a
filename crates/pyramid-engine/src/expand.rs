//! Polyphase 2:1 upsampling, the inverse stage of the reduction filter.
//!
//! Expansion mirrors the separable structure of the reduction: a horizontal
//! pass into a call-local intermediate, then a vertical pass. Each axis
//! produces two interleaved phases derived from the reduction kernel:
//!
//! - even output positions: `2·(c·v₋₁ + a·v₀ + c·v₊₁)`
//! - odd output positions:  `2·b·(v₀ + v₊₁)`
//!
//! Both phase weight sets sum to exactly 1, so expansion is unity-gain.
//! Output dimensions are `min(max, 2·n)` per axis so the result
//! phase-aligns with pyramid levels whose dimensions do not halve evenly,
//! and the cell size is halved. Border and void handling are the same as
//! the reduction filter: edge replication via index clamping, and per-phase
//! renormalization over the valid taps (all-void taps yield a void cell).

use crate::parallel::{apply, RowOperator};
use crate::reduce::{KERNEL_A, KERNEL_B, KERNEL_C};
use crate::Result;
use raster_grid::{GridLayout, RasterGrid};

/// Upsample `grid` 2:1 to at most `max_cols` × `max_rows`.
pub fn expand(grid: &RasterGrid, max_cols: usize, max_rows: usize) -> Result<RasterGrid> {
    let horizontal = apply(&HorizontalExpand { max_cols }, grid)?;
    apply(&VerticalExpand { max_rows }, &horizontal)
}

/// One interpolated value along an axis of length `limit`, for output
/// position `pos`. `value_at` must clamp out-of-range indices itself.
#[inline]
fn expand_taps(pos: usize, limit: isize, value_at: impl Fn(usize) -> f32) -> f32 {
    let center = (pos / 2) as isize;
    let mut sum = 0.0f32;
    let mut weight = 0.0f32;
    let mut tap = |idx: isize, w: f32| {
        let v = value_at(idx.clamp(0, limit - 1) as usize);
        if !v.is_nan() {
            sum += w * v;
            weight += w;
        }
    };
    if pos % 2 == 0 {
        tap(center - 1, 2.0 * KERNEL_C);
        tap(center, 2.0 * KERNEL_A);
        tap(center + 1, 2.0 * KERNEL_C);
    } else {
        tap(center, 2.0 * KERNEL_B);
        tap(center + 1, 2.0 * KERNEL_B);
    }
    if weight > 0.0 {
        sum / weight
    } else {
        f32::NAN
    }
}

struct HorizontalExpand {
    max_cols: usize,
}

impl RowOperator for HorizontalExpand {
    fn output_layout(&self, source: &RasterGrid) -> GridLayout {
        let layout = source.layout();
        // Columns grow now; rows and cell size change in the vertical pass.
        layout.with_size((layout.cols * 2).min(self.max_cols), layout.rows)
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
                *dst = expand_taps(col, src_cols, |c| source.get(c, row));
            }
        }
        Ok(())
    }
}

struct VerticalExpand {
    max_rows: usize,
}

impl RowOperator for VerticalExpand {
    fn output_layout(&self, source: &RasterGrid) -> GridLayout {
        let layout = source.layout();
        GridLayout {
            rows: (layout.rows * 2).min(self.max_rows),
            cell_size: layout.cell_size / 2.0,
            ..layout
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
            for (col, dst) in dest_row.iter_mut().enumerate() {
                *dst = expand_taps(row, src_rows, |r| source.get(col, r));
            }
        }
        Ok(())
    }
}
