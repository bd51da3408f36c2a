//! Parallel per-row execution substrate.
//!
//! Every raster operator in the engine runs through [`apply`]: the
//! destination row range `[0, rows)` is split into contiguous chunks, one
//! per worker, each chunk is computed independently on the rayon pool, and
//! the call blocks until the whole region joins. Callers never observe
//! partial results. Partitioning is static — there is no work stealing
//! across row chunks — so the output is a pure per-row function of the
//! source and is bit-identical for any worker count.
//!
//! Worker errors are not swallowed: [`RowOperator::operate`] returns
//! `Result` and the first error is propagated to the caller once the
//! parallel region has joined.

use crate::{EngineError, Result};
use rayon::prelude::*;
use raster_grid::{GridLayout, RasterGrid};
use tracing::trace;

/// A per-row grid transformation.
///
/// Implementations compute destination rows from a read-only source grid.
/// Workers share the source and write disjoint row ranges of the
/// destination, so no locking is needed within a single [`apply`] call.
/// Multi-stage algorithms (separable filters) issue one `apply` per stage;
/// the join between calls is the barrier.
pub trait RowOperator: Sync {
    /// Layout of the grid this operator produces for `source`.
    ///
    /// Defaults to the source layout. Decimating and expanding operators
    /// override this to shrink or grow the destination.
    fn output_layout(&self, source: &RasterGrid) -> GridLayout {
        source.layout()
    }

    /// Whether this operator may overwrite the grid it reads.
    ///
    /// Only point-wise operators (each destination cell depends on the same
    /// cell of the source, never a neighborhood) may return `true`;
    /// [`apply_in_place`] refuses everything else before scheduling any
    /// work.
    fn in_place_safe(&self) -> bool {
        false
    }

    /// Compute destination rows `[start_row, end_row)`.
    ///
    /// `dest_rows` is the row-major slice backing exactly that row range of
    /// the destination grid.
    fn operate(
        &self,
        source: &RasterGrid,
        dest_rows: &mut [f32],
        start_row: usize,
        end_row: usize,
    ) -> Result<()>;

    /// Transform rows `[start_row, end_row)` of a grid in place.
    ///
    /// `rows` holds the current values of that row range and receives the
    /// result. Point-wise operators override this together with
    /// [`in_place_safe`](Self::in_place_safe).
    fn operate_in_place(&self, rows: &mut [f32], start_row: usize, end_row: usize) -> Result<()> {
        let _ = (rows, start_row, end_row);
        Err(EngineError::InPlaceUnsupported)
    }
}

/// Run `op` over `source` into a freshly allocated destination, using one
/// chunk per thread of the rayon pool.
pub fn apply<O: RowOperator + ?Sized>(op: &O, source: &RasterGrid) -> Result<RasterGrid> {
    apply_with_workers(op, source, rayon::current_num_threads())
}

/// [`apply`] with an explicit worker count, which fixes the number of row
/// chunks. Exists so the chunk-count-invariance of an operator can be
/// exercised directly.
pub fn apply_with_workers<O: RowOperator + ?Sized>(
    op: &O,
    source: &RasterGrid,
    workers: usize,
) -> Result<RasterGrid> {
    let layout = op.output_layout(source);
    let mut dest = RasterGrid::void(layout)?;
    run(op, source, &mut dest, workers.max(1))?;
    Ok(dest)
}

/// Run `op` into a caller-supplied destination grid.
///
/// The destination must match the operator's output dimensions; a mismatch
/// is a precondition failure reported before any work is scheduled.
pub fn apply_into<O: RowOperator + ?Sized>(
    op: &O,
    source: &RasterGrid,
    dest: &mut RasterGrid,
) -> Result<()> {
    let layout = op.output_layout(source);
    if dest.cols() != layout.cols || dest.rows() != layout.rows {
        return Err(EngineError::ShapeMismatch {
            dest_cols: dest.cols(),
            dest_rows: dest.rows(),
            out_cols: layout.cols,
            out_rows: layout.rows,
        });
    }
    run(op, source, dest, rayon::current_num_threads())
}

/// Overwrite `grid` with the result of a point-wise operator.
///
/// Refused with [`EngineError::InPlaceUnsupported`] unless the operator
/// declares aliasing safe, since a neighborhood operator reading rows
/// another worker is rewriting would produce garbage.
pub fn apply_in_place<O: RowOperator + ?Sized>(op: &O, grid: &mut RasterGrid) -> Result<()> {
    if !op.in_place_safe() {
        return Err(EngineError::InPlaceUnsupported);
    }
    let layout = op.output_layout(grid);
    if grid.cols() != layout.cols || grid.rows() != layout.rows {
        return Err(EngineError::ShapeMismatch {
            dest_cols: grid.cols(),
            dest_rows: grid.rows(),
            out_cols: layout.cols,
            out_rows: layout.rows,
        });
    }
    let cols = grid.cols();
    let rows = grid.rows();
    let rows_per_chunk = chunk_rows(rows, rayon::current_num_threads());
    grid.values_mut()
        .par_chunks_mut(rows_per_chunk * cols)
        .enumerate()
        .try_for_each(|(chunk, row_slice)| {
            let start_row = chunk * rows_per_chunk;
            let end_row = start_row + row_slice.len() / cols;
            op.operate_in_place(row_slice, start_row, end_row)
        })
}

fn run<O: RowOperator + ?Sized>(
    op: &O,
    source: &RasterGrid,
    dest: &mut RasterGrid,
    workers: usize,
) -> Result<()> {
    let cols = dest.cols();
    let rows = dest.rows();
    let rows_per_chunk = chunk_rows(rows, workers);
    trace!(rows, cols, workers, rows_per_chunk, "dispatching row chunks");
    dest.values_mut()
        .par_chunks_mut(rows_per_chunk * cols)
        .enumerate()
        .try_for_each(|(chunk, dest_rows)| {
            let start_row = chunk * rows_per_chunk;
            let end_row = start_row + dest_rows.len() / cols;
            op.operate(source, dest_rows, start_row, end_row)
        })
}

fn chunk_rows(rows: usize, workers: usize) -> usize {
    rows.div_ceil(workers.max(1)).max(1)
}
