//! Error types for raster grid construction and combination.

use crate::GridLayout;
use thiserror::Error;

/// Result type alias using [`GridError`].
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised when a grid is constructed from malformed arguments or two
/// grids with different extents are combined.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid grid dimensions {cols}x{rows}: both sides must be at least 1")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("invalid cell size {0}: must be positive and finite")]
    InvalidCellSize(f64),

    #[error("value buffer holds {got} cells but {cols}x{rows} requires {expected}")]
    ValueLengthMismatch {
        cols: usize,
        rows: usize,
        expected: usize,
        got: usize,
    },

    #[error("grid extents differ: {left:?} vs {right:?}")]
    ExtentMismatch { left: GridLayout, right: GridLayout },
}
