//! Error types for the pyramid engine.

use raster_grid::GridError;
use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by pyramid construction, reconstruction, and the parallel
/// row substrate.
///
/// Every variant is a precondition or propagation failure; void cells are
/// the designed representation of missing data and never produce an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("operator reads a neighborhood and cannot run in place")]
    InPlaceUnsupported,

    #[error("destination is {dest_cols}x{dest_rows} but the operator produces {out_cols}x{out_rows}")]
    ShapeMismatch {
        dest_cols: usize,
        dest_rows: usize,
        out_cols: usize,
        out_rows: usize,
    },

    #[error("pyramid has no levels")]
    EmptyPyramid,

    #[error("{what} count {got} does not match the {expected} pyramid levels")]
    LevelCountMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}
