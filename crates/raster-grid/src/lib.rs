//! Raster grid primitives for terrain generalization.
//!
//! A [`RasterGrid`] is a row-major 2D array of `f32` cells tied to a world
//! extent through its [`GridLayout`] (cell size plus west/north origin).
//! A cell value of `NaN` means "void": no data. Voids propagate through
//! arithmetic unless an operator explicitly renormalizes around them; they
//! are never an error condition.

mod error;
mod grid;

pub use error::{GridError, GridResult};
pub use grid::{GridLayout, RasterGrid};
