//! Multi-resolution pyramid engine for terrain generalization.
//!
//! Builds a Gaussian image pyramid from an elevation raster, derives a
//! Laplacian (band-pass) pyramid from it, reconstructs a generalized
//! raster from the bands with distance-, curvature-, and mask-adaptive
//! per-cell weighting, and merges two pyramids under a spatial mask. All
//! raster operators run on a shared per-row parallel substrate and handle
//! void (NaN) cells by renormalizing around them.
//!
//! The typical pipeline:
//!
//! ```ignore
//! use pyramid_engine::{GaussianPyramid, LaplacianPyramid, PyramidOptions, ReconstructOptions};
//!
//! let gaussian = GaussianPyramid::build(elevation, &PyramidOptions::default())?;
//! let laplacian = LaplacianPyramid::decompose(&gaussian)?;
//! let generalized = laplacian.reconstruct(&options)?;
//! ```

pub mod curvature;
pub mod distance;
mod error;
pub mod expand;
pub mod gaussian;
pub mod laplacian;
pub mod lod;
pub mod parallel;
pub mod reduce;

pub use curvature::{curvature_weight_pyramid, plan_curvature};
pub use distance::DistanceWeightInterpolator;
pub use error::{EngineError, Result};
pub use expand::expand;
pub use gaussian::{GaussianPyramid, PyramidOptions};
pub use laplacian::{
    CurvatureWeighting, CurvatureWeights, LaplacianPyramid, LevelWeights, ReconstructOptions,
};
pub use lod::{AboveThresholdMask, BelowThresholdMask, LevelOfDetailMask, RasterMask};
pub use parallel::{apply, apply_in_place, apply_into, apply_with_workers, RowOperator};
pub use reduce::ReductionFilter;
