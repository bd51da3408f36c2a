//! Test data generators for creating synthetic terrain-like rasters.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raster_grid::{GridLayout, RasterGrid};

/// A unit layout at the given dimensions: cell size 1, origin (0, 0).
pub fn unit_layout(cols: usize, rows: usize) -> GridLayout {
    GridLayout::new(cols, rows, 1.0, 0.0, 0.0).expect("valid test layout")
}

/// Creates a grid with every cell set to `value`.
pub fn constant_grid(cols: usize, rows: usize, value: f32) -> RasterGrid {
    RasterGrid::filled(unit_layout(cols, rows), value).expect("valid test grid")
}

/// Creates a grid with predictable values.
///
/// Each cell value is calculated as `col * 1000 + row`, so reads and
/// writes can be verified by position alone.
///
/// # Example
///
/// ```
/// use test_utils::indexed_grid;
///
/// let grid = indexed_grid(10, 5);
/// assert_eq!(grid.get(0, 0), 0.0);
/// assert_eq!(grid.get(1, 0), 1000.0);
/// assert_eq!(grid.get(0, 1), 1.0);
/// ```
pub fn indexed_grid(cols: usize, rows: usize) -> RasterGrid {
    let mut values = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            values.push((col * 1000 + row) as f32);
        }
    }
    RasterGrid::new(unit_layout(cols, rows), values).expect("valid test grid")
}

/// Creates a smooth terrain-like surface: a central peak falling off
/// radially, elevation roughly 0..=500.
pub fn hill_grid(cols: usize, rows: usize) -> RasterGrid {
    let mut values = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let dx = col as f32 - cols as f32 / 2.0;
            let dy = row as f32 - rows as f32 / 2.0;
            values.push(500.0 - (dx * dx + dy * dy).sqrt() * 3.0);
        }
    }
    RasterGrid::new(unit_layout(cols, rows), values).expect("valid test grid")
}

/// Creates a rough surface from a seeded RNG, elevation in 0..1000.
///
/// The same seed always produces the same grid, so parallel-determinism
/// tests can compare runs bit for bit.
pub fn random_grid(cols: usize, rows: usize, seed: u64) -> RasterGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..cols * rows).map(|_| rng.gen_range(0.0..1000.0)).collect();
    RasterGrid::new(unit_layout(cols, rows), values).expect("valid test grid")
}

/// Marks the given `(col, row)` positions of a grid as void.
///
/// Useful for testing missing data handling.
pub fn with_voids(mut grid: RasterGrid, positions: &[(usize, usize)]) -> RasterGrid {
    for &(col, row) in positions {
        if col < grid.cols() && row < grid.rows() {
            grid.set(col, row, f32::NAN);
        }
    }
    grid
}
