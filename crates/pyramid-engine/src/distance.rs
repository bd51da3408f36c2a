//! Front/back distance weighting across a grid.
//!
//! Simulates distance-dependent generalization strength: cells toward the
//! "back" of a viewing direction receive one weight, cells toward the
//! "front" another, with a smooth linear blend between the two corners of
//! the grid along that axis.

/// Computes a smooth [0, 1] spatial blend factor across a grid for a given
/// viewing direction.
///
/// The angle (degrees) defines the front/back axis. A cell is translated to
/// grid-centered coordinates, rotated by the negative angle, and projected
/// onto the axis; the projection is normalized against that of whichever
/// grid corner lies furthest along the negative axis direction. The exact
/// grid center always maps to 0.5.
#[derive(Debug, Clone)]
pub struct DistanceWeightInterpolator {
    angle_deg: f64,
    sin: f64,
    cos: f64,
}

impl DistanceWeightInterpolator {
    pub fn new(angle_degrees: f64) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Self {
            angle_deg: angle_degrees,
            sin,
            cos,
        }
    }

    /// The configured front/back direction in degrees.
    pub fn angle(&self) -> f64 {
        self.angle_deg
    }

    /// Replace the direction, re-caching the rotation.
    pub fn set_angle(&mut self, angle_degrees: f64) {
        *self = Self::new(angle_degrees);
    }

    /// Blend factor in [0, 1] for cell `(col, row)` of a `cols` × `rows`
    /// grid: 0 at the far "back" corner, 1 at the far "front" corner, 0.5
    /// at the center.
    pub fn weight(&self, col: usize, row: usize, cols: usize, rows: usize) -> f32 {
        let half_x = (cols.saturating_sub(1)) as f64 / 2.0;
        let half_y = (rows.saturating_sub(1)) as f64 / 2.0;
        // Grid-centered, north-up coordinates; rotating the cell by the
        // negative angle projects it onto the front/back axis.
        let x = col as f64 - half_x;
        let y = half_y - row as f64;
        let projection = x * self.cos + y * self.sin;
        // Projection of the corner furthest along the negative axis; the
        // abs terms select the corner by the angle's quadrant.
        let corner = (half_x * self.cos).abs() + (half_y * self.sin).abs();
        if corner <= f64::EPSILON {
            return 0.5;
        }
        (((corner + projection) / (2.0 * corner)) as f32).clamp(0.0, 1.0)
    }

    /// Blend a foreground and background weight for one cell:
    /// `fore·w + back·(1−w)`.
    pub fn interpolate(
        &self,
        foreground: f32,
        background: f32,
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    ) -> f32 {
        let w = self.weight(col, row, cols, rows);
        foreground * w + background * (1.0 - w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_center_is_half_for_any_angle() {
        for angle in [0.0, 17.0, 45.0, 90.0, 135.5, 180.0, 270.0, 359.0, -30.0] {
            let interp = DistanceWeightInterpolator::new(angle);
            // 11x7 grid: exact center cell is (5, 3).
            let w = interp.weight(5, 3, 11, 7);
            assert!((w - 0.5).abs() < EPS, "angle {angle}: {w}");
        }
    }

    #[test]
    fn test_zero_angle_ramps_west_to_east() {
        let interp = DistanceWeightInterpolator::new(0.0);
        assert!((interp.weight(0, 2, 9, 5) - 0.0).abs() < EPS);
        assert!((interp.weight(8, 2, 9, 5) - 1.0).abs() < EPS);
        assert!(interp.weight(2, 0, 9, 5) < interp.weight(6, 0, 9, 5));
        // Rows do not matter at angle 0.
        assert!((interp.weight(3, 0, 9, 5) - interp.weight(3, 4, 9, 5)).abs() < EPS);
    }

    #[test]
    fn test_ninety_degrees_ramps_south_to_north() {
        let interp = DistanceWeightInterpolator::new(90.0);
        // Row 0 is north, which lies along the positive axis.
        assert!((interp.weight(4, 0, 9, 5) - 1.0).abs() < EPS);
        assert!((interp.weight(4, 4, 9, 5) - 0.0).abs() < EPS);
    }

    #[test]
    fn test_opposite_angles_mirror() {
        let fore = DistanceWeightInterpolator::new(30.0);
        let back = DistanceWeightInterpolator::new(210.0);
        for (col, row) in [(0, 0), (8, 0), (3, 4), (7, 2)] {
            let a = fore.weight(col, row, 9, 5);
            let b = back.weight(col, row, 9, 5);
            assert!((a + b - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerate_grid_is_half() {
        let interp = DistanceWeightInterpolator::new(45.0);
        assert!((interp.weight(0, 0, 1, 1) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_interpolate_blends_foreground_background() {
        let interp = DistanceWeightInterpolator::new(0.0);
        // At the west edge w = 0, so the background weight wins.
        assert!((interp.interpolate(3.0, 7.0, 0, 0, 9, 1) - 7.0).abs() < EPS);
        assert!((interp.interpolate(3.0, 7.0, 8, 0, 9, 1) - 3.0).abs() < EPS);
        assert!((interp.interpolate(3.0, 7.0, 4, 0, 9, 1) - 5.0).abs() < EPS);
    }
}
