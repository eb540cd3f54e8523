//! Path-grid to world coordinate transform.
//!
//! Reference paths are stored as cell indices of the discretized world the
//! scenario was generated from. Each cell is `2 * cell_radius` meters wide
//! and the grid origin is shifted per axis relative to the world origin.
//! The constants must match the ones used when the path files were produced,
//! otherwise path lengths (and therefore scores) are wrong.

use serde::{Deserialize, Serialize};

use super::point::Point2D;

/// Affine map from path-grid coordinates to world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    /// Half the width of one grid cell (meters)
    #[serde(default = "default_cell_radius")]
    pub cell_radius: f64,

    /// World X of grid column 0 (meters)
    #[serde(default = "default_x_shift")]
    pub x_shift: f64,

    /// World Y of grid row 0 (meters)
    #[serde(default = "default_y_shift")]
    pub y_shift: f64,
}

fn default_cell_radius() -> f64 {
    0.075
}
// 30 cells of padding on the X axis plus half a cell
fn default_x_shift() -> f64 {
    -default_cell_radius() - 30.0 * default_cell_radius() * 2.0
}
fn default_y_shift() -> f64 {
    default_cell_radius() + 5.0
}

impl Default for GridTransform {
    fn default() -> Self {
        Self {
            cell_radius: default_cell_radius(),
            x_shift: default_x_shift(),
            y_shift: default_y_shift(),
        }
    }
}

impl GridTransform {
    /// Convert grid coordinates to world coordinates.
    #[inline]
    pub fn to_world(&self, x: f64, y: f64) -> Point2D {
        let cell = self.cell_radius * 2.0;
        Point2D::new(x * cell + self.x_shift, y * cell + self.y_shift)
    }

    /// Convert a whole grid-space path to world coordinates.
    pub fn path_to_world(&self, path: &[Point2D]) -> Vec<Point2D> {
        path.iter().map(|p| self.to_world(p.x, p.y)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_constants() {
        let t = GridTransform::default();
        assert_relative_eq!(t.x_shift, -4.575, epsilon = 1e-12);
        assert_relative_eq!(t.y_shift, 5.075, epsilon = 1e-12);
    }

    #[test]
    fn test_origin_cell() {
        let p = GridTransform::default().to_world(0.0, 0.0);
        assert_relative_eq!(p.x, -4.575, epsilon = 1e-12);
        assert_relative_eq!(p.y, 5.075, epsilon = 1e-12);
    }

    #[test]
    fn test_one_cell_step_is_cell_width() {
        let t = GridTransform::default();
        let a = t.to_world(10.0, 20.0);
        let b = t.to_world(11.0, 20.0);
        assert_relative_eq!(a.distance(b), 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_path_to_world_preserves_order() {
        let t = GridTransform::default();
        let world = t.path_to_world(&[Point2D::new(0.0, 0.0), Point2D::new(1.0, 2.0)]);
        assert_eq!(world.len(), 2);
        assert_relative_eq!(world[1].x, -4.425, epsilon = 1e-12);
        assert_relative_eq!(world[1].y, 5.375, epsilon = 1e-12);
    }
}
