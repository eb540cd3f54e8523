//! 2D pose type for agent position and orientation.

use serde::{Deserialize, Serialize};

use super::point::Point2D;

/// Agent pose in the simulator world frame.
///
/// Position in meters, heading in radians (CCW positive from +X).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    #[inline]
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Position component as a point.
    #[inline]
    pub fn position(self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Euclidean distance between the positions of two poses (heading ignored).
    #[inline]
    pub fn distance_to(self, point: Point2D) -> f64 {
        self.position().distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_drops_heading() {
        let pose = Pose2D::new(-2.0, 3.0, 1.57);
        assert_eq!(pose.position(), Point2D::new(-2.0, 3.0));
        assert_eq!(pose.distance_to(Point2D::new(-2.0, 13.0)), 10.0);
    }
}
