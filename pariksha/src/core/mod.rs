//! Foundation types: points, poses and the path-grid transform.

mod point;
mod pose;
mod transform;

pub use point::{Point2D, distance};
pub use pose::Pose2D;
pub use transform::GridTransform;
