//! Test utilities for Pariksha trial tests.
//!
//! Builds scripted worlds around the standard trial geometry: start at
//! (-2, 3), goal at (-2, 13).

#![allow(dead_code)]

use pariksha::BenchConfig;
use pariksha::Point2D;
use pariksha::sim::{Keyframe, MockWorld};

pub const START: Point2D = Point2D::new(-2.0, 3.0);
pub const GOAL: Point2D = Point2D::new(-2.0, 13.0);

/// Default protocol with no real-time sleeping and a short settle.
pub fn fast_config() -> BenchConfig {
    let mut config = BenchConfig::default();
    config.trial.poll_interval_ms = 0;
    config.trial.settle_interval = 0.1;
    config
}

/// Straight drive from the start towards the goal at `speed` m/s, stopping
/// at `stop_y`.
pub fn drive_to(stop_y: f64, speed: f64) -> Vec<Keyframe> {
    Keyframe::line(START, Point2D::new(START.x, stop_y), speed, 0.1, 0.5)
}

/// World spawned at the start pose with a direct (empty) reference path for
/// scenario 0.
pub fn world(config: &BenchConfig, trajectory: Vec<Keyframe>) -> MockWorld {
    MockWorld::new(config.trial.initial_pose)
        .with_reference_path(0, vec![])
        .with_trajectory(trajectory)
}
