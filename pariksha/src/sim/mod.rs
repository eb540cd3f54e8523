//! Boundary to the external simulator and the navigation controller under test.
//!
//! Both collaborators are opaque services observed only by polling. The
//! harness talks to them through two traits so the trial logic can run
//! against the TCP bridge in production and a scripted world in tests:
//!
//! - [`Simulation`]: pose/collision/clock queries, reset, goal heartbeat,
//!   velocity commands and reference path lookup
//! - [`NavigationController`]: readiness handshake and goal submission

pub mod client;
pub mod mock;
pub mod paths;
pub mod proto;
pub mod wire;

pub use client::{ControllerClient, SimulationClient};
pub use mock::{Keyframe, MockController, MockSimulation, MockWorld};
pub use paths::PathStore;

use std::time::Duration;

use crate::core::{Point2D, Pose2D};
use crate::error::Result;

/// Navigation goal handed to the controller under test.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalPose {
    /// Reference frame the position is expressed in (e.g. "odom")
    pub frame_id: String,
    pub position: Point2D,
    /// Orientation quaternion (x, y, z, w)
    pub orientation: [f64; 4],
}

impl GoalPose {
    /// Goal with identity orientation.
    pub fn new(frame_id: impl Into<String>, position: Point2D) -> Self {
        Self {
            frame_id: frame_id.into(),
            position,
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Query/command interface of the simulator.
///
/// Every call may fail with `BenchError::SimulationUnavailable`, which is
/// fatal to the trial.
pub trait Simulation {
    /// Current agent pose in world frame.
    fn pose(&mut self) -> Result<Pose2D>;

    /// Whether the agent is currently in hard collision.
    fn collision(&mut self) -> Result<bool>;

    /// Simulation clock in seconds.
    fn sim_time(&mut self) -> Result<f64>;

    /// Request a teleport to `pose`. Completion is only observable through
    /// subsequent [`Simulation::pose`] reads.
    fn reset_to(&mut self, pose: Pose2D) -> Result<()>;

    /// Re-assert the goal point for controllers that expect a repeated signal.
    fn publish_goal_point(&mut self, frame_id: &str, point: Point2D) -> Result<()>;

    /// Send a velocity command to the agent base.
    fn publish_velocity(&mut self, linear: f64, angular: f64) -> Result<()>;

    /// Path-grid waypoints of the reference route for a scenario.
    fn reference_path(&mut self, scenario: u32) -> Result<Vec<Point2D>>;
}

/// Goal-acceptance interface of the controller under test.
pub trait NavigationController {
    /// Block until the controller accepts goals or `timeout` elapses.
    /// Returns `Ok(false)` on timeout.
    fn wait_for_server(&mut self, timeout: Duration) -> Result<bool>;

    /// Fire-and-forget goal submission.
    fn send_goal(&mut self, goal: &GoalPose) -> Result<()>;
}
