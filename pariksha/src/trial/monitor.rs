//! Trial monitoring.
//!
//! Two phases after the goal is dispatched:
//!
//! - **Phase A (motion start):** poll the pose until the agent has moved at
//!   least `motion_threshold` from the start. The trial clock starts here, so
//!   controller startup latency is not charged to the agent.
//! - **Phase B (tracking):** once per tick, read clock and pose, re-publish
//!   the goal heartbeat and read the collision flag. The trial ends on the
//!   first tick where the agent is within `goal_tolerance` of the goal, has
//!   collided, or has used up `time_limit`.

use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info};

use crate::config::TrialConfig;
use crate::core::Pose2D;
use crate::error::{AbortPhase, BenchError, Result};
use crate::scoring::Outcome;
use crate::sim::{GoalPose, Simulation};
use crate::trial::{Pacer, StallGuard};

/// Live state of a running trial.
#[derive(Clone, Debug)]
pub struct TrialState {
    /// Sim clock reading when motion was detected
    pub start_time: f64,
    /// Wall-clock time when motion was detected (reporting only)
    pub start_wall_clock: SystemTime,
    pub current_time: f64,
    pub current_pose: Pose2D,
    pub collided: bool,
    started: Instant,
}

impl TrialState {
    fn new(start_time: f64, pose: Pose2D) -> Self {
        Self {
            start_time,
            start_wall_clock: SystemTime::now(),
            current_time: start_time,
            current_pose: pose,
            collided: false,
            started: Instant::now(),
        }
    }

    /// Sim seconds since motion start.
    pub fn elapsed(&self) -> f64 {
        self.current_time - self.start_time
    }
}

/// How the monitored part of a trial ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorResult {
    pub outcome: Outcome,
    /// Sim seconds from motion start to termination
    pub elapsed: f64,
    pub final_pose: Pose2D,
    /// Tracking ticks observed
    pub ticks: u32,
}

pub struct Monitor<'a> {
    config: &'a TrialConfig,
    pacer: &'a Pacer,
}

impl<'a> Monitor<'a> {
    pub fn new(config: &'a TrialConfig, pacer: &'a Pacer) -> Self {
        Self { config, pacer }
    }

    /// Phase A followed by Phase B.
    pub fn run<S: Simulation + ?Sized>(
        &self,
        sim: &mut S,
        goal: &GoalPose,
    ) -> Result<MonitorResult> {
        let state = self.wait_for_motion(sim)?;
        self.track(sim, goal, state)
    }

    /// Poll until the agent leaves the start pose.
    pub fn wait_for_motion<S: Simulation + ?Sized>(&self, sim: &mut S) -> Result<TrialState> {
        let start = self.config.initial_position();
        let origin = sim.sim_time()?;
        let mut guard = StallGuard::new(origin, self.pacer.stall_timeout());
        let mut now = origin;

        loop {
            let pose = sim.pose()?;
            if pose.distance_to(start) >= self.config.motion_threshold {
                info!(
                    "Agent started moving at t={:.2}s ({:.2}s after goal)",
                    now,
                    now - origin
                );
                return Ok(TrialState::new(now, pose));
            }

            if let Some(limit) = self.config.motion_start_timeout
                && now - origin >= limit
            {
                return Err(BenchError::TrialAborted {
                    phase: AbortPhase::MotionStart,
                    waited: Duration::from_secs_f64(now - origin),
                });
            }

            self.pacer.nap();
            now = sim.sim_time()?;
            guard.observe(now)?;
        }
    }

    /// Tick until goal, collision or time limit.
    pub fn track<S: Simulation + ?Sized>(
        &self,
        sim: &mut S,
        goal: &GoalPose,
        mut state: TrialState,
    ) -> Result<MonitorResult> {
        let goal_world = self.config.goal_position();
        let mut ticks = 0u32;

        loop {
            state.current_time = sim.sim_time()?;
            state.current_pose = sim.pose()?;
            sim.publish_goal_point(&goal.frame_id, goal.position)?;
            state.collided = sim.collision()?;
            ticks += 1;

            let elapsed = state.elapsed();
            let to_goal = state.current_pose.distance_to(goal_world);
            debug!(
                "Time: {:.2} (s), x: {:.2} (m), y: {:.2} (m), to goal: {:.2} (m)",
                elapsed, state.current_pose.x, state.current_pose.y, to_goal
            );

            if to_goal <= self.config.goal_tolerance
                || state.collided
                || elapsed >= self.config.time_limit
            {
                break;
            }

            self.pacer
                .wait_until(sim, state.current_time, self.config.tick)?;
        }

        let elapsed = state.elapsed();
        let outcome = Outcome::classify(state.collided, elapsed, self.config.time_limit);

        let wall = state.started.elapsed().as_secs_f64();
        if wall > 0.0 {
            debug!("Real-time factor: {:.2}x", elapsed / wall);
        }
        info!(
            "Trial ended: {} after {:.2}s sim ({} ticks)",
            outcome, elapsed, ticks
        );

        Ok(MonitorResult {
            outcome,
            elapsed,
            final_pose: state.current_pose,
            ticks,
        })
    }
}
