//! Deterministic scripted world for hardware-free testing.
//!
//! A [`MockWorld`] owns one shared state and hands out a [`MockSimulation`]
//! and a [`MockController`] view of it, the same way the real simulator and
//! controller observe the same physical agent.
//!
//! # Clock
//!
//! The simulation clock only advances when it is read: every
//! [`Simulation::sim_time`] call moves it forward by `time_step`. Runs are
//! therefore fully reproducible and independent of wall-clock speed.
//!
//! # Motion
//!
//! Before a goal is accepted the agent sits wherever the last reset put it.
//! Once the controller receives a goal, the scripted [`Keyframe`] trajectory
//! plays back relative to that moment: the state at any time is the last
//! keyframe whose `at` is not in the future.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::{Point2D, Pose2D};
use crate::error::{BenchError, Result};
use crate::sim::{GoalPose, NavigationController, Simulation};

/// Scripted agent state, `at` seconds after goal acceptance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub at: f64,
    pub pose: Pose2D,
    pub collided: bool,
}

impl Keyframe {
    pub fn new(at: f64, x: f64, y: f64) -> Self {
        Self {
            at,
            pose: Pose2D::new(x, y, 0.0),
            collided: false,
        }
    }

    /// Mark this keyframe as in collision.
    pub fn collided(mut self) -> Self {
        self.collided = true;
        self
    }

    /// Constant-speed straight drive from `from` to `to`, sampled every `dt`,
    /// starting `start_at` seconds after goal acceptance.
    pub fn line(from: Point2D, to: Point2D, speed: f64, dt: f64, start_at: f64) -> Vec<Keyframe> {
        let length = from.distance(to);
        let duration = if speed > 0.0 { length / speed } else { 0.0 };
        let steps = (duration / dt).ceil().max(1.0) as usize;

        (0..=steps)
            .map(|i| {
                let frac = (i as f64 / steps as f64).min(1.0);
                Keyframe::new(
                    start_at + frac * duration,
                    from.x + (to.x - from.x) * frac,
                    from.y + (to.y - from.y) * frac,
                )
            })
            .collect()
    }
}

#[derive(Debug)]
struct WorldState {
    clock: f64,
    time_step: f64,
    clock_frozen: bool,
    unavailable: bool,

    pose: Pose2D,
    collided: bool,
    reset_outcomes: VecDeque<(Pose2D, bool)>,
    trajectory: Vec<Keyframe>,
    goal_accepted_at: Option<f64>,
    paths: HashMap<u32, Vec<Point2D>>,

    controller_ready: bool,
    goals: Vec<GoalPose>,
    resets: usize,
    heartbeats: usize,
    velocity_commands: Vec<(f64, f64)>,
}

impl WorldState {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            Err(BenchError::SimulationUnavailable(
                "mock simulator offline".into(),
            ))
        } else {
            Ok(())
        }
    }

    /// State of the agent at the current clock.
    fn current(&self) -> (Pose2D, bool) {
        let Some(t0) = self.goal_accepted_at else {
            return (self.pose, self.collided);
        };
        let elapsed = self.clock - t0;
        self.trajectory
            .iter()
            .rev()
            .find(|k| k.at <= elapsed + 1e-9)
            .map(|k| (k.pose, k.collided))
            .unwrap_or((self.pose, self.collided))
    }
}

/// Shared scripted world. Cloning yields another handle to the same world.
#[derive(Clone, Debug)]
pub struct MockWorld {
    state: Arc<Mutex<WorldState>>,
}

impl MockWorld {
    /// World with the agent spawned at `spawn`, 10ms clock step, controller
    /// ready and no scripted motion.
    pub fn new(spawn: Pose2D) -> Self {
        Self {
            state: Arc::new(Mutex::new(WorldState {
                clock: 0.0,
                time_step: 0.01,
                clock_frozen: false,
                unavailable: false,
                pose: spawn,
                collided: false,
                reset_outcomes: VecDeque::new(),
                trajectory: Vec::new(),
                goal_accepted_at: None,
                paths: HashMap::new(),
                controller_ready: true,
                goals: Vec::new(),
                resets: 0,
                heartbeats: 0,
                velocity_commands: Vec::new(),
            })),
        }
    }

    /// Clock advance per clock read (sim seconds).
    pub fn with_time_step(self, step: f64) -> Self {
        self.state.lock().time_step = step;
        self
    }

    /// States reported after successive resets. Once exhausted, a reset lands
    /// exactly on the requested pose without collision.
    pub fn with_reset_outcomes(self, outcomes: impl IntoIterator<Item = (Pose2D, bool)>) -> Self {
        self.state.lock().reset_outcomes.extend(outcomes);
        self
    }

    /// Motion played back after the goal is accepted.
    pub fn with_trajectory(self, trajectory: Vec<Keyframe>) -> Self {
        self.state.lock().trajectory = trajectory;
        self
    }

    pub fn with_reference_path(self, scenario: u32, path: Vec<Point2D>) -> Self {
        self.state.lock().paths.insert(scenario, path);
        self
    }

    pub fn with_controller_ready(self, ready: bool) -> Self {
        self.state.lock().controller_ready = ready;
        self
    }

    /// Make every simulator call fail from now on.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    /// Stop the simulation clock (paused simulator).
    pub fn freeze_clock(&self, frozen: bool) {
        self.state.lock().clock_frozen = frozen;
    }

    pub fn simulation(&self) -> MockSimulation {
        MockSimulation {
            state: Arc::clone(&self.state),
        }
    }

    pub fn controller(&self) -> MockController {
        MockController {
            state: Arc::clone(&self.state),
        }
    }

    pub fn clock(&self) -> f64 {
        self.state.lock().clock
    }

    pub fn resets(&self) -> usize {
        self.state.lock().resets
    }

    pub fn goals(&self) -> Vec<GoalPose> {
        self.state.lock().goals.clone()
    }

    pub fn heartbeats(&self) -> usize {
        self.state.lock().heartbeats
    }

    pub fn velocity_commands(&self) -> Vec<(f64, f64)> {
        self.state.lock().velocity_commands.clone()
    }
}

/// Simulator view of a [`MockWorld`].
#[derive(Debug)]
pub struct MockSimulation {
    state: Arc<Mutex<WorldState>>,
}

impl Simulation for MockSimulation {
    fn pose(&mut self) -> Result<Pose2D> {
        let state = self.state.lock();
        state.check_available()?;
        Ok(state.current().0)
    }

    fn collision(&mut self) -> Result<bool> {
        let state = self.state.lock();
        state.check_available()?;
        Ok(state.current().1)
    }

    fn sim_time(&mut self) -> Result<f64> {
        let mut state = self.state.lock();
        state.check_available()?;
        if !state.clock_frozen {
            let step = state.time_step;
            state.clock += step;
        }
        Ok(state.clock)
    }

    fn reset_to(&mut self, pose: Pose2D) -> Result<()> {
        let mut state = self.state.lock();
        state.check_available()?;
        state.resets += 1;
        let (landed, collided) = state.reset_outcomes.pop_front().unwrap_or((pose, false));
        state.pose = landed;
        state.collided = collided;
        state.goal_accepted_at = None;
        Ok(())
    }

    fn publish_goal_point(&mut self, _frame_id: &str, _point: Point2D) -> Result<()> {
        let mut state = self.state.lock();
        state.check_available()?;
        state.heartbeats += 1;
        Ok(())
    }

    fn publish_velocity(&mut self, linear: f64, angular: f64) -> Result<()> {
        let mut state = self.state.lock();
        state.check_available()?;
        state.velocity_commands.push((linear, angular));
        Ok(())
    }

    fn reference_path(&mut self, scenario: u32) -> Result<Vec<Point2D>> {
        let state = self.state.lock();
        state.check_available()?;
        state
            .paths
            .get(&scenario)
            .cloned()
            .ok_or_else(|| BenchError::ReferencePath {
                scenario,
                reason: "no reference path scripted".into(),
            })
    }
}

/// Controller view of a [`MockWorld`].
#[derive(Debug)]
pub struct MockController {
    state: Arc<Mutex<WorldState>>,
}

impl NavigationController for MockController {
    fn wait_for_server(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(self.state.lock().controller_ready)
    }

    fn send_goal(&mut self, goal: &GoalPose) -> Result<()> {
        let mut state = self.state.lock();
        if !state.controller_ready {
            return Err(BenchError::ControllerUnavailable(
                "mock controller not ready".into(),
            ));
        }
        state.goals.push(goal.clone());
        let now = state.clock;
        state.goal_accepted_at = Some(now);
        Ok(())
    }
}
