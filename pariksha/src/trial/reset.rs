//! Reset sequencer: bring the agent back to the initial pose before a trial.

use tracing::{debug, info, warn};

use crate::config::TrialConfig;
use crate::core::Pose2D;
use crate::error::{BenchError, Result};
use crate::sim::Simulation;
use crate::trial::Pacer;

/// Sequencer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetState {
    Resetting,
    Ready,
}

/// Result of a successful reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResetReport {
    /// Reset commands issued
    pub attempts: u32,
    /// Pose observed when the agent was accepted as settled
    pub pose: Pose2D,
}

/// Repeats reset → settle → observe until the agent is within tolerance of
/// the initial pose and collision-free in the same observation.
pub struct ResetSequencer<'a> {
    config: &'a TrialConfig,
    pacer: &'a Pacer,
    state: ResetState,
}

impl<'a> ResetSequencer<'a> {
    pub fn new(config: &'a TrialConfig, pacer: &'a Pacer) -> Self {
        Self {
            config,
            pacer,
            state: ResetState::Resetting,
        }
    }

    pub fn state(&self) -> ResetState {
        self.state
    }

    pub fn run<S: Simulation + ?Sized>(&mut self, sim: &mut S) -> Result<ResetReport> {
        self.state = ResetState::Resetting;
        let target = self.config.initial_pose;
        let max_attempts = self.config.max_reset_attempts;

        for attempt in 1..=max_attempts {
            sim.reset_to(target)?;
            self.pacer.wait(sim, self.config.settle_interval)?;

            let pose = sim.pose()?;
            let collided = sim.collision()?;
            let offset = pose.distance_to(target.position());

            if offset <= self.config.reset_tolerance && !collided {
                self.state = ResetState::Ready;
                info!(
                    "Agent settled at ({:.2}, {:.2}) after {} reset(s)",
                    pose.x, pose.y, attempt
                );
                return Ok(ResetReport {
                    attempts: attempt,
                    pose,
                });
            }

            debug!(
                "Reset attempt {}/{}: {:.3}m from start, collided={}",
                attempt, max_attempts, offset, collided
            );
        }

        warn!("Agent failed to settle after {} resets", max_attempts);
        Err(BenchError::ResetFailed {
            attempts: max_attempts,
        })
    }
}
