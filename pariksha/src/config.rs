//! Configuration loading for Pariksha
//!
//! Every field has a default matching the reference benchmark protocol, so an
//! empty file (or no file at all) yields the standard trial.

use crate::core::{GridTransform, Point2D, Pose2D};
use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub trial: TrialConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network endpoints of the simulator bridge and the controller under test
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Simulator bridge address (default: 127.0.0.1:5555)
    #[serde(default = "default_simulator_address")]
    pub simulator_address: String,

    /// Goal-acceptance interface of the controller (default: 127.0.0.1:5556)
    #[serde(default = "default_controller_address")]
    pub controller_address: String,

    /// Per-call connect/read/write timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Goal position relative to the initial pose
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct GoalOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Trial protocol parameters
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TrialConfig {
    /// Canonical start pose in world frame (default: -2, 3, 1.57)
    #[serde(default = "default_initial_pose")]
    pub initial_pose: Pose2D,

    /// Goal relative to the start pose (default: 0, 10)
    #[serde(default = "default_goal_offset")]
    pub goal_offset: GoalOffset,

    /// Frame the goal is expressed in when sent to the controller
    #[serde(default = "default_goal_frame")]
    pub goal_frame: String,

    /// Maximum distance from the start pose to accept a reset (meters)
    #[serde(default = "default_reset_tolerance")]
    pub reset_tolerance: f64,

    /// Wait between a reset command and re-reading the pose (sim seconds)
    #[serde(default = "default_settle_interval")]
    pub settle_interval: f64,

    /// Reset attempts before giving up
    #[serde(default = "default_max_reset_attempts")]
    pub max_reset_attempts: u32,

    /// Displacement from the start pose that counts as "started moving" (meters)
    #[serde(default = "default_motion_threshold")]
    pub motion_threshold: f64,

    /// Distance to goal that counts as success (meters)
    #[serde(default = "default_goal_tolerance")]
    pub goal_tolerance: f64,

    /// Trial time limit measured from motion start (sim seconds)
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,

    /// Monitoring tick (sim seconds)
    #[serde(default = "default_tick")]
    pub tick: f64,

    /// Real-time sleep between clock polls (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Ceiling on waiting for the agent to start moving (sim seconds)
    #[serde(default = "default_motion_start_timeout")]
    pub motion_start_timeout: Option<f64>,

    /// Ceiling on waiting for the controller to accept goals (seconds)
    #[serde(default = "default_controller_ready_timeout")]
    pub controller_ready_timeout_secs: f64,

    /// Real time allowed for the simulation clock to advance one wait (seconds)
    #[serde(default = "default_clock_stall_timeout")]
    pub clock_stall_timeout_secs: f64,
}

/// Scoring parameters
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Nominal reference speed used to derive the optimal time (m/s)
    #[serde(default = "default_reference_speed")]
    pub reference_speed: f64,

    /// Lower clip bound as a multiple of the optimal time
    #[serde(default = "default_lower_clip_factor")]
    pub lower_clip_factor: f64,

    /// Upper clip bound as a multiple of the optimal time
    #[serde(default = "default_upper_clip_factor")]
    pub upper_clip_factor: f64,

    /// Path-grid to world transform of the reference paths
    #[serde(default)]
    pub grid: GridTransform,
}

/// Output configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Append-only result log
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Directory holding `path_<scenario>.npy` reference paths
    #[serde(default = "default_paths_dir")]
    pub paths_dir: PathBuf,
}

/// Logging configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_simulator_address() -> String {
    "127.0.0.1:5555".to_string()
}
fn default_controller_address() -> String {
    "127.0.0.1:5556".to_string()
}
fn default_timeout() -> u64 {
    5000
}

// Trial defaults
fn default_initial_pose() -> Pose2D {
    Pose2D::new(-2.0, 3.0, 1.57)
}
fn default_goal_offset() -> GoalOffset {
    GoalOffset { dx: 0.0, dy: 10.0 }
}
fn default_goal_frame() -> String {
    "odom".to_string()
}
fn default_reset_tolerance() -> f64 {
    0.1
}
fn default_settle_interval() -> f64 {
    1.0
}
fn default_max_reset_attempts() -> u32 {
    30
}
fn default_motion_threshold() -> f64 {
    0.1
}
fn default_goal_tolerance() -> f64 {
    1.0
}
fn default_time_limit() -> f64 {
    100.0
}
fn default_tick() -> f64 {
    0.1
}
fn default_poll_interval_ms() -> u64 {
    10
}
fn default_motion_start_timeout() -> Option<f64> {
    Some(60.0)
}
fn default_controller_ready_timeout() -> f64 {
    30.0
}
fn default_clock_stall_timeout() -> f64 {
    10.0
}

// Scoring defaults
fn default_reference_speed() -> f64 {
    2.0
}
fn default_lower_clip_factor() -> f64 {
    4.0
}
fn default_upper_clip_factor() -> f64 {
    8.0
}

fn default_results_path() -> PathBuf {
    PathBuf::from("out.txt")
}
fn default_paths_dir() -> PathBuf {
    PathBuf::from("worlds/BARN/path_files")
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            simulator_address: default_simulator_address(),
            controller_address: default_controller_address(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            initial_pose: default_initial_pose(),
            goal_offset: default_goal_offset(),
            goal_frame: default_goal_frame(),
            reset_tolerance: default_reset_tolerance(),
            settle_interval: default_settle_interval(),
            max_reset_attempts: default_max_reset_attempts(),
            motion_threshold: default_motion_threshold(),
            goal_tolerance: default_goal_tolerance(),
            time_limit: default_time_limit(),
            tick: default_tick(),
            poll_interval_ms: default_poll_interval_ms(),
            motion_start_timeout: default_motion_start_timeout(),
            controller_ready_timeout_secs: default_controller_ready_timeout(),
            clock_stall_timeout_secs: default_clock_stall_timeout(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reference_speed: default_reference_speed(),
            lower_clip_factor: default_lower_clip_factor(),
            upper_clip_factor: default_upper_clip_factor(),
            grid: GridTransform::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            paths_dir: default_paths_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TrialConfig {
    /// Start position (heading dropped)
    pub fn initial_position(&self) -> Point2D {
        self.initial_pose.position()
    }

    /// Goal in world frame: initial position plus goal offset
    pub fn goal_position(&self) -> Point2D {
        self.initial_position() + Point2D::new(self.goal_offset.dx, self.goal_offset.dy)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn controller_ready_timeout(&self) -> Duration {
        secs_to_duration(self.controller_ready_timeout_secs)
    }

    pub fn clock_stall_timeout(&self) -> Duration {
        secs_to_duration(self.clock_stall_timeout_secs)
    }
}

/// Negative and NaN clamp to zero, out-of-range saturates.
fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BenchError::Config(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )))
    }
}

fn check_duration(name: &str, secs: f64) -> Result<()> {
    check_non_negative(name, secs)?;
    Duration::try_from_secs_f64(secs)
        .map(|_| ())
        .map_err(|e| BenchError::Config(format!("{}: {}", name, e)))
}

impl ConnectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("Failed to read config file: {}", e)))?;
        let config: BenchConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the protocol ill-defined
    pub fn validate(&self) -> Result<()> {
        let trial = &self.trial;
        if !(trial.tick > 0.0 && trial.tick.is_finite()) {
            return Err(BenchError::Config("trial.tick must be positive".into()));
        }
        if !(trial.time_limit > 0.0 && trial.time_limit.is_finite()) {
            return Err(BenchError::Config("trial.time_limit must be positive".into()));
        }
        check_non_negative("trial.reset_tolerance", trial.reset_tolerance)?;
        check_non_negative("trial.settle_interval", trial.settle_interval)?;
        check_non_negative("trial.motion_threshold", trial.motion_threshold)?;
        check_non_negative("trial.goal_tolerance", trial.goal_tolerance)?;
        if let Some(limit) = trial.motion_start_timeout {
            check_non_negative("trial.motion_start_timeout", limit)?;
        }
        check_duration(
            "trial.controller_ready_timeout_secs",
            trial.controller_ready_timeout_secs,
        )?;
        check_duration("trial.clock_stall_timeout_secs", trial.clock_stall_timeout_secs)?;
        if trial.max_reset_attempts == 0 {
            return Err(BenchError::Config(
                "trial.max_reset_attempts must be at least 1".into(),
            ));
        }
        let scoring = &self.scoring;
        if !(scoring.reference_speed > 0.0 && scoring.reference_speed.is_finite()) {
            return Err(BenchError::Config(
                "scoring.reference_speed must be positive".into(),
            ));
        }
        if scoring.lower_clip_factor <= 0.0 || scoring.upper_clip_factor < scoring.lower_clip_factor
        {
            return Err(BenchError::Config(format!(
                "invalid clip factors [{}, {}]",
                scoring.lower_clip_factor, scoring.upper_clip_factor
            )));
        }
        Ok(())
    }
}
