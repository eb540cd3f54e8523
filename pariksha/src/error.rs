//! Error types for Pariksha

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Wait that was cut short by a configured bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortPhase {
    /// Agent never moved away from the start pose after the goal was sent
    MotionStart,
    /// Simulation clock stopped advancing
    ClockStall,
}

impl fmt::Display for AbortPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortPhase::MotionStart => write!(f, "motion start"),
            AbortPhase::ClockStall => write!(f, "simulation clock stall"),
        }
    }
}

/// Pariksha error type.
///
/// Every variant is fatal to the trial in progress: no result record is
/// written. Collisions and timeouts are trial outcomes, not errors.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Simulation unavailable: {0}")]
    SimulationUnavailable(String),

    #[error("Navigation controller unavailable: {0}")]
    ControllerUnavailable(String),

    #[error("Reference path for scenario {scenario}: {reason}")]
    ReferencePath { scenario: u32, reason: String },

    #[error("Agent did not settle at the initial pose after {attempts} reset attempts")]
    ResetFailed { attempts: u32 },

    #[error("Trial aborted during {phase} after {waited:?}")]
    TrialAborted { phase: AbortPhase, waited: Duration },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed result record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prost::DecodeError> for BenchError {
    fn from(e: prost::DecodeError) -> Self {
        BenchError::Protocol(e.to_string())
    }
}

impl From<toml::de::Error> for BenchError {
    fn from(e: toml::de::Error) -> Self {
        BenchError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
