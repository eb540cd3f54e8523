//! # Pariksha
//!
//! Benchmark harness for navigation controllers running in a physics
//! simulator.
//!
//! ## Overview
//!
//! Each invocation runs one trial of one scenario:
//!
//! 1. **Reset** the agent to the canonical start pose until it has settled
//! 2. **Dispatch** a goal 10m ahead to the controller under test
//! 3. **Monitor** progress on the simulation clock until the agent reaches
//!    the goal, collides, or runs out of time
//! 4. **Score** the run against the scenario's reference path
//! 5. **Record** one line in an append-only result log
//!
//! The simulator and the controller are external services reached through
//! the [`sim::Simulation`] and [`sim::NavigationController`] traits. A
//! scripted [`sim::MockWorld`] implements both for tests.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pariksha::{BenchConfig, ResultLog, TrialRunner};
//! use pariksha::sim::{ControllerClient, PathStore, SimulationClient};
//!
//! let config = BenchConfig::default();
//! let paths = PathStore::new(&config.output.paths_dir);
//! let mut sim = SimulationClient::connect("127.0.0.1:5555", config.connection.timeout(), paths)?;
//! let mut controller = ControllerClient::new("127.0.0.1:5556", config.connection.timeout())?;
//! let log = ResultLog::open(&config.output.results_path)?;
//!
//! let report = TrialRunner::new(&config).run_and_record(0, &mut sim, &mut controller, &log)?;
//! println!("{}", report.record);
//! ```
//!
//! ## Coordinate System
//!
//! Poses are in the simulator world frame: X/Y in meters, theta in radians,
//! CCW positive from +X. Reference paths are in a separate cell grid and are
//! mapped to world coordinates by [`core::GridTransform`].

// Geometry primitives
pub mod core;

// Configuration and errors
pub mod config;
pub mod error;

// NPY reference path reader
pub mod io;

// Simulator and controller boundary
pub mod sim;

// Trial sequencing
pub mod trial;

// Outcome, metric and result log
pub mod record;
pub mod scoring;

pub use config::BenchConfig;
pub use crate::core::{GridTransform, Point2D, Pose2D};
pub use error::{AbortPhase, BenchError, Result};
pub use record::{ResultLog, ResultRecord, Summary};
pub use scoring::{Outcome, Score, Scorer};
pub use trial::{TrialReport, TrialRunner};
