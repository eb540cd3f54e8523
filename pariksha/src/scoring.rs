//! Trial outcome classification and the navigation metric.
//!
//! # Metric
//!
//! ```text
//! path_length  = Σ |route[i+1] - route[i]|   (start → reference waypoints → goal)
//! optimal_time = path_length / reference_speed
//! clipped_time = clamp(actual_time, lower · optimal_time, upper · optimal_time)
//! metric       = 1[success] · optimal_time / clipped_time
//! ```
//!
//! With the default factors (4, 8) a successful run scores between
//! `1/8 = 0.125` (at or beyond 8× optimal) and `1/4 = 0.25` (at or below 4×
//! optimal). The score is not normalized to 1.0. Unsuccessful runs score 0,
//! as do degenerate scenarios whose reference route has zero length.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::core::{GridTransform, Point2D, distance};

/// How a completed trial ended. Exactly one holds per trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Succeeded,
    Collided,
    TimedOut,
}

impl Outcome {
    /// Classify a terminated trial. Collision takes precedence over timeout,
    /// timeout over success.
    pub fn classify(collided: bool, elapsed: f64, time_limit: f64) -> Self {
        if collided {
            Outcome::Collided
        } else if elapsed >= time_limit {
            Outcome::TimedOut
        } else {
            Outcome::Succeeded
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Succeeded
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Collided => "collided",
            Outcome::TimedOut => "timeout",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total length of a polyline.
pub fn path_length(path: &[Point2D]) -> f64 {
    path.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// World-frame route used for scoring: start, transformed waypoints, goal.
pub fn reference_route(
    grid_path: &[Point2D],
    transform: &GridTransform,
    start: Point2D,
    goal: Point2D,
) -> Vec<Point2D> {
    let mut route = Vec::with_capacity(grid_path.len() + 2);
    route.push(start);
    route.extend(transform.path_to_world(grid_path));
    route.push(goal);
    route
}

/// Clip `actual` into `[lower · optimal, upper · optimal]`.
#[inline]
pub fn clip_time(actual: f64, optimal: f64, lower_factor: f64, upper_factor: f64) -> f64 {
    actual.clamp(lower_factor * optimal, upper_factor * optimal)
}

/// Scoring breakdown of one trial.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub path_length: f64,
    pub optimal_time: f64,
    pub actual_time: f64,
    pub clipped_time: f64,
    pub metric: f64,
}

/// Computes the navigation metric.
#[derive(Clone, Debug)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score a trial from the raw grid-space reference path.
    pub fn score(
        &self,
        grid_path: &[Point2D],
        start: Point2D,
        goal: Point2D,
        outcome: Outcome,
        actual_time: f64,
    ) -> Score {
        let route = reference_route(grid_path, &self.config.grid, start, goal);
        self.score_route(&route, outcome, actual_time)
    }

    /// Score a trial from an already world-frame route.
    pub fn score_route(&self, route: &[Point2D], outcome: Outcome, actual_time: f64) -> Score {
        let length = path_length(route);
        let optimal_time = length / self.config.reference_speed;

        if optimal_time <= 0.0 || !optimal_time.is_finite() {
            // Zero-length route: 0/0 otherwise
            return Score {
                path_length: length,
                optimal_time: 0.0,
                actual_time,
                clipped_time: 0.0,
                metric: 0.0,
            };
        }

        let clipped_time = clip_time(
            actual_time,
            optimal_time,
            self.config.lower_clip_factor,
            self.config.upper_clip_factor,
        );
        let metric = if outcome.is_success() {
            optimal_time / clipped_time
        } else {
            0.0
        };

        Score {
            path_length: length,
            optimal_time,
            actual_time,
            clipped_time,
            metric,
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
