//! End-to-end execution of a single trial.

use tracing::{info, warn};

use crate::config::{BenchConfig, ScoringConfig, TrialConfig};
use crate::error::Result;
use crate::record::{ResultLog, ResultRecord};
use crate::scoring::{Score, Scorer};
use crate::sim::{NavigationController, Simulation};
use crate::trial::{Monitor, MonitorResult, Pacer, ResetReport, ResetSequencer, dispatch_goal};

/// Everything observed during one completed trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialReport {
    pub scenario_id: u32,
    pub reset: ResetReport,
    pub monitor: MonitorResult,
    pub score: Score,
    pub record: ResultRecord,
}

/// Runs reset → dispatch → monitor → score for one scenario.
///
/// Any error aborts the trial. Only a trial that reaches a terminal outcome
/// produces a [`ResultRecord`].
#[derive(Clone, Debug)]
pub struct TrialRunner {
    trial: TrialConfig,
    scorer: Scorer,
    pacer: Pacer,
}

impl TrialRunner {
    pub fn new(config: &BenchConfig) -> Self {
        Self::from_parts(config.trial.clone(), config.scoring.clone())
    }

    pub fn from_parts(trial: TrialConfig, scoring: ScoringConfig) -> Self {
        let pacer = Pacer::new(trial.poll_interval(), trial.clock_stall_timeout());
        Self {
            trial,
            scorer: Scorer::new(scoring),
            pacer,
        }
    }

    pub fn config(&self) -> &TrialConfig {
        &self.trial
    }

    pub fn run<S, C>(&self, scenario_id: u32, sim: &mut S, controller: &mut C) -> Result<TrialReport>
    where
        S: Simulation + ?Sized,
        C: NavigationController + ?Sized,
    {
        info!("Starting trial for scenario {}", scenario_id);

        // Resolve the reference route before moving anything
        let grid_path = sim.reference_path(scenario_id)?;

        let reset = ResetSequencer::new(&self.trial, &self.pacer).run(sim)?;
        let dispatch = dispatch_goal(controller, &self.trial)?;
        let monitor = Monitor::new(&self.trial, &self.pacer).run(sim, &dispatch.goal)?;

        if let Err(e) = sim.publish_velocity(0.0, 0.0) {
            warn!("Failed to stop agent after trial: {}", e);
        }

        let score = self.scorer.score(
            &grid_path,
            self.trial.initial_position(),
            self.trial.goal_position(),
            monitor.outcome,
            monitor.elapsed,
        );
        let record = ResultRecord::new(scenario_id, monitor.outcome, monitor.elapsed, score.metric);

        info!(
            "Navigation {} with time {:.4} (s)",
            monitor.outcome, monitor.elapsed
        );
        info!(
            "Path length: {:.4} (m), optimal time: {:.4} (s), metric: {:.4}",
            score.path_length, score.optimal_time, score.metric
        );

        Ok(TrialReport {
            scenario_id,
            reset,
            monitor,
            score,
            record,
        })
    }

    /// Run a trial and append its record to `log`. Nothing is written when
    /// the trial fails.
    pub fn run_and_record<S, C>(
        &self,
        scenario_id: u32,
        sim: &mut S,
        controller: &mut C,
        log: &ResultLog,
    ) -> Result<TrialReport>
    where
        S: Simulation + ?Sized,
        C: NavigationController + ?Sized,
    {
        let report = self.run(scenario_id, sim, controller)?;
        log.append(&report.record)?;
        Ok(report)
    }
}
