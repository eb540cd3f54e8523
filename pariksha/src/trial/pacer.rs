//! Fixed-cadence waiting against the simulation clock.
//!
//! Waits are measured on the simulation clock, which may run faster or slower
//! than real time. Between clock polls the thread sleeps for the poll
//! interval instead of spinning.

use std::time::{Duration, Instant};

use crate::error::{AbortPhase, BenchError, Result};
use crate::sim::Simulation;

/// Detects a simulation clock that has stopped advancing.
#[derive(Debug)]
pub struct StallGuard {
    last_clock: f64,
    last_advance: Instant,
    timeout: Duration,
}

impl StallGuard {
    pub fn new(clock: f64, timeout: Duration) -> Self {
        Self {
            last_clock: clock,
            last_advance: Instant::now(),
            timeout,
        }
    }

    /// Record a clock reading. Fails once the clock has not moved for longer
    /// than the timeout in real time.
    pub fn observe(&mut self, clock: f64) -> Result<()> {
        if clock > self.last_clock {
            self.last_clock = clock;
            self.last_advance = Instant::now();
            return Ok(());
        }

        let waited = self.last_advance.elapsed();
        if waited > self.timeout {
            return Err(BenchError::TrialAborted {
                phase: AbortPhase::ClockStall,
                waited,
            });
        }
        Ok(())
    }
}

/// Sim-clock pacing for the reset and monitoring loops.
#[derive(Clone, Debug)]
pub struct Pacer {
    poll_interval: Duration,
    stall_timeout: Duration,
}

impl Pacer {
    pub fn new(poll_interval: Duration, stall_timeout: Duration) -> Self {
        Self {
            poll_interval,
            stall_timeout,
        }
    }

    pub fn stall_timeout(&self) -> Duration {
        self.stall_timeout
    }

    /// Sleep one poll interval.
    pub fn nap(&self) {
        if !self.poll_interval.is_zero() {
            std::thread::sleep(self.poll_interval);
        }
    }

    /// Block until the clock reads at least `since + duration`.
    /// Returns the satisfying clock reading.
    pub fn wait_until<S: Simulation + ?Sized>(
        &self,
        sim: &mut S,
        since: f64,
        duration: f64,
    ) -> Result<f64> {
        let mut guard = StallGuard::new(since, self.stall_timeout);
        loop {
            let now = sim.sim_time()?;
            if now - since >= duration {
                return Ok(now);
            }
            guard.observe(now)?;
            self.nap();
        }
    }

    /// Block for `duration` of simulation time from now.
    pub fn wait<S: Simulation + ?Sized>(&self, sim: &mut S, duration: f64) -> Result<f64> {
        let start = sim.sim_time()?;
        self.wait_until(sim, start, duration)
    }
}
