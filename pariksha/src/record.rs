//! Append-only result log.
//!
//! One line per trial, six whitespace-separated fields:
//!
//! ```text
//! scenario_id success collided timed_out elapsed_time metric
//! 0 1 0 0 23.4100 0.2136
//! ```
//!
//! Flags are written as `0`/`1`, times and metric with four decimals.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BenchError, Result};
use crate::scoring::Outcome;

/// Persisted summary of one completed trial.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub scenario_id: u32,
    pub success: bool,
    pub collided: bool,
    pub timed_out: bool,
    pub elapsed_time: f64,
    pub metric: f64,
}

impl ResultRecord {
    pub fn new(scenario_id: u32, outcome: Outcome, elapsed_time: f64, metric: f64) -> Self {
        Self {
            scenario_id,
            success: outcome == Outcome::Succeeded,
            collided: outcome == Outcome::Collided,
            timed_out: outcome == Outcome::TimedOut,
            elapsed_time,
            metric,
        }
    }

    /// Parse one log line.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let malformed = |reason: String| BenchError::MalformedRecord {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(malformed(format!("expected 6 fields, got {}", fields.len())));
        }

        let flag = |s: &str| match s {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(malformed(format!("invalid flag '{}'", other))),
        };
        let number = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| malformed(format!("invalid number '{}'", s)))
        };

        Ok(Self {
            scenario_id: fields[0]
                .parse()
                .map_err(|_| malformed(format!("invalid scenario id '{}'", fields[0])))?,
            success: flag(fields[1])?,
            collided: flag(fields[2])?,
            timed_out: flag(fields[3])?,
            elapsed_time: number(fields[4])?,
            metric: number(fields[5])?,
        })
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {:.4} {:.4}",
            self.scenario_id,
            self.success as u8,
            self.collided as u8,
            self.timed_out as u8,
            self.elapsed_time,
            self.metric
        )
    }
}

/// Append-only result log file.
///
/// Appends from several handles in one process are serialized by the
/// internal lock; each record goes out in a single write.
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ResultLog {
    /// Open (creating if needed) without truncating.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        let line = format!("{}\n", record);
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        info!("Recorded result to {}: {}", self.path.display(), record);
        Ok(())
    }

    /// Read every record of an existing log. Blank lines are skipped.
    pub fn read_records(path: &Path) -> Result<Vec<ResultRecord>> {
        let content = std::fs::read_to_string(path)?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| ResultRecord::parse(line, i + 1))
            .collect()
    }
}

/// Aggregate over a set of trial records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub trials: usize,
    pub successes: usize,
    pub collisions: usize,
    pub timeouts: usize,
    pub success_rate: f64,
    /// Mean metric over all trials (failures count as 0)
    pub mean_metric: f64,
    /// Mean elapsed time of successful trials only
    pub mean_success_time: Option<f64>,
}

impl Summary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let trials = records.len();
        let successes = records.iter().filter(|r| r.success).count();
        let collisions = records.iter().filter(|r| r.collided).count();
        let timeouts = records.iter().filter(|r| r.timed_out).count();
        let mean_metric = records.iter().map(|r| r.metric).sum::<f64>() / trials as f64;

        let mean_success_time = (successes > 0).then(|| {
            records
                .iter()
                .filter(|r| r.success)
                .map(|r| r.elapsed_time)
                .sum::<f64>()
                / successes as f64
        });

        Self {
            trials,
            successes,
            collisions,
            timeouts,
            success_rate: successes as f64 / trials as f64,
            mean_metric,
            mean_success_time,
        }
    }

    /// Format as a few lines for the terminal.
    pub fn report(&self) -> String {
        let mut out = format!(
            "Trials: {}\nSucceeded: {} ({:.1}%)\nCollided: {}\nTimed out: {}\nMean metric: {:.4}",
            self.trials,
            self.successes,
            self.success_rate * 100.0,
            self.collisions,
            self.timeouts,
            self.mean_metric
        );
        if let Some(t) = self.mean_success_time {
            out.push_str(&format!("\nMean time (successful): {:.2} s", t));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_line_format() {
        let record = ResultRecord::new(3, Outcome::Succeeded, 23.41, 0.213_64);
        assert_eq!(record.to_string(), "3 1 0 0 23.4100 0.2136");

        let record = ResultRecord::new(12, Outcome::Collided, 7.0, 0.0);
        assert_eq!(record.to_string(), "12 0 1 0 7.0000 0.0000");
    }

    #[test]
    fn test_flags_follow_outcome() {
        for outcome in [Outcome::Succeeded, Outcome::Collided, Outcome::TimedOut] {
            let r = ResultRecord::new(0, outcome, 1.0, 0.0);
            let set = [r.success, r.collided, r.timed_out]
                .iter()
                .filter(|f| **f)
                .count();
            assert_eq!(set, 1);
        }
    }

    #[test]
    fn test_append_never_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "0 1 0 0 20.0000 0.2500\n").unwrap();

        let log = ResultLog::open(&path).unwrap();
        log.append(&ResultRecord::new(1, Outcome::TimedOut, 100.05, 0.0))
            .unwrap();
        drop(log);

        // Reopening appends after existing content
        let log = ResultLog::open(&path).unwrap();
        log.append(&ResultRecord::new(2, Outcome::Collided, 3.5, 0.0))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "0 1 0 0 20.0000 0.2500\n1 0 0 1 100.0500 0.0000\n2 0 1 0 3.5000 0.0000\n"
        );
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results/run1/out.txt");
        let log = ResultLog::open(&path).unwrap();
        log.append(&ResultRecord::new(0, Outcome::Succeeded, 30.0, 0.2))
            .unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_read_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "0 1 0 0 20.0000 0.2500\n\n5 0 1 0 4.2000 0.0000\n").unwrap();

        let records = ResultLog::read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].scenario_id, 5);
        assert!(records[1].collided);
        assert_eq!(records[1].elapsed_time, 4.2);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "0 1 0 0 20.0000 0.2500\n1 yes 0 0 1.0 0.0\n").unwrap();

        let err = ResultLog::read_records(&path).unwrap_err();
        assert!(matches!(err, BenchError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_summary() {
        let records = vec![
            ResultRecord::new(0, Outcome::Succeeded, 20.0, 0.25),
            ResultRecord::new(1, Outcome::Succeeded, 40.0, 0.15),
            ResultRecord::new(2, Outcome::Collided, 5.0, 0.0),
            ResultRecord::new(3, Outcome::TimedOut, 100.0, 0.0),
        ];
        let summary = Summary::from_records(&records);
        assert_eq!(summary.trials, 4);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.collisions, 1);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(summary.success_rate, 0.5);
        assert!((summary.mean_metric - 0.1).abs() < 1e-12);
        assert_eq!(summary.mean_success_time, Some(30.0));
        assert!(summary.report().contains("Succeeded: 2 (50.0%)"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_records(&[]);
        assert_eq!(summary.trials, 0);
        assert_eq!(summary.mean_success_time, None);
    }
}
