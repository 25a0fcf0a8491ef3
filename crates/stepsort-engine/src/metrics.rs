//! Run reports and published control snapshots.
//!
//! [`RunReport`] summarizes one finished (or failed) run; observers read
//! it from [`Control::last_report`](crate::Control::last_report) or from
//! the [`ControlSnapshot`] a realtime control publishes after every tick.

use std::time::Duration;

use stepsort_core::{Snapshot, Stage, Statistics, StorageError};

use crate::control::ControlState;

/// Summary of one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Input generator name.
    pub input: String,
    /// Shuffle name.
    pub shuffle: String,
    /// Sort name.
    pub sort: String,
    /// Main array length the run used.
    pub main_array_len: usize,
    /// Steps performed per stage, in [`Stage::ALL`] order.
    pub stage_steps: [u64; 4],
    /// Deepest work stack any stage reached.
    pub max_depth: usize,
    /// Counters at the end of the run.
    pub stats: Statistics,
    /// The verifier's verdict. `None` if the run failed before verify
    /// finished.
    pub verdict: Option<bool>,
    /// The storage failure that ended the run, if any.
    pub failure: Option<StorageError>,
    /// Ticks the run took.
    pub ticks: u64,
    /// Wall-clock time from start to finish.
    pub elapsed: Duration,
}

impl RunReport {
    /// Whether the run completed and the main array verified sorted.
    pub fn passed(&self) -> bool {
        self.failure.is_none() && self.verdict == Some(true)
    }

    /// Steps performed by `stage`.
    pub fn steps(&self, stage: Stage) -> u64 {
        self.stage_steps[stage.index()]
    }

    /// Steps performed by all stages.
    pub fn total_steps(&self) -> u64 {
        self.stage_steps.iter().sum()
    }
}

/// Everything an observer needs to render one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlSnapshot {
    /// Control state at the time of the snapshot.
    pub state: ControlState,
    /// Stage executing, or `None` between runs.
    pub stage: Option<Stage>,
    /// Steps performed by the current run.
    pub steps: u64,
    /// Ticks since construction.
    pub ticks: u64,
    /// Arrays, pointers and statistics.
    pub storage: Snapshot,
    /// Report of the most recently finished run.
    pub last_report: Option<RunReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            input: "Linear".into(),
            shuffle: "Reversal".into(),
            sort: "Bubble Sort".into(),
            main_array_len: 4,
            stage_steps: [4, 2, 10, 3],
            max_depth: 1,
            stats: Statistics::default(),
            verdict: Some(true),
            failure: None,
            ticks: 19,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn passed_requires_verdict_and_no_failure() {
        let mut r = report();
        assert!(r.passed());
        assert_eq!(r.total_steps(), 19);
        assert_eq!(r.steps(Stage::Sort), 10);

        r.verdict = Some(false);
        assert!(!r.passed());

        r.verdict = None;
        r.failure = Some(StorageError::ProtectedArray);
        assert!(!r.passed());
    }
}
