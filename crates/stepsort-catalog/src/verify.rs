//! The verifier: checks the main array is ascending.

use stepsort_core::{Addr, Relation, Stage, StorageError};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

/// Compares each adjacent pair of the main array and reports
/// `Verdict(false)` at the first descent, `Verdict(true)` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct Verify;

impl Algorithm for Verify {
    fn name(&self) -> &str {
        "Verify"
    }

    fn stage(&self) -> Stage {
        Stage::Verify
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(VerifyTask::default())
    }
}

/// The verifier's root task, also used as a child by Bogo Sort.
#[derive(Default)]
pub struct VerifyTask {
    i: usize,
    failed: bool,
}

impl Task for VerifyTask {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.failed {
            return Ok(Step::Verdict(false));
        }
        if self.i + 1 >= cx.main_len() {
            return Ok(Step::Verdict(true));
        }
        self.failed = cx.compare(Addr::main(self.i), Relation::Gt, Addr::main(self.i + 1))?;
        self.i += 1;
        Ok(Step::Yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Storage;

    fn verify(values: Vec<i64>) -> (Option<bool>, u64) {
        let mut s = Storage::from_values(values);
        let mut seq = Verify.run();
        let steps = seq.drain_seeded(&mut s, 0).unwrap();
        (seq.verdict(), steps)
    }

    #[test]
    fn empty_is_sorted_without_steps() {
        assert_eq!(verify(vec![]), (Some(true), 0));
        assert_eq!(verify(vec![4]), (Some(true), 0));
    }

    #[test]
    fn stops_at_first_descent() {
        assert_eq!(verify(vec![1, 3, 2, 0, -1]), (Some(false), 2));
        assert_eq!(verify(vec![1, 1, 2, 5]), (Some(true), 3));
    }
}
