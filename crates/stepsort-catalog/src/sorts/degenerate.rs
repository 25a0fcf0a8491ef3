//! Deliberately inefficient sorts.

use stepsort_core::{Addr, Relation, Stage, StorageError};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

use crate::kernels::FisherYates;
use crate::verify::VerifyTask;

/// Multiply-and-surrender: sort both halves, move the larger of their
/// maxima to the end, then sort everything but the end again.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlowSort;

impl Algorithm for SlowSort {
    fn name(&self) -> &str {
        "Slow Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Slow {
            i: 0,
            j: None,
            pc: 0,
        })
    }
}

/// Sorts the inclusive range `[i, j]`. The trailing recursive call is a
/// loop over the same frame.
struct Slow {
    i: usize,
    j: Option<usize>,
    pc: u8,
}

impl Slow {
    fn range(i: usize, j: usize) -> Box<dyn Task> {
        Box::new(Self {
            i,
            j: Some(j),
            pc: 0,
        })
    }
}

impl Task for Slow {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let j = match self.j {
            Some(j) => j,
            None => match cx.main_len().checked_sub(1) {
                Some(j) => *self.j.insert(j),
                None => return Ok(Step::Done),
            },
        };
        let (i, m) = (self.i, self.i + (j - self.i) / 2);
        match self.pc {
            0 => {
                if i >= j {
                    return Ok(Step::Done);
                }
                self.pc = 1;
                Ok(Step::Call(Slow::range(i, m)))
            }
            1 => {
                self.pc = 2;
                Ok(Step::Call(Slow::range(m + 1, j)))
            }
            2 => {
                let larger = cx.compare(Addr::main(m), Relation::Gt, Addr::main(j))?;
                if larger {
                    self.pc = 3;
                } else {
                    self.j = Some(j - 1);
                    self.pc = 0;
                }
                Ok(Step::Yield)
            }
            _ => {
                cx.swap(Addr::main(m), Addr::main(j))?;
                self.j = Some(j - 1);
                self.pc = 0;
                Ok(Step::Yield)
            }
        }
    }
}

/// Verify; if unsorted, shuffle and try again.
#[derive(Clone, Copy, Debug, Default)]
pub struct BogoSort;

impl Algorithm for BogoSort {
    fn name(&self) -> &str {
        "Bogo Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Bogo { checking: false })
    }
}

struct Bogo {
    checking: bool,
}

impl Task for Bogo {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if !self.checking {
            self.checking = true;
            return Ok(Step::Call(Box::new(VerifyTask::default())));
        }
        self.checking = false;
        if cx.verdict() == Some(true) {
            return Ok(Step::Done);
        }
        Ok(Step::Call(Box::new(FisherYates::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Storage;

    #[test]
    fn slow_sort_sorts_with_shallow_frames() {
        let mut s = Storage::from_values((0..40).rev().collect());
        let mut seq = SlowSort.run();
        seq.drain_seeded(&mut s, 0).unwrap();
        assert_eq!(s.main_array(), (0..40).collect::<Vec<_>>().as_slice());
        assert!(seq.max_depth() <= 8, "depth {}", seq.max_depth());
    }

    #[test]
    fn bogo_sort_on_sorted_input_only_verifies() {
        let mut s = Storage::new(6);
        BogoSort.run().drain_seeded(&mut s, 0).unwrap();
        assert_eq!(s.stats().comparisons, 5);
        assert_eq!(s.stats().swaps, 0);
    }

    #[test]
    fn bogo_sort_eventually_sorts_small_arrays() {
        let mut s = Storage::from_values(vec![3, 1, 2, 0]);
        BogoSort.run().drain_seeded(&mut s, 42).unwrap();
        assert_eq!(s.main_array(), &[0, 1, 2, 3]);
    }
}
