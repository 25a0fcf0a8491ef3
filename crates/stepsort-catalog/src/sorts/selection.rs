//! Selection sort.

use stepsort_core::{Addr, Relation, Stage, StorageError};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

/// Finds the minimum of the unsorted suffix and swaps it to the front.
/// Skips the swap when the minimum is already in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionSort;

impl Algorithm for SelectionSort {
    fn name(&self) -> &str {
        "Selection Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Selection {
            n: None,
            i: 0,
            j: 1,
            min: 0,
        })
    }
}

struct Selection {
    n: Option<usize>,
    i: usize,
    j: usize,
    min: usize,
}

impl Task for Selection {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let n = *self.n.get_or_insert_with(|| cx.main_len());
        loop {
            if self.i + 1 >= n {
                return Ok(Step::Done);
            }
            if self.j < n {
                if cx.compare(Addr::main(self.j), Relation::Lt, Addr::main(self.min))? {
                    self.min = self.j;
                }
                self.j += 1;
                return Ok(Step::Yield);
            }
            let (front, min) = (self.i, self.min);
            self.i += 1;
            self.min = self.i;
            self.j = self.i + 1;
            if front != min {
                cx.swap(Addr::main(front), Addr::main(min))?;
                return Ok(Step::Yield);
            }
        }
    }
}
