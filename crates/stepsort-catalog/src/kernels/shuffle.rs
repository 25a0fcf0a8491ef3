//! Uniform random permutation.

use rand::Rng;
use stepsort_core::{Addr, StorageError};
use stepsort_task::{Step, Task, TaskContext};

/// Fisher–Yates shuffle of the main array: position `i` is swapped with
/// a uniformly chosen position in `i..n`, for every `i` but the last.
#[derive(Default)]
pub struct FisherYates {
    n: Option<usize>,
    i: usize,
}

impl FisherYates {
    /// A shuffle of the whole main array.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Task for FisherYates {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let n = *self.n.get_or_insert_with(|| cx.main_len());
        if self.i + 1 >= n {
            return Ok(Step::Done);
        }
        let j = cx.rng().random_range(self.i..n);
        cx.swap(Addr::main(self.i), Addr::main(j))?;
        self.i += 1;
        Ok(Step::Yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Storage;
    use stepsort_task::StepSequence;

    #[test]
    fn same_seed_same_permutation() {
        let run = |seed| {
            let mut s = Storage::new(32);
            StepSequence::new(Box::new(FisherYates::new()))
                .drain_seeded(&mut s, seed)
                .unwrap();
            s
        };
        let a = run(7);
        let b = run(7);
        assert_eq!(a.main_array(), b.main_array());
        assert_eq!(a.stats().swaps, 31);

        let mut sorted = a.main_array().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=32).collect::<Vec<i64>>());
        assert_ne!(a.main_array(), run(8).main_array());
    }
}
