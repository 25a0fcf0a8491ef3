//! Square root sort: block insertion sort plus roll-and-drop merges.

use stepsort_core::{Stage, StorageError};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

use crate::kernels::{insertion, RollAndDrop};

/// Sorts the main array with a scratch array of `⌈√n⌉` elements.
///
/// Blocks of `⌈√n⌉` elements are taken from the right. Each block is
/// insertion sorted, then merged into the already sorted suffix with a
/// roll-and-drop merge, so the block is always the short run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquareRootSort;

impl Algorithm for SquareRootSort {
    fn name(&self) -> &str {
        "Square Root Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(SquareRoot {
            n: 0,
            block: 0,
            aux: None,
            k: 0,
            phase: Phase::Spawn,
        })
    }
}

/// `⌈√n⌉`.
pub(crate) fn ceil_sqrt(n: usize) -> usize {
    let r = n.isqrt();
    if r * r < n {
        r + 1
    } else {
        r
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Spawn,
    SortBlock,
    MergeBlock,
    Delete,
    Done,
}

struct SquareRoot {
    n: usize,
    block: usize,
    aux: Option<usize>,
    k: usize,
    phase: Phase,
}

impl SquareRoot {
    fn block_start(&self) -> usize {
        self.k.saturating_sub(self.block)
    }
}

impl Task for SquareRoot {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        match self.phase {
            Phase::Spawn => {
                self.n = cx.main_len();
                if self.n < 2 {
                    return Ok(Step::Done);
                }
                self.block = ceil_sqrt(self.n);
                self.k = self.n;
                self.aux = Some(cx.spawn_array(self.block));
                self.phase = Phase::SortBlock;
                Ok(Step::Yield)
            }
            Phase::SortBlock => {
                if self.k == 0 {
                    self.phase = Phase::Delete;
                    return self.resume(cx);
                }
                self.phase = Phase::MergeBlock;
                Ok(Step::Call(Box::new(insertion(self.block_start(), self.k))))
            }
            Phase::MergeBlock => {
                let Some(aux) = self.aux else {
                    return Ok(Step::Done);
                };
                let s = self.block_start();
                let merge = RollAndDrop::new(s, self.k - s, self.n - self.k, aux);
                self.k = s;
                self.phase = Phase::SortBlock;
                Ok(Step::Call(Box::new(merge)))
            }
            Phase::Delete => {
                self.phase = Phase::Done;
                match self.aux.take() {
                    Some(aux) => {
                        cx.delete_array(aux)?;
                        Ok(Step::Yield)
                    }
                    None => Ok(Step::Done),
                }
            }
            Phase::Done => Ok(Step::Done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use stepsort_core::Storage;

    #[test]
    fn ceil_sqrt_rounds_up() {
        assert_eq!(
            [0, 1, 2, 4, 5, 9, 10, 16, 17].map(ceil_sqrt),
            [0, 1, 2, 2, 3, 3, 4, 4, 5]
        );
    }

    #[test]
    fn scratch_holds_one_block() {
        let mut s = Storage::from_values((0..50).rev().collect());
        let mut seq = SquareRootSort.run();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut widest = 0;
        while seq.advance(&mut s, &mut rng).is_ok() {
            if s.array_count() > 1 {
                widest = widest.max(s.arrays()[1].len());
            }
        }
        assert_eq!(widest, 8);
        assert_eq!(s.main_array(), (0..50).collect::<Vec<_>>().as_slice());
        assert_eq!(s.array_count(), 1);
    }
}
