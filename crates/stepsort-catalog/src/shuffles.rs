//! Shuffles: permute the main array before sorting.

use stepsort_core::{Stage, StorageError};
use stepsort_task::{
    copy_array_slice, Algorithm, OptionSetting, OptionSpec, Step, Task, TaskContext,
};

use crate::kernels::{BlockReverse, FisherYates, Heapify, HeapifyStrategy, Orientation, Reverse};

/// Declared option of [`Shuffle::HeapLayout`].
pub fn orientation_option() -> OptionSpec {
    OptionSpec::choice("orientation", "max", Orientation::CHOICES)
}

/// A shuffle algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shuffle {
    /// Leaves the array as the input wrote it.
    NoShuffle,
    /// Uniform Fisher–Yates shuffle.
    SwapShuffle,
    /// Reverses the array by swapping mirrored pairs.
    Reversal,
    /// Reverses the array by exchanging half-blocks recursively.
    RecursiveReversal,
    /// Rotates the array left by half its length through one scratch
    /// array.
    HalfRotation,
    /// Arranges the array as a binary heap.
    HeapLayout(Orientation),
}

impl Shuffle {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::NoShuffle => "No Shuffle",
            Self::SwapShuffle => "Swap Shuffle",
            Self::Reversal => "Reversal",
            Self::RecursiveReversal => "Recursive Reversal",
            Self::HalfRotation => "Half Rotation",
            Self::HeapLayout(_) => "Heap Layout",
        }
    }
}

impl Algorithm for Shuffle {
    fn name(&self) -> &str {
        Shuffle::name(*self)
    }

    fn stage(&self) -> Stage {
        Stage::Shuffle
    }

    fn task(&self) -> Box<dyn Task> {
        match *self {
            Self::NoShuffle => Box::new(Nothing),
            Self::SwapShuffle => Box::new(FisherYates::new()),
            Self::Reversal => Box::new(Reverse::main()),
            Self::RecursiveReversal => Box::new(BlockReverse::main()),
            Self::HalfRotation => Box::new(HalfRotation::default()),
            Self::HeapLayout(o) => Box::new(Heapify::new(o, HeapifyStrategy::BubbleUp)),
        }
    }

    fn options(&self) -> Vec<OptionSetting> {
        match self {
            Self::HeapLayout(o) => vec![orientation_option().setting(o.as_str())],
            _ => Vec::new(),
        }
    }
}

struct Nothing;

impl Task for Nothing {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        Ok(Step::Done)
    }
}

#[derive(Default)]
struct HalfRotation {
    n: usize,
    aux: usize,
    pc: u8,
}

impl Task for HalfRotation {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let half = self.n / 2;
        let step = match self.pc {
            0 => {
                self.n = cx.main_len();
                self.aux = cx.spawn_array(self.n / 2);
                Step::Yield
            }
            1 => Step::Call(Box::new(copy_array_slice(0, 0, self.aux, 0, half))),
            2 => Step::Call(Box::new(copy_array_slice(0, half, 0, 0, self.n - half))),
            3 => {
                let tail = self.n - half;
                Step::Call(Box::new(copy_array_slice(self.aux, 0, 0, tail, half)))
            }
            4 => {
                cx.delete_array(self.aux)?;
                Step::Yield
            }
            _ => return Ok(Step::Done),
        };
        self.pc += 1;
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Storage;
    use stepsort_task::OptionValue;

    fn shuffle(s: Shuffle, n: usize) -> Storage {
        let mut storage = Storage::new(n);
        s.run().drain_seeded(&mut storage, 11).unwrap();
        storage
    }

    #[test]
    fn no_shuffle_takes_no_steps() {
        let mut storage = Storage::new(8);
        assert_eq!(Shuffle::NoShuffle.run().drain_seeded(&mut storage, 0), Ok(0));
    }

    #[test]
    fn half_rotation_rotates_and_cleans_up() {
        let s = shuffle(Shuffle::HalfRotation, 7);
        assert_eq!(s.main_array(), &[4, 5, 6, 7, 1, 2, 3]);
        assert_eq!(s.array_count(), 1);
        assert_eq!((s.stats().spawns, s.stats().deletions), (1, 1));
        assert_eq!(s.stats().swaps, 0);
    }

    #[test]
    fn every_shuffle_is_a_permutation() {
        let all = [
            Shuffle::NoShuffle,
            Shuffle::SwapShuffle,
            Shuffle::Reversal,
            Shuffle::RecursiveReversal,
            Shuffle::HalfRotation,
            Shuffle::HeapLayout(Orientation::Max),
            Shuffle::HeapLayout(Orientation::Min),
        ];
        for sh in all {
            for n in [0, 1, 2, 5, 16, 33] {
                let s = shuffle(sh, n);
                let mut v = s.main_array().to_vec();
                v.sort_unstable();
                assert_eq!(v, (1..=n as i64).collect::<Vec<_>>(), "{} n={n}", sh.name());
                assert_eq!(s.array_count(), 1);
            }
        }
    }

    #[test]
    fn heap_layout_reports_orientation() {
        let opts = Shuffle::HeapLayout(Orientation::Min).options();
        assert_eq!(opts[0].value, OptionValue::from("min"));
    }
}
