//! Array reversal, iterative and recursive.

use stepsort_core::{Addr, StorageError};
use stepsort_task::{Step, Task, TaskContext};

/// Reverses `[start, end)` of an array by swapping mirrored pairs.
pub struct Reverse {
    array: usize,
    start: usize,
    end: Option<usize>,
    i: usize,
}

impl Reverse {
    /// Reverse positions `[start, end)` of `array`.
    pub fn range(array: usize, start: usize, end: usize) -> Self {
        Self {
            array,
            start,
            end: Some(end),
            i: 0,
        }
    }

    /// Reverse the whole main array.
    pub fn main() -> Self {
        Self {
            array: 0,
            start: 0,
            end: None,
            i: 0,
        }
    }
}

impl Task for Reverse {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let end = match self.end {
            Some(end) => end,
            None => *self.end.insert(cx.len_of(self.array)?),
        };
        let len = end.saturating_sub(self.start);
        if self.i >= len / 2 {
            return Ok(Step::Done);
        }
        let left = Addr::new(self.array, self.start + self.i);
        let right = Addr::new(self.array, end - 1 - self.i);
        cx.swap(left, right)?;
        self.i += 1;
        Ok(Step::Yield)
    }
}

/// Reverses `[start, start + len)` of the main array by exchanging its
/// outer half-blocks, then reversing each half-block recursively.
///
/// O(n log n) swaps, O(log n) frames deep.
pub struct BlockReverse {
    start: usize,
    len: Option<usize>,
    i: usize,
    pc: u8,
}

impl BlockReverse {
    /// Reverse the whole main array.
    pub fn main() -> Self {
        Self {
            start: 0,
            len: None,
            i: 0,
            pc: 0,
        }
    }

    fn range(start: usize, len: usize) -> Self {
        Self {
            start,
            len: Some(len),
            i: 0,
            pc: 0,
        }
    }
}

impl Task for BlockReverse {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let len = *self.len.get_or_insert_with(|| cx.main_len());
        let half = len / 2;
        if len < 2 {
            return Ok(Step::Done);
        }
        match self.pc {
            0 if self.i < half => {
                let tail = self.start + len - half;
                cx.swap(Addr::main(self.start + self.i), Addr::main(tail + self.i))?;
                self.i += 1;
                Ok(Step::Yield)
            }
            0 => {
                self.pc = 1;
                Ok(Step::Call(Box::new(Self::range(self.start, half))))
            }
            1 => {
                self.pc = 2;
                let tail = self.start + len - half;
                Ok(Step::Call(Box::new(Self::range(tail, half))))
            }
            _ => Ok(Step::Done),
        }
    }
}
