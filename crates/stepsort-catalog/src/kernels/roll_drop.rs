//! Roll-and-drop merge with a scratch buffer the size of the left run.
//!
//! Merges the adjacent sorted runs `A = [start, start + a)` and
//! `B = [start + a, start + a + b)` of the main array. `A` is copied to
//! scratch and the main-array copy of it becomes a *window* that travels
//! right through `B`:
//!
//! - **drop**: the smallest scratch value is not greater than the element
//!   just past the window, so it belongs at the window's left edge. The
//!   window is rewritten from scratch and shrinks from the left.
//! - **roll**: the element past the window is smaller, so it is swapped
//!   to the window's left edge and the window shifts right by one.
//!
//! When the window reaches the end of `B` the remaining scratch is
//! copied in. Stable: ties drop from `A` first.

use stepsort_core::{Addr, Relation, StorageError};
use stepsort_task::{copy_array_slice, Step, Task, TaskContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Load,
    Decide,
    Roll,
    Shrink,
    Finish,
    Done,
}

/// One roll-and-drop merge. `aux` must hold at least `a_len` elements.
pub struct RollAndDrop {
    aux: usize,
    a_len: usize,
    end: usize,
    window_start: usize,
    window_end: usize,
    s: usize,
    phase: Phase,
}

impl RollAndDrop {
    /// Merge `[start, start + a_len)` with `[start + a_len, start + a_len + b_len)`.
    pub fn new(start: usize, a_len: usize, b_len: usize, aux: usize) -> Self {
        Self {
            aux,
            a_len,
            end: start + a_len + b_len,
            window_start: start,
            window_end: start + a_len,
            s: 0,
            phase: Phase::Load,
        }
    }

    fn rewrite_window(&self) -> Box<dyn Task> {
        Box::new(copy_array_slice(
            self.aux,
            self.s,
            0,
            self.window_start,
            self.a_len - self.s,
        ))
    }
}

impl Task for RollAndDrop {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        match self.phase {
            Phase::Load => {
                self.phase = Phase::Decide;
                Ok(Step::Call(Box::new(copy_array_slice(
                    0,
                    self.window_start,
                    self.aux,
                    0,
                    self.a_len,
                ))))
            }
            Phase::Decide => {
                if self.window_start == self.window_end {
                    return Ok(Step::Done);
                }
                if self.window_end == self.end {
                    self.phase = Phase::Done;
                    return Ok(Step::Call(self.rewrite_window()));
                }
                let take_scratch = cx.compare(
                    Addr::new(self.aux, self.s),
                    Relation::Le,
                    Addr::main(self.window_end),
                )?;
                self.phase = if take_scratch { Phase::Shrink } else { Phase::Roll };
                Ok(Step::Yield)
            }
            Phase::Roll => {
                cx.swap(Addr::main(self.window_start), Addr::main(self.window_end))?;
                self.window_start += 1;
                self.window_end += 1;
                self.phase = Phase::Decide;
                Ok(Step::Yield)
            }
            Phase::Shrink => {
                self.phase = Phase::Finish;
                Ok(Step::Call(self.rewrite_window()))
            }
            Phase::Finish => {
                self.window_start += 1;
                self.s += 1;
                self.phase = Phase::Decide;
                self.resume(cx)
            }
            Phase::Done => Ok(Step::Done),
        }
    }
}
