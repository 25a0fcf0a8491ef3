//! Quick sort with a median-of-three pivot.

use stepsort_core::{Addr, Relation, Stage, StorageError, Value};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

/// Quick sort.
///
/// The pivot is the median of the first, middle and last elements,
/// found by two sequential minimum scans over the deduplicated
/// candidates. The pivot is swapped to the front; a moving boundary then
/// passes each smaller element to the pivot's left with two swaps. The
/// smaller side is sorted first in a child frame and the larger side
/// reuses the current frame, so frame depth stays O(log n).
#[derive(Clone, Copy, Debug, Default)]
pub struct QuickSort;

impl Algorithm for QuickSort {
    fn name(&self) -> &str {
        "Quick Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Quick::range(0, None))
    }
}

/// Up to three distinct pivot candidate positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Candidates {
    slots: [usize; 3],
    len: usize,
}

impl Candidates {
    fn of(start: usize, mid: usize, last: usize) -> Self {
        let mut c = Self::default();
        for i in [start, mid, last] {
            if !c.as_slice().contains(&i) {
                c.slots[c.len] = i;
                c.len += 1;
            }
        }
        c
    }

    fn as_slice(&self) -> &[usize] {
        &self.slots[..self.len]
    }

    fn remove(&mut self, i: usize) {
        if let Some(pos) = self.as_slice().iter().position(|&x| x == i) {
            self.slots.copy_within(pos + 1..self.len, pos);
            self.len -= 1;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Init,
    Scan { round: u8, k: usize },
    PivotToFront { pivot: usize },
    Partition,
    PassLeft,
    ShiftPivot,
    Recurse,
}

struct Quick {
    start: usize,
    end: Option<usize>,
    phase: Phase,
    candidates: Candidates,
    best: Option<(usize, Value)>,
    p: usize,
    x: usize,
}

impl Quick {
    fn range(start: usize, end: Option<usize>) -> Self {
        Self {
            start,
            end,
            phase: Phase::Init,
            candidates: Candidates::default(),
            best: None,
            p: 0,
            x: 0,
        }
    }
}

impl Task for Quick {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        loop {
            let end = *self.end.get_or_insert_with(|| cx.main_len());
            match self.phase {
                Phase::Init => {
                    if end.saturating_sub(self.start) < 2 {
                        return Ok(Step::Done);
                    }
                    let mid = (self.start + end) / 2;
                    self.candidates = Candidates::of(self.start, mid, end - 1);
                    self.best = None;
                    self.phase = Phase::Scan { round: 0, k: 0 };
                }
                Phase::Scan { round, k } => {
                    if let Some(&i) = self.candidates.as_slice().get(k) {
                        let v = cx.read(Addr::main(i))?;
                        if self.best.is_none_or(|(_, b)| v < b) {
                            self.best = Some((i, v));
                        }
                        self.phase = Phase::Scan { round, k: k + 1 };
                        return Ok(Step::Yield);
                    }
                    let (min, _) = self.best.take().unwrap_or((self.start, 0));
                    if round == 0 && self.candidates.len > 1 {
                        self.candidates.remove(min);
                        self.phase = Phase::Scan { round: 1, k: 0 };
                    } else {
                        self.phase = Phase::PivotToFront { pivot: min };
                    }
                }
                Phase::PivotToFront { pivot } => {
                    cx.swap(Addr::main(self.start), Addr::main(pivot))?;
                    self.p = self.start;
                    self.x = self.start + 1;
                    self.phase = Phase::Partition;
                    return Ok(Step::Yield);
                }
                Phase::Partition => {
                    if self.x >= end {
                        self.phase = Phase::Recurse;
                        continue;
                    }
                    if cx.compare(Addr::main(self.x), Relation::Lt, Addr::main(self.p))? {
                        self.phase = Phase::PassLeft;
                    } else {
                        self.x += 1;
                    }
                    return Ok(Step::Yield);
                }
                Phase::PassLeft => {
                    cx.swap(Addr::main(self.x), Addr::main(self.p + 1))?;
                    self.phase = Phase::ShiftPivot;
                    return Ok(Step::Yield);
                }
                Phase::ShiftPivot => {
                    cx.swap(Addr::main(self.p), Addr::main(self.p + 1))?;
                    self.p += 1;
                    self.x += 1;
                    self.phase = Phase::Partition;
                    return Ok(Step::Yield);
                }
                Phase::Recurse => {
                    let left = (self.start, self.p);
                    let right = (self.p + 1, end);
                    let (small, large) = if left.1 - left.0 <= right.1 - right.0 {
                        (left, right)
                    } else {
                        (right, left)
                    };
                    *self = Quick::range(large.0, Some(large.1));
                    if small.1 - small.0 >= 2 {
                        return Ok(Step::Call(Box::new(Quick::range(small.0, Some(small.1)))));
                    }
                }
            }
        }
    }
}
