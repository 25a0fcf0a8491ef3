//! Merge sorts: out-of-place with one auxiliary array, and in place.

use std::fmt;
use std::str::FromStr;

use stepsort_core::{Addr, ConfigError, Relation, Stage, StorageError, Value};
use stepsort_task::{
    copy_array_slice, Algorithm, Chain, OptionSetting, OptionSpec, Step, Task, TaskContext,
};

use crate::kernels::insertion;

// ── Out of place ────────────────────────────────────────────────

/// Top-down merge sort.
///
/// Spawns one auxiliary array the size of the main array, merges each
/// pair of sorted halves into it and copies the result back. The
/// auxiliary array is deleted before the run finishes.
#[derive(Clone, Copy, Debug, Default)]
pub struct MergeSort;

impl Algorithm for MergeSort {
    fn name(&self) -> &str {
        "Merge Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(OutOfPlace { aux: None, sorted: false })
    }
}

struct OutOfPlace {
    aux: Option<usize>,
    sorted: bool,
}

impl Task for OutOfPlace {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        match (self.aux, self.sorted) {
            (None, false) => {
                self.aux = Some(cx.spawn_array(cx.main_len()));
                Ok(Step::Yield)
            }
            (Some(aux), false) => {
                self.sorted = true;
                Ok(Step::Call(Box::new(MergeRange::new(0, cx.main_len(), aux))))
            }
            (Some(aux), true) => {
                cx.delete_array(aux)?;
                self.aux = None;
                Ok(Step::Yield)
            }
            (None, true) => Ok(Step::Done),
        }
    }
}

/// Sorts `[start, end)`: both halves as children, then one merge.
struct MergeRange {
    start: usize,
    end: usize,
    aux: usize,
    pc: u8,
}

impl MergeRange {
    fn new(start: usize, end: usize, aux: usize) -> Self {
        Self {
            start,
            end,
            aux,
            pc: 0,
        }
    }

    fn mid(&self) -> usize {
        self.start + (self.end - self.start) / 2
    }
}

impl Task for MergeRange {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.end - self.start < 2 {
            return Ok(Step::Done);
        }
        let mid = self.mid();
        self.pc += 1;
        Ok(match self.pc {
            1 => Step::Call(Box::new(MergeRange::new(self.start, mid, self.aux))),
            2 => Step::Call(Box::new(MergeRange::new(mid, self.end, self.aux))),
            3 => Step::Call(Box::new(Merge::new(self.start, mid, self.end, self.aux))),
            _ => Step::Done,
        })
    }
}

#[derive(Clone, Copy, Debug)]
enum MergePhase {
    Compare,
    Read { from: usize },
    Write { value: Value },
    Tails,
    CopyBack,
    Done,
}

/// Merges the sorted runs `[start, mid)` and `[mid, end)` of the main
/// array through `aux`. Ties take from the left run.
struct Merge {
    start: usize,
    mid: usize,
    end: usize,
    aux: usize,
    left: usize,
    right: usize,
    out: usize,
    phase: MergePhase,
}

impl Merge {
    fn new(start: usize, mid: usize, end: usize, aux: usize) -> Self {
        Self {
            start,
            mid,
            end,
            aux,
            left: start,
            right: mid,
            out: start,
            phase: MergePhase::Compare,
        }
    }
}

impl Task for Merge {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        match self.phase {
            MergePhase::Compare => {
                if self.left >= self.mid || self.right >= self.end {
                    self.phase = MergePhase::Tails;
                    return self.resume(cx);
                }
                let left_first =
                    cx.compare(Addr::main(self.left), Relation::Le, Addr::main(self.right))?;
                let from = if left_first {
                    self.left += 1;
                    self.left - 1
                } else {
                    self.right += 1;
                    self.right - 1
                };
                self.phase = MergePhase::Read { from };
                Ok(Step::Yield)
            }
            MergePhase::Read { from } => {
                let value = cx.read(Addr::main(from))?;
                self.phase = MergePhase::Write { value };
                Ok(Step::Yield)
            }
            MergePhase::Write { value } => {
                cx.write(value, Addr::new(self.aux, self.out))?;
                self.out += 1;
                self.phase = MergePhase::Compare;
                Ok(Step::Yield)
            }
            MergePhase::Tails => {
                self.phase = MergePhase::CopyBack;
                let left = self.mid - self.left;
                let right = self.end - self.right;
                let mut parts: Vec<Box<dyn Task>> = Vec::with_capacity(2);
                if left > 0 {
                    parts.push(Box::new(copy_array_slice(0, self.left, self.aux, self.out, left)));
                }
                if right > 0 {
                    parts.push(Box::new(copy_array_slice(
                        0,
                        self.right,
                        self.aux,
                        self.out + left,
                        right,
                    )));
                }
                Ok(Step::Call(Box::new(Chain::new(parts))))
            }
            MergePhase::CopyBack => {
                self.phase = MergePhase::Done;
                Ok(Step::Call(Box::new(copy_array_slice(
                    self.aux,
                    self.start,
                    0,
                    self.start,
                    self.end - self.start,
                ))))
            }
            MergePhase::Done => Ok(Step::Done),
        }
    }
}

// ── In place ────────────────────────────────────────────────────

/// How [`InPlaceMergeSort`] combines two sorted halves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Combine {
    /// Insertion sort over the whole range.
    #[default]
    Insertion,
    /// Interleave the right half into the left, then insertion sort.
    Weave,
}

impl Combine {
    /// Accepted option values.
    pub const CHOICES: &'static [&'static str] = &["insertion", "weave"];

    /// Option value of this strategy.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insertion => "insertion",
            Self::Weave => "weave",
        }
    }
}

impl fmt::Display for Combine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Combine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insertion" => Ok(Self::Insertion),
            "weave" => Ok(Self::Weave),
            other => Err(ConfigError::InvalidMode {
                what: "merge combine strategy",
                mode: other.to_string(),
            }),
        }
    }
}

/// Declared option of [`InPlaceMergeSort`].
pub fn combine_option() -> OptionSpec {
    OptionSpec::choice("combine", "insertion", Combine::CHOICES)
}

/// Merge sort without auxiliary arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InPlaceMergeSort {
    /// Strategy for combining sorted halves.
    pub combine: Combine,
}

impl Algorithm for InPlaceMergeSort {
    fn name(&self) -> &str {
        "In-Place Merge Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(InPlace {
            start: 0,
            end: None,
            combine: self.combine,
            pc: 0,
        })
    }

    fn options(&self) -> Vec<OptionSetting> {
        vec![combine_option().setting(self.combine.as_str())]
    }
}

struct InPlace {
    start: usize,
    end: Option<usize>,
    combine: Combine,
    pc: u8,
}

impl InPlace {
    fn child(&self, start: usize, end: usize) -> Box<dyn Task> {
        Box::new(InPlace {
            start,
            end: Some(end),
            combine: self.combine,
            pc: 0,
        })
    }
}

impl Task for InPlace {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let end = *self.end.get_or_insert_with(|| cx.main_len());
        if end.saturating_sub(self.start) < 2 {
            return Ok(Step::Done);
        }
        let mid = self.start + (end - self.start) / 2;
        self.pc += 1;
        Ok(match self.pc {
            1 => Step::Call(self.child(self.start, mid)),
            2 => Step::Call(self.child(mid, end)),
            3 => Step::Call(match self.combine {
                Combine::Insertion => Box::new(insertion(self.start, end)),
                Combine::Weave => Box::new(Chain::new(vec![
                    Box::new(Weave::new(self.start, mid, end)),
                    Box::new(insertion(self.start, end)),
                ])),
            }),
            _ => Step::Done,
        })
    }
}

/// Slides the i-th element of `[mid, end)` left to position
/// `start + 2i + 1` by adjacent swaps, interleaving the halves.
struct Weave {
    src: usize,
    dst: usize,
    at: usize,
    end: usize,
}

impl Weave {
    fn new(start: usize, mid: usize, end: usize) -> Self {
        Self {
            src: mid,
            dst: start + 1,
            at: mid,
            end,
        }
    }
}

impl Task for Weave {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        loop {
            if self.src >= self.end || self.dst >= self.end {
                return Ok(Step::Done);
            }
            if self.at > self.dst {
                cx.swap(Addr::main(self.at), Addr::main(self.at - 1))?;
                self.at -= 1;
                return Ok(Step::Yield);
            }
            self.src += 1;
            self.dst += 2;
            self.at = self.src;
        }
    }
}
