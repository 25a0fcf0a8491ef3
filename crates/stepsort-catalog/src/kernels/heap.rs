//! Binary heap kernels over a prefix of the main array.
//!
//! Shared by the heap sorts and the heap-layout shuffle. A max heap keeps
//! every parent not smaller than its children; a min heap the opposite.

use std::str::FromStr;

use stepsort_core::{Addr, ConfigError, Relation, StorageError};
use stepsort_task::{Step, Task, TaskContext};

/// Which end of the order sits at the root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Largest value at the root.
    #[default]
    Max,
    /// Smallest value at the root.
    Min,
}

impl Orientation {
    /// Option choices, in [`Orientation`] declaration order.
    pub const CHOICES: &'static [&'static str] = &["max", "min"];

    /// Relation under which a parent must be swapped with its child.
    pub fn out_of_order(self) -> Relation {
        match self {
            Self::Max => Relation::Lt,
            Self::Min => Relation::Gt,
        }
    }

    /// Relation under which the right child is strictly preferred to the
    /// left one.
    pub fn prefers(self) -> Relation {
        self.out_of_order().mirrored()
    }

    /// The option string of this orientation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

impl FromStr for Orientation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(ConfigError::InvalidMode {
                what: "heap orientation",
                mode: other.to_string(),
            }),
        }
    }
}

/// How the initial heap is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapifyStrategy {
    /// Insert elements one by one, bubbling each up toward the root.
    /// O(n log n).
    BubbleUp,
    /// Sift every internal node down, last parent first. O(n).
    SiftDown,
}

// ── Sift-down ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum SiftPhase {
    PickChild,
    CompareParent { child: usize },
    Swap { child: usize },
    Settled,
}

/// Moves the element at `index` toward the leaves of the heap occupying
/// `[0, end)` until heap order holds or it has no children.
pub struct SiftDown {
    orientation: Orientation,
    index: usize,
    end: usize,
    phase: SiftPhase,
}

impl SiftDown {
    /// Sift `index` down within `[0, end)`.
    pub fn new(orientation: Orientation, index: usize, end: usize) -> Self {
        Self {
            orientation,
            index,
            end,
            phase: SiftPhase::PickChild,
        }
    }
}

impl Task for SiftDown {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        loop {
            match self.phase {
                SiftPhase::PickChild => {
                    let left = 2 * self.index + 1;
                    if left >= self.end {
                        return Ok(Step::Done);
                    }
                    let right = left + 1;
                    if right < self.end {
                        let take_right =
                            cx.compare(Addr::main(right), self.orientation.prefers(), Addr::main(left))?;
                        let child = if take_right { right } else { left };
                        self.phase = SiftPhase::CompareParent { child };
                        return Ok(Step::Yield);
                    }
                    self.phase = SiftPhase::CompareParent { child: left };
                }
                SiftPhase::CompareParent { child } => {
                    let rel = self.orientation.out_of_order();
                    if cx.compare(Addr::main(self.index), rel, Addr::main(child))? {
                        self.phase = SiftPhase::Swap { child };
                        return Ok(Step::Yield);
                    }
                    self.phase = SiftPhase::Settled;
                    return Ok(Step::Yield);
                }
                SiftPhase::Swap { child } => {
                    cx.swap(Addr::main(self.index), Addr::main(child))?;
                    self.index = child;
                    self.phase = SiftPhase::PickChild;
                    return Ok(Step::Yield);
                }
                SiftPhase::Settled => return Ok(Step::Done),
            }
        }
    }
}

// ── Heapify ─────────────────────────────────────────────────────

/// Arranges the whole main array into a heap.
pub struct Heapify {
    orientation: Orientation,
    strategy: HeapifyStrategy,
    n: Option<usize>,
    // BubbleUp: next element to insert and its current position.
    // SiftDown: next parent to sift, counting down.
    next: usize,
    at: usize,
    swap_pending: bool,
}

impl Heapify {
    /// Heapify with the given orientation and strategy.
    pub fn new(orientation: Orientation, strategy: HeapifyStrategy) -> Self {
        Self {
            orientation,
            strategy,
            n: None,
            next: 0,
            at: 0,
            swap_pending: false,
        }
    }

    fn bubble_up(&mut self, n: usize, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.swap_pending {
            self.swap_pending = false;
            let parent = (self.at - 1) / 2;
            cx.swap(Addr::main(parent), Addr::main(self.at))?;
            self.at = parent;
            return Ok(Step::Yield);
        }
        if self.at == 0 {
            self.next += 1;
            if self.next >= n {
                return Ok(Step::Done);
            }
            self.at = self.next;
        }
        let parent = (self.at - 1) / 2;
        let rel = self.orientation.out_of_order();
        if cx.compare(Addr::main(parent), rel, Addr::main(self.at))? {
            self.swap_pending = true;
        } else {
            self.at = 0;
        }
        Ok(Step::Yield)
    }
}

impl Task for Heapify {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let n = match self.n {
            Some(n) => n,
            None => {
                let n = cx.main_len();
                self.n = Some(n);
                self.next = match self.strategy {
                    HeapifyStrategy::BubbleUp => 0,
                    HeapifyStrategy::SiftDown => n / 2,
                };
                n
            }
        };
        match self.strategy {
            HeapifyStrategy::BubbleUp => self.bubble_up(n, cx),
            HeapifyStrategy::SiftDown => {
                if self.next == 0 {
                    return Ok(Step::Done);
                }
                self.next -= 1;
                Ok(Step::Call(Box::new(SiftDown::new(
                    self.orientation,
                    self.next,
                    n,
                ))))
            }
        }
    }
}

// ── Extraction ──────────────────────────────────────────────────

/// Repeatedly moves the root of a heap over the whole main array to the
/// end of the shrinking heap. A max heap leaves the array ascending, a
/// min heap descending.
pub struct ExtractRoots {
    orientation: Orientation,
    end: Option<usize>,
    sift_next: bool,
}

impl ExtractRoots {
    /// Extraction for a heap of the given orientation.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            end: None,
            sift_next: false,
        }
    }
}

impl Task for ExtractRoots {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let end = self.end.get_or_insert_with(|| cx.main_len());
        if self.sift_next {
            self.sift_next = false;
            return Ok(Step::Call(Box::new(SiftDown::new(self.orientation, 0, *end))));
        }
        if *end <= 1 {
            return Ok(Step::Done);
        }
        *end -= 1;
        cx.swap(Addr::main(0), Addr::main(*end))?;
        self.sift_next = true;
        Ok(Step::Yield)
    }
}
