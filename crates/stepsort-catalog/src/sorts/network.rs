//! Sorting networks: bitonic, pairwise and odd-even merge.
//!
//! Each network comes in up to three constructions: fully recursive,
//! an iterative outer loop over recursive merges ("IR"), and a single
//! flat comparator schedule. All of them assume a power-of-two length.
//! On other lengths comparators that fall outside the array are
//! skipped, so the run completes but the result may be unsorted.

use stepsort_core::{Stage, StorageError};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

use crate::kernels::{each, CompareSwap, Exchange, Schedule};

/// Which network and construction a [`NetworkSort`] runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    /// Batcher's bitonic sort, recursive.
    Bitonic,
    /// Bitonic merges of doubling width from an iterative loop.
    IrBitonic,
    /// Bitonic sort as one flat schedule.
    IterativeBitonic,
    /// Pairwise sorting network, recursive.
    Pairwise,
    /// Pairwise sorting network as one flat schedule.
    IterativePairwise,
    /// Batcher's odd-even merge sort, recursive.
    OddEvenMerge,
    /// Odd-even merges of doubling width from an iterative loop.
    IrOddEvenMerge,
    /// Odd-even merge sort as one flat schedule.
    IterativeOddEvenMerge,
}

impl Network {
    /// Every network, in catalog order.
    pub const ALL: [Network; 8] = [
        Self::Bitonic,
        Self::IrBitonic,
        Self::IterativeBitonic,
        Self::Pairwise,
        Self::IterativePairwise,
        Self::OddEvenMerge,
        Self::IrOddEvenMerge,
        Self::IterativeOddEvenMerge,
    ];
}

/// A sorting network sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkSort(pub Network);

impl NetworkSort {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self.0 {
            Network::Bitonic => "Bitonic Sort",
            Network::IrBitonic => "IR Bitonic Sort",
            Network::IterativeBitonic => "Iterative Bitonic Sort",
            Network::Pairwise => "Pairwise Sorting Network",
            Network::IterativePairwise => "Iterative Pairwise Sorting Network",
            Network::OddEvenMerge => "Odd-Even Merge Sort",
            Network::IrOddEvenMerge => "IR Odd-Even Merge Sort",
            Network::IterativeOddEvenMerge => "Iterative Odd-Even Merge Sort",
        }
    }
}

impl Algorithm for NetworkSort {
    fn name(&self) -> &str {
        NetworkSort::name(*self)
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        match self.0 {
            Network::Bitonic => Box::new(Whole::new(bitonic_root)),
            Network::IrBitonic => Box::new(Doubling::new(Merger::Bitonic)),
            Network::IterativeBitonic => Box::new(CompareSwap::new(IterativeBitonic::default())),
            Network::Pairwise => Box::new(Whole::new(pairwise_root)),
            Network::IterativePairwise => {
                Box::new(CompareSwap::new(IterativePairwise::default()))
            }
            Network::OddEvenMerge => Box::new(Whole::new(odd_even_root)),
            Network::IrOddEvenMerge => Box::new(Doubling::new(Merger::OddEven)),
            Network::IterativeOddEvenMerge => {
                Box::new(CompareSwap::new(IterativeOddEvenMerge::default()))
            }
        }
    }
}

/// Root that hands the main-array length to a recursive network.
struct Whole(Option<fn(usize) -> Box<dyn Task>>);

impl Whole {
    fn new(build: fn(usize) -> Box<dyn Task>) -> Self {
        Self(Some(build))
    }
}

impl Task for Whole {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        Ok(match self.0.take() {
            Some(build) => Step::Call(build(cx.main_len())),
            None => Step::Done,
        })
    }
}

fn bitonic_root(n: usize) -> Box<dyn Task> {
    Box::new(BitonicSort::new(0, n, true))
}

fn pairwise_root(n: usize) -> Box<dyn Task> {
    Box::new(PairwiseSort::new(0, n, 1))
}

fn odd_even_root(n: usize) -> Box<dyn Task> {
    Box::new(OddEvenSort::new(0, n))
}

// ── Bitonic ─────────────────────────────────────────────────────

/// Sorts `[start, start + len)` ascending when `up`: both halves in
/// opposite directions, then one bitonic merge.
struct BitonicSort {
    start: usize,
    len: usize,
    up: bool,
    pc: u8,
}

impl BitonicSort {
    fn new(start: usize, len: usize, up: bool) -> Self {
        Self {
            start,
            len,
            up,
            pc: 0,
        }
    }
}

impl Task for BitonicSort {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.len < 2 {
            return Ok(Step::Done);
        }
        let half = self.len / 2;
        self.pc += 1;
        Ok(match self.pc {
            1 => Step::Call(Box::new(BitonicSort::new(self.start, half, true))),
            2 => Step::Call(Box::new(BitonicSort::new(self.start + half, half, false))),
            3 => Step::Call(Box::new(BitonicMerge::new(self.start, self.len, self.up))),
            _ => Step::Done,
        })
    }
}

struct BitonicMerge {
    start: usize,
    len: usize,
    up: bool,
    pc: u8,
}

impl BitonicMerge {
    fn new(start: usize, len: usize, up: bool) -> Self {
        Self {
            start,
            len,
            up,
            pc: 0,
        }
    }
}

impl Task for BitonicMerge {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.len < 2 {
            return Ok(Step::Done);
        }
        let (start, half, up) = (self.start, self.len / 2, self.up);
        self.pc += 1;
        Ok(match self.pc {
            1 => Step::Call(Box::new(each(
                (start..start + half).map(move |i| Exchange::directed(i, i + half, up)),
            ))),
            2 => Step::Call(Box::new(BitonicMerge::new(start, half, up))),
            3 => Step::Call(Box::new(BitonicMerge::new(start + half, half, up))),
            _ => Step::Done,
        })
    }
}

/// The flat bitonic schedule.
struct IterativeBitonic {
    k: usize,
    j: usize,
    i: usize,
}

impl Default for IterativeBitonic {
    fn default() -> Self {
        Self { k: 2, j: 1, i: 0 }
    }
}

impl Schedule for IterativeBitonic {
    fn next(&mut self, n: usize, _swapped: bool) -> Option<Exchange> {
        loop {
            if self.k > n {
                return None;
            }
            if self.j == 0 {
                self.k *= 2;
                self.j = self.k / 2;
                self.i = 0;
                continue;
            }
            if self.i >= n {
                self.j /= 2;
                self.i = 0;
                continue;
            }
            let (i, l) = (self.i, self.i ^ self.j);
            self.i += 1;
            if l > i {
                return Some(Exchange::directed(i, l, i & self.k == 0));
            }
        }
    }
}

// ── Pairwise ────────────────────────────────────────────────────

/// Sorts the `amount` elements at `start, start + step, ...`.
struct PairwiseSort {
    start: usize,
    amount: usize,
    step: usize,
    pc: u8,
}

impl PairwiseSort {
    fn new(start: usize, amount: usize, step: usize) -> Self {
        Self {
            start,
            amount,
            step,
            pc: 0,
        }
    }
}

impl Task for PairwiseSort {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.amount < 2 {
            return Ok(Step::Done);
        }
        let (half, wide) = (self.amount / 2, self.step * 2);
        self.pc += 1;
        Ok(match self.pc {
            1 => Step::Call(Box::new(PairwiseSort::new(self.start, half, wide))),
            2 => Step::Call(Box::new(PairwiseSort::new(self.start + self.step, half, wide))),
            3 => Step::Call(Box::new(CompareSwap::new(PairwiseMerge::new(
                self.start,
                self.amount,
                self.step,
            )))),
            _ => Step::Done,
        })
    }
}

/// The pairwise network's merge: each element is compared against
/// partners at halving distances.
struct PairwiseMerge {
    idx: usize,
    end: usize,
    step: usize,
    b: usize,
    p: usize,
    inner: bool,
}

impl PairwiseMerge {
    fn new(start: usize, amount: usize, step: usize) -> Self {
        Self {
            idx: start,
            end: start + amount * step,
            step,
            b: 0,
            p: 0,
            inner: false,
        }
    }
}

impl Schedule for PairwiseMerge {
    fn next(&mut self, _n: usize, _swapped: bool) -> Option<Exchange> {
        loop {
            if !self.inner {
                if self.idx >= self.end {
                    return None;
                }
                let (mut b, mut p) = (self.idx, self.step);
                while b < self.end {
                    b += p;
                    p *= 2;
                }
                p /= 2;
                self.b = b - p;
                self.p = p;
                self.inner = true;
            }
            if self.b > self.idx && self.p > 0 {
                let ex = Exchange::ascending(self.idx, self.b);
                self.p /= 2;
                self.b = self.b.saturating_sub(self.p);
                return Some(ex);
            }
            self.idx += self.step;
            self.inner = false;
        }
    }
}

/// The flat pairwise schedule: a bottom-up pairing phase followed by a
/// merging phase at shrinking distances.
struct IterativePairwise {
    merging: bool,
    a: usize,
    b: usize,
    c: usize,
    d: usize,
    e: usize,
}

impl Default for IterativePairwise {
    fn default() -> Self {
        Self {
            merging: false,
            a: 1,
            b: 1,
            c: 0,
            d: 0,
            e: 0,
        }
    }
}

impl IterativePairwise {
    fn advance_b(&mut self) {
        self.c = (self.c + 1) % self.a;
        self.b += 1;
        if self.c == 0 {
            self.b += self.a;
        }
    }
}

impl Schedule for IterativePairwise {
    fn next(&mut self, n: usize, _swapped: bool) -> Option<Exchange> {
        loop {
            if !self.merging {
                if self.a < n {
                    if self.b < n {
                        let ex = Exchange::ascending(self.b - self.a, self.b);
                        self.advance_b();
                        return Some(ex);
                    }
                    self.a *= 2;
                    self.b = self.a;
                    self.c = 0;
                    continue;
                }
                self.merging = true;
                self.a /= 4;
                self.e = 1;
                self.d = 1;
                self.b = 2 * self.a;
                self.c = 0;
            }
            if self.a == 0 {
                return None;
            }
            if self.d == 0 {
                self.a /= 2;
                self.e = self.e * 2 + 1;
                self.d = self.e;
                self.b = (self.d + 1) * self.a;
                self.c = 0;
                continue;
            }
            if self.b < n {
                let ex = Exchange::ascending(self.b - self.d * self.a, self.b);
                self.advance_b();
                return Some(ex);
            }
            self.d /= 2;
            self.b = (self.d + 1) * self.a;
            self.c = 0;
        }
    }
}

// ── Odd-even merge ──────────────────────────────────────────────

/// Sorts `[start, start + amount)` with Batcher's odd-even merge sort.
struct OddEvenSort {
    start: usize,
    amount: usize,
    pc: u8,
}

impl OddEvenSort {
    fn new(start: usize, amount: usize) -> Self {
        Self {
            start,
            amount,
            pc: 0,
        }
    }
}

impl Task for OddEvenSort {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.amount < 2 {
            return Ok(Step::Done);
        }
        let half = self.amount / 2;
        self.pc += 1;
        Ok(match self.pc {
            1 => Step::Call(Box::new(OddEvenSort::new(self.start, half))),
            2 => Step::Call(Box::new(OddEvenSort::new(self.start + half, half))),
            3 => Step::Call(Box::new(OddEvenMerge::new(self.start, self.amount, 1))),
            _ => Step::Done,
        })
    }
}

/// Merges the elements at distance `r` within `[start, start + amount)`.
struct OddEvenMerge {
    start: usize,
    amount: usize,
    r: usize,
    pc: u8,
}

impl OddEvenMerge {
    fn new(start: usize, amount: usize, r: usize) -> Self {
        Self {
            start,
            amount,
            r,
            pc: 0,
        }
    }
}

impl Task for OddEvenMerge {
    fn resume(&mut self, _cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let (start, amount, r) = (self.start, self.amount, self.r);
        let m = r * 2;
        self.pc += 1;
        if m >= amount {
            return Ok(match self.pc {
                1 => Step::Call(Box::new(each([Exchange::ascending(start, start + r)]))),
                _ => Step::Done,
            });
        }
        Ok(match self.pc {
            1 => Step::Call(Box::new(OddEvenMerge::new(start, amount, m))),
            2 => Step::Call(Box::new(OddEvenMerge::new(start + r, amount, m))),
            3 => Step::Call(Box::new(each(
                (start + r..start + amount - r)
                    .step_by(m)
                    .map(move |i| Exchange::ascending(i, i + r)),
            ))),
            _ => Step::Done,
        })
    }
}

/// The flat odd-even merge schedule.
struct IterativeOddEvenMerge {
    p: usize,
    k: usize,
    j: usize,
    i: usize,
}

impl Default for IterativeOddEvenMerge {
    fn default() -> Self {
        Self {
            p: 1,
            k: 1,
            j: 0,
            i: 0,
        }
    }
}

impl Schedule for IterativeOddEvenMerge {
    fn next(&mut self, n: usize, _swapped: bool) -> Option<Exchange> {
        loop {
            if self.p >= n {
                return None;
            }
            if self.k == 0 {
                self.p *= 2;
                self.k = self.p;
                self.j = 0;
                self.i = 0;
                continue;
            }
            if self.j + self.k >= n {
                self.k /= 2;
                self.j = if self.k > 0 { self.k % self.p } else { 0 };
                self.i = 0;
                continue;
            }
            if self.i >= self.k.min(n - self.j - self.k) {
                self.j += 2 * self.k;
                self.i = 0;
                continue;
            }
            let (x, y) = (self.i + self.j, self.i + self.j + self.k);
            self.i += 1;
            if x / (2 * self.p) == y / (2 * self.p) {
                return Some(Exchange::ascending(x, y));
            }
        }
    }
}

// ── Doubling drivers ────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Merger {
    Bitonic,
    OddEven,
}

/// Runs merges of width 2, 4, 8, ... over consecutive blocks.
/// Bitonic blocks alternate direction so each wider block is bitonic.
struct Doubling {
    merger: Merger,
    width: usize,
    start: usize,
    block: usize,
}

impl Doubling {
    fn new(merger: Merger) -> Self {
        Self {
            merger,
            width: 2,
            start: 0,
            block: 0,
        }
    }
}

impl Task for Doubling {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let n = cx.main_len();
        loop {
            if self.width > n {
                return Ok(Step::Done);
            }
            if self.start >= n {
                self.width *= 2;
                self.start = 0;
                self.block = 0;
                continue;
            }
            let merge: Box<dyn Task> = match self.merger {
                Merger::Bitonic => Box::new(BitonicMerge::new(
                    self.start,
                    self.width,
                    self.block % 2 == 0,
                )),
                Merger::OddEven => Box::new(OddEvenMerge::new(self.start, self.width, 1)),
            };
            self.start += self.width;
            self.block += 1;
            return Ok(Step::Call(merge));
        }
    }
}
