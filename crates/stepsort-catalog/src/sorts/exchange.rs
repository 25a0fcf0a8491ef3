//! Adjacent- and gapped-exchange sorts.
//!
//! Each sort here is a [`Schedule`] of compare-exchanges driven by
//! [`CompareSwap`]; the schedule only decides which pair comes next and
//! when a pass without swaps ends the run. Circle Sort recurses through
//! child frames instead.

use stepsort_core::{Stage, StorageError};
use stepsort_task::{Algorithm, Step, Task, TaskContext};

use crate::kernels::{each, insertion_all, CompareSwap, Exchange, Schedule};

/// The exchange sorts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeSort {
    /// `n` full passes of adjacent exchanges.
    Bubble,
    /// Bubble with a shrinking bound that stops after a pass without swaps.
    OptimizedBubble,
    /// Alternating forward and backward passes, both ends shrinking.
    CocktailShaker,
    /// Cocktail shaker that stops after a round without swaps.
    OptimizedCocktailShaker,
    /// Odd-even transposition: even pairs, then odd pairs, until stable.
    OddEven,
    /// Bubble with a gap shrinking by a factor of 1.3.
    Comb,
    /// Every pair `(i, j)` with `i < j`.
    Exchange,
    /// Baiai: odd-even passes over a growing, then shrinking prefix.
    Baiai,
    /// Insertion by adjacent swaps.
    Insertion,
    /// Recursive circle sort, repeated until a round makes no swap.
    Circle,
    /// Circle sort with the recursion unrolled into levels.
    IterativeCircle,
}

impl ExchangeSort {
    /// Every exchange sort, in catalog order.
    pub const ALL: [ExchangeSort; 11] = [
        Self::Bubble,
        Self::OptimizedBubble,
        Self::CocktailShaker,
        Self::OptimizedCocktailShaker,
        Self::OddEven,
        Self::Comb,
        Self::Exchange,
        Self::Baiai,
        Self::Insertion,
        Self::Circle,
        Self::IterativeCircle,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bubble => "Bubble Sort",
            Self::OptimizedBubble => "Optimized Bubble Sort",
            Self::CocktailShaker => "Cocktail Shaker Sort",
            Self::OptimizedCocktailShaker => "Optimized Cocktail Shaker Sort",
            Self::OddEven => "Odd-Even Sort",
            Self::Comb => "Comb Sort",
            Self::Exchange => "Exchange Sort",
            Self::Baiai => "Baiai Sort",
            Self::Insertion => "Insertion Sort",
            Self::Circle => "Circle Sort",
            Self::IterativeCircle => "Iterative Circle Sort",
        }
    }
}

impl Algorithm for ExchangeSort {
    fn name(&self) -> &str {
        ExchangeSort::name(*self)
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        match *self {
            Self::Bubble => Box::new(CompareSwap::new(Bubble::new(false))),
            Self::OptimizedBubble => Box::new(CompareSwap::new(Bubble::new(true))),
            Self::CocktailShaker => Box::new(CompareSwap::new(Cocktail::new(false))),
            Self::OptimizedCocktailShaker => Box::new(CompareSwap::new(Cocktail::new(true))),
            Self::OddEven => Box::new(CompareSwap::new(OddEven::default())),
            Self::Comb => Box::new(CompareSwap::new(Comb::default())),
            Self::Exchange => Box::new(CompareSwap::new(AllPairs { i: 0, j: 1 })),
            Self::Baiai => Box::new(CompareSwap::new(Baiai::default())),
            Self::Insertion => Box::new(insertion_all()),
            Self::Circle => Box::new(Circle::default()),
            Self::IterativeCircle => Box::new(CompareSwap::new(IterativeCircle::default())),
        }
    }
}

// ── Schedules ───────────────────────────────────────────────────

struct Bubble {
    optimized: bool,
    pass: usize,
    j: usize,
    pass_swapped: bool,
}

impl Bubble {
    fn new(optimized: bool) -> Self {
        Self {
            optimized,
            pass: 0,
            j: 0,
            pass_swapped: false,
        }
    }
}

impl Schedule for Bubble {
    fn next(&mut self, n: usize, swapped: bool) -> Option<Exchange> {
        self.pass_swapped |= swapped;
        loop {
            if self.pass >= n {
                return None;
            }
            let bound = if self.optimized {
                n - self.pass - 1
            } else {
                n - 1
            };
            if self.j < bound {
                self.j += 1;
                return Some(Exchange::ascending(self.j - 1, self.j));
            }
            if self.optimized && !self.pass_swapped {
                return None;
            }
            self.pass += 1;
            self.j = 0;
            self.pass_swapped = false;
        }
    }
}

struct Cocktail {
    optimized: bool,
    pass: usize,
    backward: bool,
    j: usize,
    pass_swapped: bool,
}

impl Cocktail {
    fn new(optimized: bool) -> Self {
        Self {
            optimized,
            pass: 0,
            backward: false,
            j: 0,
            pass_swapped: false,
        }
    }
}

impl Schedule for Cocktail {
    fn next(&mut self, n: usize, swapped: bool) -> Option<Exchange> {
        self.pass_swapped |= swapped;
        loop {
            if self.pass >= n {
                return None;
            }
            let lo = self.pass;
            let hi = n - self.pass - 1;
            if !self.backward {
                if self.j < hi {
                    self.j += 1;
                    return Some(Exchange::ascending(self.j - 1, self.j));
                }
                self.backward = true;
                self.j = hi;
                continue;
            }
            if self.j > lo {
                self.j -= 1;
                return Some(Exchange::ascending(self.j, self.j + 1));
            }
            if self.optimized && !self.pass_swapped {
                return None;
            }
            self.pass += 1;
            self.backward = false;
            self.j = self.pass;
            self.pass_swapped = false;
        }
    }
}

#[derive(Default)]
struct OddEven {
    odd: bool,
    j: usize,
    round_swapped: bool,
}

impl Schedule for OddEven {
    fn next(&mut self, n: usize, swapped: bool) -> Option<Exchange> {
        self.round_swapped |= swapped;
        loop {
            if self.j + 1 < n {
                self.j += 2;
                return Some(Exchange::ascending(self.j - 2, self.j - 1));
            }
            if !self.odd {
                self.odd = true;
                self.j = 1;
                continue;
            }
            if !self.round_swapped {
                return None;
            }
            self.odd = false;
            self.j = 0;
            self.round_swapped = false;
        }
    }
}

#[derive(Default)]
struct Comb {
    gap: Option<usize>,
    i: usize,
    pass_swapped: bool,
}

impl Schedule for Comb {
    fn next(&mut self, n: usize, swapped: bool) -> Option<Exchange> {
        self.pass_swapped |= swapped;
        loop {
            let gap = *self.gap.get_or_insert_with(|| (n * 10 / 13).max(1));
            if self.i + gap < n {
                self.i += 1;
                return Some(Exchange::ascending(self.i - 1, self.i - 1 + gap));
            }
            if gap == 1 && !self.pass_swapped {
                return None;
            }
            self.gap = Some((gap * 10 / 13).max(1));
            self.i = 0;
            self.pass_swapped = false;
        }
    }
}

struct AllPairs {
    i: usize,
    j: usize,
}

impl Schedule for AllPairs {
    fn next(&mut self, n: usize, _swapped: bool) -> Option<Exchange> {
        loop {
            if self.i + 1 >= n {
                return None;
            }
            if self.j < n {
                self.j += 1;
                return Some(Exchange::ascending(self.i, self.j - 1));
            }
            self.i += 1;
            self.j = self.i + 1;
        }
    }
}

struct Baiai {
    end: usize,
    rising: bool,
    x: Option<usize>,
}

impl Default for Baiai {
    fn default() -> Self {
        Self {
            end: 2,
            rising: true,
            x: None,
        }
    }
}

impl Schedule for Baiai {
    fn next(&mut self, n: usize, _swapped: bool) -> Option<Exchange> {
        loop {
            if self.rising && self.end > n {
                self.rising = false;
                self.end = n.saturating_sub(1);
            }
            if !self.rising && self.end < 2 {
                return None;
            }
            let x = self.x.get_or_insert(self.end & 1);
            if *x + 1 < self.end {
                *x += 2;
                return Some(Exchange::ascending(*x - 2, *x - 1));
            }
            self.x = None;
            if self.rising {
                self.end += 1;
            } else {
                self.end -= 1;
            }
        }
    }
}

#[derive(Default)]
struct IterativeCircle {
    p: usize,
    len: usize,
    block: usize,
    i: usize,
    round_swapped: bool,
}

impl Schedule for IterativeCircle {
    fn next(&mut self, n: usize, swapped: bool) -> Option<Exchange> {
        if n < 2 {
            return None;
        }
        if self.p == 0 {
            self.p = n.next_power_of_two();
            self.len = self.p;
        }
        self.round_swapped |= swapped;
        loop {
            if self.len < 2 {
                if !self.round_swapped {
                    return None;
                }
                self.round_swapped = false;
                self.len = self.p;
                self.block = 0;
                self.i = 0;
                continue;
            }
            if self.block >= self.p / self.len {
                self.len /= 2;
                self.block = 0;
                self.i = 0;
                continue;
            }
            if self.i >= self.len / 2 {
                self.block += 1;
                self.i = 0;
                continue;
            }
            let start = self.block * self.len;
            let ex = Exchange::ascending(start + self.i, start + self.len - 1 - self.i);
            self.i += 1;
            return Some(ex);
        }
    }
}

// ── Recursive circle sort ───────────────────────────────────────

/// Repeats full circle rounds over the next power of two above `n`
/// until one makes no swap.
#[derive(Default)]
struct Circle {
    n: usize,
    started: bool,
}

impl Task for Circle {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if !self.started {
            self.started = true;
            self.n = cx.main_len();
        } else if cx.verdict() != Some(true) {
            return Ok(Step::Done);
        }
        if self.n < 2 {
            return Ok(Step::Done);
        }
        Ok(Step::Call(Box::new(CircleLevel::new(
            0,
            self.n.next_power_of_two(),
            self.n,
        ))))
    }
}

/// One circle of `[start, start + len)`: compare mirrored pairs, then
/// recurse into both halves. Reports whether anything swapped.
struct CircleLevel {
    start: usize,
    len: usize,
    n: usize,
    pc: u8,
    swapped: bool,
}

impl CircleLevel {
    fn new(start: usize, len: usize, n: usize) -> Self {
        Self {
            start,
            len,
            n,
            pc: 0,
            swapped: false,
        }
    }
}

impl Task for CircleLevel {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        if self.len < 2 || self.start >= self.n {
            return Ok(Step::Verdict(false));
        }
        self.swapped |= cx.verdict() == Some(true);
        let half = self.len / 2;
        let (start, len) = (self.start, self.len);
        self.pc += 1;
        Ok(match self.pc {
            1 => Step::Call(Box::new(each(
                (0..half).map(move |i| Exchange::ascending(start + i, start + len - 1 - i)),
            ))),
            2 => Step::Call(Box::new(CircleLevel::new(start, half, self.n))),
            3 => Step::Call(Box::new(CircleLevel::new(start + half, half, self.n))),
            _ => Step::Verdict(self.swapped),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Storage;

    fn sort(kind: ExchangeSort, values: Vec<i64>) -> Storage {
        let mut s = Storage::from_values(values);
        kind.run().drain_seeded(&mut s, 0).unwrap();
        s
    }

    #[test]
    fn optimized_bubble_on_sorted_input_is_one_pass() {
        let s = sort(ExchangeSort::OptimizedBubble, vec![1, 2, 3, 4, 5]);
        assert_eq!(s.stats().comparisons, 4);
        assert_eq!(s.stats().swaps, 0);
    }

    #[test]
    fn plain_bubble_runs_every_pass() {
        let s = sort(ExchangeSort::Bubble, vec![1, 2, 3, 4, 5]);
        assert_eq!(s.stats().comparisons, 20);
    }

    #[test]
    fn optimized_cocktail_on_sorted_input_is_one_round() {
        let s = sort(ExchangeSort::OptimizedCocktailShaker, vec![1, 2, 3, 4, 5]);
        assert_eq!(s.stats().comparisons, 8);
    }

    #[test]
    fn exchange_sort_compares_every_pair() {
        let s = sort(ExchangeSort::Exchange, vec![3, 1, 2, 0]);
        assert_eq!(s.main_array(), &[0, 1, 2, 3]);
        assert_eq!(s.stats().comparisons, 6);
    }

    #[test]
    fn circle_sorts_handle_non_powers_of_two() {
        for kind in [ExchangeSort::Circle, ExchangeSort::IterativeCircle] {
            for n in 0..24 {
                let values: Vec<i64> = (0..n).map(|i| (i * 7 % 11) as i64).collect();
                let s = sort(kind, values.clone());
                let mut expected = values;
                expected.sort_unstable();
                assert_eq!(s.main_array(), expected.as_slice(), "{} n={n}", kind.name());
            }
        }
    }

    #[test]
    fn every_exchange_sort_sorts_reversed_input() {
        for kind in ExchangeSort::ALL {
            let s = sort(kind, (0..17).rev().collect());
            assert_eq!(s.main_array(), (0..17).collect::<Vec<i64>>().as_slice(), "{}", kind.name());
        }
    }
}
