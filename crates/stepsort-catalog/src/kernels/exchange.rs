//! The compare-exchange driver.
//!
//! Most comparison sorts and every sorting network reduce to a sequence
//! of "compare these two positions, swap if out of order" operations.
//! A [`Schedule`] decides which pair comes next; [`CompareSwap`] performs
//! the compare and the conditional swap as separate steps and reports
//! back whether the swap happened.

use stepsort_core::{Addr, Relation, StorageError};
use stepsort_task::{Step, Task, TaskContext};

/// One compare-exchange: swap main positions `a` and `b` if
/// `value(a) <rel> value(b)` holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchange {
    /// First position.
    pub a: usize,
    /// Second position.
    pub b: usize,
    /// Relation that triggers the swap.
    pub rel: Relation,
}

impl Exchange {
    /// Order `a` before `b` ascending: swap if `a > b`.
    #[inline]
    pub fn ascending(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            rel: Relation::Gt,
        }
    }

    /// Order `a` before `b` ascending when `up`, descending otherwise.
    #[inline]
    pub fn directed(a: usize, b: usize, up: bool) -> Self {
        Self {
            a,
            b,
            rel: if up { Relation::Gt } else { Relation::Lt },
        }
    }
}

/// A source of compare-exchanges.
///
/// `n` is the main array length, fixed for the whole run. `swapped`
/// reports whether the previously returned exchange swapped (false on
/// the first call).
pub trait Schedule: Send {
    /// The next exchange, or `None` when the schedule is finished.
    fn next(&mut self, n: usize, swapped: bool) -> Option<Exchange>;
}

/// Adapts an iterator of exchanges that does not care about outcomes.
pub struct Pairs<I>(I);

impl<I> Schedule for Pairs<I>
where
    I: Iterator<Item = Exchange> + Send,
{
    fn next(&mut self, _n: usize, _swapped: bool) -> Option<Exchange> {
        self.0.next()
    }
}

/// A compare-exchange pass over a fixed list of pairs.
pub fn each<I>(pairs: I) -> CompareSwap<Pairs<I::IntoIter>>
where
    I: IntoIterator<Item = Exchange>,
    I::IntoIter: Send,
{
    CompareSwap::new(Pairs(pairs.into_iter()))
}

/// Drives a [`Schedule`], one compare or swap per step.
///
/// Pairs that fall outside the main array are skipped, as are pairs of a
/// position with itself. After finishing it returns
/// `Verdict(any swap happened)`, which recursive callers use to decide
/// whether to repeat.
pub struct CompareSwap<S> {
    schedule: S,
    n: Option<usize>,
    pending: Option<Exchange>,
    swapped: bool,
    any_swap: bool,
}

impl<S: Schedule> CompareSwap<S> {
    /// A driver for `schedule`.
    pub fn new(schedule: S) -> Self {
        Self {
            schedule,
            n: None,
            pending: None,
            swapped: false,
            any_swap: false,
        }
    }
}

impl<S: Schedule> Task for CompareSwap<S> {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let n = *self.n.get_or_insert_with(|| cx.main_len());
        if let Some(ex) = self.pending.take() {
            cx.swap(Addr::main(ex.a), Addr::main(ex.b))?;
            self.swapped = true;
            self.any_swap = true;
            return Ok(Step::Yield);
        }
        loop {
            let Some(ex) = self.schedule.next(n, self.swapped) else {
                return Ok(Step::Verdict(self.any_swap));
            };
            self.swapped = false;
            if ex.a >= n || ex.b >= n || ex.a == ex.b {
                continue;
            }
            if cx.compare(Addr::main(ex.a), ex.rel, Addr::main(ex.b))? {
                self.pending = Some(ex);
            }
            return Ok(Step::Yield);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Storage;
    use stepsort_task::StepSequence;

    #[test]
    fn swaps_only_out_of_order_pairs() {
        let mut s = Storage::from_values(vec![2, 1, 3]);
        let task = each([Exchange::ascending(0, 1), Exchange::ascending(1, 2)]);
        let mut seq = StepSequence::new(Box::new(task));
        assert_eq!(seq.drain_seeded(&mut s, 0), Ok(3));
        assert_eq!(s.main_array(), &[1, 2, 3]);
        assert_eq!(s.stats().comparisons, 2);
        assert_eq!(s.stats().swaps, 1);
        assert_eq!(seq.verdict(), Some(true));
    }

    #[test]
    fn out_of_range_pairs_are_skipped() {
        let mut s = Storage::from_values(vec![2, 1]);
        let task = each([
            Exchange::ascending(0, 5),
            Exchange::ascending(1, 1),
            Exchange::directed(0, 1, false),
        ]);
        let mut seq = StepSequence::new(Box::new(task));
        seq.drain_seeded(&mut s, 0).unwrap();
        assert_eq!(s.main_array(), &[2, 1]);
        assert_eq!(s.stats().comparisons, 1);
        assert_eq!(seq.verdict(), Some(false));
    }

    /// Repeats one pair until it stops swapping, counting reports.
    struct UntilStable {
        reports: Vec<bool>,
    }

    impl Schedule for UntilStable {
        fn next(&mut self, _n: usize, swapped: bool) -> Option<Exchange> {
            self.reports.push(swapped);
            (self.reports.len() < 4).then(|| Exchange::ascending(0, 1))
        }
    }

    #[test]
    fn schedule_sees_swap_outcome() {
        let mut s = Storage::from_values(vec![2, 1]);
        let mut cs = CompareSwap::new(UntilStable {
            reports: Vec::new(),
        });
        let mut rng = <rand_chacha::ChaCha8Rng as rand::SeedableRng>::seed_from_u64(0);
        loop {
            let mut cx = TaskContext::new(&mut s, &mut rng, None);
            if !matches!(cs.resume(&mut cx), Ok(Step::Yield)) {
                break;
            }
        }
        assert_eq!(cs.schedule.reports, vec![false, true, false, false]);
    }
}
