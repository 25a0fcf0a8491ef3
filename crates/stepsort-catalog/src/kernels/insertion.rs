//! Insertion sort over a range, as an exchange schedule.

use super::exchange::{CompareSwap, Exchange, Schedule};

/// Sinks each element of `[start, end)` leftwards by adjacent swaps
/// until it is not smaller than its left neighbour.
pub struct InsertionSchedule {
    start: usize,
    end: Option<usize>,
    i: usize,
    j: usize,
}

impl Schedule for InsertionSchedule {
    fn next(&mut self, n: usize, swapped: bool) -> Option<Exchange> {
        let end = *self.end.get_or_insert(n);
        if swapped && self.j - 1 > self.start {
            self.j -= 1;
            return Some(Exchange::ascending(self.j - 1, self.j));
        }
        self.i += 1;
        self.j = self.i;
        if self.i >= end {
            return None;
        }
        Some(Exchange::ascending(self.j - 1, self.j))
    }
}

/// Insertion sort of main positions `[start, end)`.
pub fn insertion(start: usize, end: usize) -> CompareSwap<InsertionSchedule> {
    CompareSwap::new(InsertionSchedule {
        start,
        end: Some(end),
        i: start,
        j: start,
    })
}

/// Insertion sort of the whole main array.
pub fn insertion_all() -> CompareSwap<InsertionSchedule> {
    CompareSwap::new(InsertionSchedule {
        start: 0,
        end: None,
        i: 0,
        j: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Storage;
    use stepsort_task::StepSequence;

    #[test]
    fn sorts_only_the_range() {
        let mut s = Storage::from_values(vec![9, 5, 3, 4, 1, 0]);
        let mut seq = StepSequence::new(Box::new(insertion(1, 5)));
        seq.drain_seeded(&mut s, 0).unwrap();
        assert_eq!(s.main_array(), &[9, 1, 3, 4, 5, 0]);
    }

    #[test]
    fn sorted_input_takes_n_minus_one_compares() {
        let mut s = Storage::new(6);
        let mut seq = StepSequence::new(Box::new(insertion_all()));
        seq.drain_seeded(&mut s, 0).unwrap();
        assert_eq!(s.stats().comparisons, 5);
        assert_eq!(s.stats().swaps, 0);
    }

    #[test]
    fn empty_and_reversed_ranges() {
        let mut s = Storage::from_values(vec![4, 3, 2, 1]);
        let mut seq = StepSequence::new(Box::new(insertion(2, 2)));
        assert_eq!(seq.drain_seeded(&mut s, 0), Ok(0));
        let mut seq = StepSequence::new(Box::new(insertion_all()));
        seq.drain_seeded(&mut s, 0).unwrap();
        assert_eq!(s.main_array(), &[1, 2, 3, 4]);
        assert_eq!(s.stats().swaps, 6);
    }
}
