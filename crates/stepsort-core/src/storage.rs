//! The instrumented multi-array storage engine.
//!
//! Every primitive access goes through [`Storage`], which updates the
//! pointer set and the [`Statistics`] before returning. Algorithms never
//! touch array memory directly.

use crate::error::StorageError;
use crate::pointer::{Access, Addr, Pointers};
use crate::relation::Relation;
use crate::snapshot::Snapshot;
use crate::stats::Statistics;
use crate::Value;

/// Ordered set of arrays plus access instrumentation.
///
/// Array 0 (the main array) always exists. Scratch arrays are appended by
/// [`spawn_array`](Self::spawn_array) and removed by
/// [`delete_array`](Self::delete_array); removing array `k` shifts every
/// higher index down by one.
#[derive(Clone, Debug)]
pub struct Storage {
    arrays: Vec<Vec<Value>>,
    pointers: Pointers,
    stats: Statistics,
}

/// The identity permutation `[1, 2, ..., n]`.
fn identity(n: usize) -> Vec<Value> {
    (1..=n as Value).collect()
}

impl Storage {
    /// A storage engine whose main array is the identity permutation of
    /// length `main_len`.
    pub fn new(main_len: usize) -> Self {
        Self {
            arrays: vec![identity(main_len)],
            pointers: Pointers::new(),
            stats: Statistics::default(),
        }
    }

    /// A storage engine whose main array holds `values`.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            arrays: vec![values],
            pointers: Pointers::new(),
            stats: Statistics::default(),
        }
    }

    // ── Observation ─────────────────────────────────────────────

    /// Number of arrays, including the main array.
    pub fn array_count(&self) -> usize {
        self.arrays.len()
    }

    /// All arrays, main array first.
    pub fn arrays(&self) -> &[Vec<Value>] {
        &self.arrays
    }

    /// The array at `index`, if present.
    pub fn array(&self, index: usize) -> Option<&[Value]> {
        self.arrays.get(index).map(Vec::as_slice)
    }

    /// The main array.
    pub fn main_array(&self) -> &[Value] {
        &self.arrays[0]
    }

    /// Length of the main array.
    pub fn main_len(&self) -> usize {
        self.arrays[0].len()
    }

    /// Length of array `array`.
    pub fn len_of(&self, array: usize) -> Result<usize, StorageError> {
        self.arrays
            .get(array)
            .map(Vec::len)
            .ok_or(StorageError::NoSuchArray {
                array,
                array_count: self.arrays.len(),
            })
    }

    /// Addresses touched by the most recent operation.
    pub fn pointers(&self) -> &Pointers {
        &self.pointers
    }

    /// Counters since the last reset.
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Owned copy of arrays, pointers and statistics.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            arrays: self.arrays.clone(),
            pointers: self.pointers.clone(),
            stats: self.stats,
        }
    }

    // ── Primitive operations ────────────────────────────────────

    fn check(&self, at: Addr) -> Result<(), StorageError> {
        let len = self.len_of(at.array)?;
        if at.index >= len {
            return Err(StorageError::OutOfBounds {
                array: at.array,
                index: at.index,
                len,
            });
        }
        Ok(())
    }

    /// Read the value at `at`. Counts one read.
    pub fn read(&mut self, at: Addr) -> Result<Value, StorageError> {
        self.check(at)?;
        self.pointers.set_one(at, Access::Read);
        self.stats.reads += 1;
        Ok(self.arrays[at.array][at.index])
    }

    /// Store `value` at `at`. Counts one write.
    pub fn write(&mut self, value: Value, at: Addr) -> Result<(), StorageError> {
        self.check(at)?;
        self.pointers.set_one(at, Access::Write);
        self.stats.writes += 1;
        self.arrays[at.array][at.index] = value;
        Ok(())
    }

    /// Add `delta` to the value at `at`. Counts one write.
    pub fn increment(&mut self, delta: Value, at: Addr) -> Result<(), StorageError> {
        self.check(at)?;
        self.pointers.set_one(at, Access::Write);
        self.stats.writes += 1;
        let slot = &mut self.arrays[at.array][at.index];
        *slot = slot.wrapping_add(delta);
        Ok(())
    }

    /// Evaluate `value(a) <rel> value(b)`. Counts two reads and one
    /// comparison.
    pub fn compare(&mut self, a: Addr, rel: Relation, b: Addr) -> Result<bool, StorageError> {
        self.check(a)?;
        self.check(b)?;
        self.pointers.set_two(a, b, Access::Read);
        self.stats.reads += 2;
        self.stats.comparisons += 1;
        Ok(rel.holds(
            self.arrays[a.array][a.index],
            self.arrays[b.array][b.index],
        ))
    }

    /// Exchange the values at `a` and `b`. Counts one swap, two reads and
    /// two writes.
    pub fn swap(&mut self, a: Addr, b: Addr) -> Result<(), StorageError> {
        self.check(a)?;
        self.check(b)?;
        self.pointers.set_two(a, b, Access::Write);
        self.stats.swaps += 1;
        self.stats.reads += 2;
        self.stats.writes += 2;
        let va = self.arrays[a.array][a.index];
        let vb = self.arrays[b.array][b.index];
        self.arrays[a.array][a.index] = vb;
        self.arrays[b.array][b.index] = va;
        Ok(())
    }

    /// Append a zero-filled array of `size` elements and return its index.
    pub fn spawn_array(&mut self, size: usize) -> usize {
        self.arrays.push(vec![0; size]);
        self.stats.spawns += 1;
        self.arrays.len() - 1
    }

    /// Remove array `index`. Higher indices shift down by one.
    ///
    /// Clears the pointer set, since it may reference the removed array.
    pub fn delete_array(&mut self, index: usize) -> Result<(), StorageError> {
        if index == 0 {
            return Err(StorageError::ProtectedArray);
        }
        if index >= self.arrays.len() {
            return Err(StorageError::NoSuchArray {
                array: index,
                array_count: self.arrays.len(),
            });
        }
        self.arrays.remove(index);
        self.pointers.clear();
        self.stats.deletions += 1;
        Ok(())
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Restore the main array to `[1..N]`, drop scratch arrays, clear
    /// pointers and zero the statistics. `N` is the current main length.
    pub fn reset(&mut self) {
        let n = self.main_len();
        self.arrays.truncate(1);
        self.arrays[0] = identity(n);
        self.pointers.clear();
        self.stats = Statistics::default();
    }

    /// Rebuild the main array as `[1..n]` and reset.
    pub fn change_main_array_len(&mut self, n: usize) {
        self.arrays[0] = identity(n);
        self.reset();
    }

    /// Install `values` as the main array, drop scratch arrays, clear
    /// pointers and zero the statistics.
    pub fn load_main_array(&mut self, values: Vec<Value>) {
        self.arrays.truncate(1);
        self.arrays[0] = values;
        self.pointers.clear();
        self.stats = Statistics::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_is_identity() {
        let s = Storage::new(5);
        assert_eq!(s.main_array(), &[1, 2, 3, 4, 5]);
        assert_eq!(s.array_count(), 1);
        assert!(s.pointers().is_empty());
        assert_eq!(*s.stats(), Statistics::default());
    }

    #[test]
    fn read_and_write_count_once() {
        let mut s = Storage::new(3);
        assert_eq!(s.read(Addr::main(2)), Ok(3));
        s.write(9, Addr::main(0)).unwrap();
        assert_eq!(s.main_array(), &[9, 2, 3]);
        assert_eq!(s.stats().reads, 1);
        assert_eq!(s.stats().writes, 1);
        assert_eq!(s.pointers().access_at(Addr::main(0)), Some(Access::Write));
        assert_eq!(s.pointers().len(), 1);
    }

    #[test]
    fn compare_counts_two_reads_and_one_comparison() {
        let mut s = Storage::new(3);
        assert_eq!(s.compare(Addr::main(0), Relation::Lt, Addr::main(1)), Ok(true));
        assert_eq!(s.stats().reads, 2);
        assert_eq!(s.stats().comparisons, 1);
        assert_eq!(s.stats().writes, 0);
        assert_eq!(s.pointers().access_at(Addr::main(1)), Some(Access::Read));
    }

    #[test]
    fn swap_counts_per_rule() {
        let mut s = Storage::new(3);
        s.swap(Addr::main(0), Addr::main(2)).unwrap();
        assert_eq!(s.main_array(), &[3, 2, 1]);
        let st = s.stats();
        assert_eq!((st.swaps, st.reads, st.writes), (1, 2, 2));
    }

    #[test]
    fn increment_counts_as_write() {
        let mut s = Storage::new(2);
        s.increment(5, Addr::main(1)).unwrap();
        assert_eq!(s.main_array(), &[1, 7]);
        assert_eq!(s.stats().writes, 1);
    }

    #[test]
    fn swap_across_arrays() {
        let mut s = Storage::new(2);
        let aux = s.spawn_array(2);
        s.write(42, Addr::new(aux, 1)).unwrap();
        s.swap(Addr::main(0), Addr::new(aux, 1)).unwrap();
        assert_eq!(s.main_array(), &[42, 2]);
        assert_eq!(s.array(aux), Some(&[0, 1][..]));
    }

    #[test]
    fn spawn_returns_last_index_and_delete_shifts() {
        let mut s = Storage::new(4);
        let a = s.spawn_array(2);
        let b = s.spawn_array(3);
        assert_eq!((a, b), (1, 2));
        assert_eq!(s.array_count(), 3);
        s.read(Addr::new(b, 0)).unwrap();
        s.delete_array(a).unwrap();
        assert_eq!(s.array_count(), 2);
        assert_eq!(s.len_of(1), Ok(3));
        assert!(s.pointers().is_empty());
        assert_eq!((s.stats().spawns, s.stats().deletions), (2, 1));
    }

    #[test]
    fn main_array_is_protected() {
        let mut s = Storage::new(4);
        assert_eq!(s.delete_array(0), Err(StorageError::ProtectedArray));
        assert_eq!(
            s.delete_array(3),
            Err(StorageError::NoSuchArray {
                array: 3,
                array_count: 1
            })
        );
    }

    #[test]
    fn out_of_bounds_is_reported_and_not_counted() {
        let mut s = Storage::new(2);
        assert_eq!(
            s.read(Addr::main(2)),
            Err(StorageError::OutOfBounds {
                array: 0,
                index: 2,
                len: 2
            })
        );
        assert!(s.swap(Addr::main(0), Addr::new(4, 0)).is_err());
        assert_eq!(*s.stats(), Statistics::default());
        assert_eq!(s.main_array(), &[1, 2]);
    }

    #[test]
    fn change_len_rebuilds_identity() {
        let mut s = Storage::from_values(vec![5, 5]);
        s.spawn_array(1);
        s.change_main_array_len(4);
        assert_eq!(s.main_array(), &[1, 2, 3, 4]);
        assert_eq!(s.array_count(), 1);
        assert_eq!(s.stats().spawns, 0);
    }

    #[test]
    fn load_keeps_values() {
        let mut s = Storage::new(3);
        s.read(Addr::main(0)).unwrap();
        s.load_main_array(vec![3, 1, 2]);
        assert_eq!(s.main_array(), &[3, 1, 2]);
        assert_eq!(s.stats().reads, 0);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Read(usize),
        Write(i64, usize),
        Compare(usize, usize),
        Swap(usize, usize),
        Spawn(usize),
        Delete(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..12).prop_map(Op::Read),
            (-5i64..5, 0usize..12).prop_map(|(v, i)| Op::Write(v, i)),
            (0usize..12, 0usize..12).prop_map(|(a, b)| Op::Compare(a, b)),
            (0usize..12, 0usize..12).prop_map(|(a, b)| Op::Swap(a, b)),
            (0usize..4).prop_map(Op::Spawn),
            (0usize..4).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn reset_restores_identity(
            n in 0usize..10,
            ops in prop::collection::vec(op_strategy(), 0..40),
        ) {
            let mut s = Storage::new(n);
            for op in ops {
                let _ = match op {
                    Op::Read(i) => s.read(Addr::main(i)).map(|_| ()),
                    Op::Write(v, i) => s.write(v, Addr::main(i)),
                    Op::Compare(a, b) => s.compare(Addr::main(a), Relation::Le, Addr::main(b)).map(|_| ()),
                    Op::Swap(a, b) => s.swap(Addr::main(a), Addr::main(b)),
                    Op::Spawn(k) => { s.spawn_array(k); Ok(()) }
                    Op::Delete(k) => s.delete_array(k),
                };
            }
            s.reset();
            prop_assert_eq!(s.array_count(), 1);
            prop_assert_eq!(s.main_array().to_vec(), (1..=n as i64).collect::<Vec<_>>());
            prop_assert!(s.pointers().is_empty());
            prop_assert_eq!(*s.stats(), Statistics::default());
        }

        #[test]
        fn stats_never_decrease(ops in prop::collection::vec(op_strategy(), 0..40)) {
            let mut s = Storage::new(8);
            let mut last = *s.stats();
            for op in ops {
                let _ = match op {
                    Op::Read(i) => s.read(Addr::main(i)).map(|_| ()),
                    Op::Write(v, i) => s.write(v, Addr::main(i)),
                    Op::Compare(a, b) => s.compare(Addr::main(a), Relation::Gt, Addr::main(b)).map(|_| ()),
                    Op::Swap(a, b) => s.swap(Addr::main(a), Addr::main(b)),
                    Op::Spawn(k) => { s.spawn_array(k); Ok(()) }
                    Op::Delete(k) => s.delete_array(k),
                };
                prop_assert!(s.stats().dominates(&last));
                last = *s.stats();
            }
        }

        #[test]
        fn swaps_preserve_multiset(
            values in prop::collection::vec(-20i64..20, 1..16),
            pairs in prop::collection::vec((0usize..16, 0usize..16), 0..30),
        ) {
            let n = values.len();
            let mut s = Storage::from_values(values.clone());
            for (a, b) in pairs {
                s.swap(Addr::main(a % n), Addr::main(b % n)).unwrap();
            }
            let mut before = values;
            let mut after = s.main_array().to_vec();
            before.sort_unstable();
            after.sort_unstable();
            prop_assert_eq!(before, after);
        }
    }
}
