//! Point-in-time copies of storage state for observers.

use crate::pointer::Pointers;
use crate::stats::Statistics;
use crate::Value;

/// Owned copy of the storage engine taken between primitive operations.
///
/// Observers (renderers, audio, tests) read snapshots; they never hold a
/// reference into the live storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// All arrays, main array first.
    pub arrays: Vec<Vec<Value>>,
    /// Addresses touched by the last operation before the snapshot.
    pub pointers: Pointers,
    /// Counters at the time of the snapshot.
    pub stats: Statistics,
}

impl Snapshot {
    /// The main array.
    pub fn main_array(&self) -> &[Value] {
        self.arrays.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of arrays captured.
    pub fn array_count(&self) -> usize {
        self.arrays.len()
    }

    /// Whether the main array is in non-decreasing order.
    pub fn is_sorted(&self) -> bool {
        self.main_array().windows(2).all(|w| w[0] <= w[1])
    }
}
