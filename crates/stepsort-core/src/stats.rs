//! Operation counters.

/// Counters of primitive operations since the last reset.
///
/// Counting rule: a read is one read; a write or increment is one write;
/// a compare is two reads and one comparison; a swap is two reads, two
/// writes and one swap. Spawning and deleting arrays count only as
/// spawns and deletions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Statistics {
    /// Element reads, including the reads implied by compares and swaps.
    pub reads: u64,
    /// Element writes, including the writes implied by swaps.
    pub writes: u64,
    /// Comparisons.
    pub comparisons: u64,
    /// Swaps.
    pub swaps: u64,
    /// Scratch arrays created.
    pub spawns: u64,
    /// Scratch arrays deleted.
    pub deletions: u64,
}

impl Statistics {
    /// Sum of reads and writes.
    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// True if no counter is smaller than in `earlier`.
    ///
    /// Holds between any two snapshots of one run taken in order.
    pub fn dominates(&self, earlier: &Statistics) -> bool {
        self.reads >= earlier.reads
            && self.writes >= earlier.writes
            && self.comparisons >= earlier.comparisons
            && self.swaps >= earlier.swaps
            && self.spawns >= earlier.spawns
            && self.deletions >= earlier.deletions
    }
}
