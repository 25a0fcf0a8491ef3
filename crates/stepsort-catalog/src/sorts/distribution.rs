//! Distribution sorts: radix, pigeonhole, counting and gravity.
//!
//! None of these compare elements against each other to order them.
//! Radix and gravity assume non-negative values; pigeonhole and counting
//! assume the value range is small. Inputs outside those bounds give an
//! unsorted but well-formed result.

use stepsort_core::{Addr, Relation, Stage, StorageError, Value};
use stepsort_task::{copy_array, Algorithm, OptionSetting, OptionSpec, Step, Task, TaskContext};
use tracing::warn;

/// Largest value range pigeonhole and counting sort will allocate for.
pub const MAX_SPAN: usize = 1 << 20;

/// Declared option of both radix sorts.
pub fn base_option() -> OptionSpec {
    OptionSpec::range("base", 10, 2, 1024)
}

// ── Radix LSD ───────────────────────────────────────────────────

/// Where a radix pass puts the elements it distributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Counting pass through a copy array and a per-pass count array.
    #[default]
    Scratch,
    /// Rotate each element to its bucket by adjacent swaps.
    InPlace,
}

/// Least-significant-digit radix sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadixLsdSort {
    /// Digit base, 2..=1024.
    pub base: Value,
    /// How each pass moves elements.
    pub placement: Placement,
}

impl RadixLsdSort {
    /// Radix sort through auxiliary arrays.
    pub fn scratch(base: Value) -> Self {
        Self {
            base,
            placement: Placement::Scratch,
        }
    }

    /// Radix sort by rotation, without auxiliary arrays.
    pub fn in_place(base: Value) -> Self {
        Self {
            base,
            placement: Placement::InPlace,
        }
    }
}

impl Algorithm for RadixLsdSort {
    fn name(&self) -> &str {
        match self.placement {
            Placement::Scratch => "Radix LSD Sort",
            Placement::InPlace => "In-Place Radix LSD Sort",
        }
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        match self.placement {
            Placement::Scratch => Box::new(RadixScratch::new(self.base)),
            Placement::InPlace => Box::new(RadixInPlace::new(self.base)),
        }
    }

    fn options(&self) -> Vec<OptionSetting> {
        vec![base_option().setting(self.base)]
    }
}

/// Digit of `v` at `place`, and whether `v` has digits above it.
fn digit(v: Value, place: Value, base: Value) -> (usize, bool) {
    let d = (v / place).rem_euclid(base);
    let higher = place.checked_mul(base).is_some_and(|p| v / p != 0);
    (usize::try_from(d).unwrap_or(0), higher)
}

fn to_index(v: Value) -> usize {
    usize::try_from(v).unwrap_or(usize::MAX)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RadixPhase {
    SpawnCopy,
    SpawnCounts,
    Count,
    Prefix,
    Scatter,
    EndPass,
    Finish,
    Done,
}

struct RadixScratch {
    base: Value,
    place: Value,
    n: usize,
    copy: usize,
    counts: usize,
    more: bool,
    i: usize,
    sub: u8,
    held: Value,
    slot: usize,
    sum: Value,
    phase: RadixPhase,
}

impl RadixScratch {
    fn new(base: Value) -> Self {
        Self {
            base,
            place: 1,
            n: 0,
            copy: 0,
            counts: 0,
            more: false,
            i: 0,
            sub: 0,
            held: 0,
            slot: 0,
            sum: 0,
            phase: RadixPhase::SpawnCopy,
        }
    }

    fn enter(&mut self, phase: RadixPhase) {
        self.phase = phase;
        self.i = 0;
        self.sub = 0;
    }
}

impl Task for RadixScratch {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        loop {
            match self.phase {
                RadixPhase::SpawnCopy => {
                    self.n = cx.main_len();
                    self.copy = cx.spawn_array(self.n);
                    self.enter(RadixPhase::SpawnCounts);
                    return Ok(Step::Yield);
                }
                RadixPhase::SpawnCounts => {
                    self.counts = cx.spawn_array(to_index(self.base));
                    self.more = false;
                    self.enter(RadixPhase::Count);
                    return Ok(Step::Yield);
                }
                RadixPhase::Count => {
                    if self.i >= self.n {
                        self.sum = 0;
                        self.enter(RadixPhase::Prefix);
                        continue;
                    }
                    match self.sub {
                        0 => self.held = cx.read(Addr::main(self.i))?,
                        1 => cx.write(self.held, Addr::new(self.copy, self.i))?,
                        _ => {
                            let (d, higher) = digit(self.held, self.place, self.base);
                            self.more |= higher;
                            cx.increment(1, Addr::new(self.counts, d))?;
                            self.i += 1;
                            self.sub = 0;
                            return Ok(Step::Yield);
                        }
                    }
                    self.sub += 1;
                    return Ok(Step::Yield);
                }
                RadixPhase::Prefix => {
                    if self.i >= to_index(self.base) {
                        self.enter(RadixPhase::Scatter);
                        continue;
                    }
                    if self.sub == 0 {
                        self.held = cx.read(Addr::new(self.counts, self.i))?;
                        self.sub = 1;
                    } else {
                        cx.write(self.sum, Addr::new(self.counts, self.i))?;
                        self.sum += self.held;
                        self.i += 1;
                        self.sub = 0;
                    }
                    return Ok(Step::Yield);
                }
                RadixPhase::Scatter => {
                    if self.i >= self.n {
                        self.phase = RadixPhase::EndPass;
                        continue;
                    }
                    match self.sub {
                        0 => {
                            self.held = cx.read(Addr::new(self.copy, self.i))?;
                            self.slot = digit(self.held, self.place, self.base).0;
                        }
                        1 => self.sum = cx.read(Addr::new(self.counts, self.slot))?,
                        2 => cx.write(self.held, Addr::main(to_index(self.sum)))?,
                        _ => {
                            cx.increment(1, Addr::new(self.counts, self.slot))?;
                            self.i += 1;
                            self.sub = 0;
                            return Ok(Step::Yield);
                        }
                    }
                    self.sub += 1;
                    return Ok(Step::Yield);
                }
                RadixPhase::EndPass => {
                    cx.delete_array(self.counts)?;
                    match self.place.checked_mul(self.base) {
                        Some(next) if self.more => {
                            self.place = next;
                            self.phase = RadixPhase::SpawnCounts;
                        }
                        _ => self.phase = RadixPhase::Finish,
                    }
                    return Ok(Step::Yield);
                }
                RadixPhase::Finish => {
                    cx.delete_array(self.copy)?;
                    self.phase = RadixPhase::Done;
                    return Ok(Step::Yield);
                }
                RadixPhase::Done => return Ok(Step::Done),
            }
        }
    }
}

/// Each pass takes the element at position 0 and rotates it to the end
/// of its bucket, so after `n` takes the array is bucketed by digit.
struct RadixInPlace {
    base: Value,
    place: Value,
    n: Option<usize>,
    ends: Vec<usize>,
    more: bool,
    taken: usize,
    at: usize,
    until: usize,
}

impl RadixInPlace {
    fn new(base: Value) -> Self {
        Self {
            base,
            place: 1,
            n: None,
            ends: Vec::new(),
            more: false,
            taken: 0,
            at: 0,
            until: 0,
        }
    }

    fn begin_pass(&mut self, n: usize) {
        self.ends = vec![n; to_index(self.base)];
        self.more = false;
        self.taken = 0;
    }
}

impl Task for RadixInPlace {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        let n = match self.n {
            Some(n) => n,
            None => {
                let n = cx.main_len();
                self.n = Some(n);
                self.begin_pass(n);
                n
            }
        };
        loop {
            if self.at < self.until {
                cx.swap(Addr::main(self.at), Addr::main(self.at + 1))?;
                self.at += 1;
                return Ok(Step::Yield);
            }
            if self.taken < n {
                let v = cx.read(Addr::main(0))?;
                let (d, higher) = digit(v, self.place, self.base);
                self.more |= higher;
                for end in &mut self.ends[..d] {
                    *end = end.saturating_sub(1);
                }
                self.at = 0;
                self.until = self.ends[d].saturating_sub(1);
                self.taken += 1;
                return Ok(Step::Yield);
            }
            match self.place.checked_mul(self.base) {
                Some(next) if self.more => {
                    self.place = next;
                    self.begin_pass(n);
                }
                _ => return Ok(Step::Done),
            }
        }
    }
}

// ── Pigeonhole and counting ─────────────────────────────────────

/// Scans the main array for the positions of its minimum and maximum,
/// one comparison per call.
#[derive(Default)]
struct Extremes {
    i: usize,
    min_at: usize,
    max_at: usize,
    max_turn: bool,
}

impl Extremes {
    fn new() -> Self {
        Self {
            i: 1,
            ..Self::default()
        }
    }

    /// One comparison, or `false` once the scan is complete.
    fn advance(&mut self, cx: &mut TaskContext<'_>, n: usize) -> Result<bool, StorageError> {
        if self.i >= n {
            return Ok(false);
        }
        if self.max_turn {
            if cx.compare(Addr::main(self.max_at), Relation::Lt, Addr::main(self.i))? {
                self.max_at = self.i;
            }
            self.i += 1;
        } else if cx.compare(Addr::main(self.i), Relation::Lt, Addr::main(self.min_at))? {
            self.min_at = self.i;
        }
        self.max_turn = !self.max_turn;
        Ok(true)
    }
}

/// Number of distinct values in `[min, max]`, if small enough to allocate.
fn span(algorithm: &str, min: Value, max: Value) -> Option<usize> {
    let span = max
        .checked_sub(min)
        .and_then(|d| usize::try_from(d).ok())
        .and_then(|d| d.checked_add(1))
        .filter(|&d| d <= MAX_SPAN);
    if span.is_none() {
        warn!(algorithm, min, max, "value range too wide, leaving array unsorted");
    }
    span
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TallyPhase {
    Scan,
    ReadMin,
    ReadMax,
    SpawnCounts,
    SpawnOutput,
    Count,
    Prefix,
    Scatter,
    CopyBack,
    DeleteOutput,
    DeleteCounts,
    Expand,
    Done,
}

/// Shared state machine of [`PigeonholeSort`] and [`CountingSort`].
///
/// Both scan for the value range and tally every value into a count
/// array. Pigeonhole then rewrites the main array hole by hole; counting
/// sort turns the tallies into offsets and scatters into an output array.
struct Tally {
    name: &'static str,
    stable: bool,
    n: usize,
    scan: Extremes,
    min: Value,
    max: Value,
    counts: usize,
    output: usize,
    i: usize,
    sub: u8,
    held: Value,
    acc: Value,
    out: usize,
    phase: TallyPhase,
}

impl Tally {
    fn new(name: &'static str, stable: bool) -> Self {
        Self {
            name,
            stable,
            n: 0,
            scan: Extremes::new(),
            min: 0,
            max: 0,
            counts: 0,
            output: 0,
            i: 0,
            sub: 0,
            held: 0,
            acc: 0,
            out: 0,
            phase: TallyPhase::Scan,
        }
    }

    fn enter(&mut self, phase: TallyPhase) {
        self.phase = phase;
        self.i = 0;
        self.sub = 0;
        self.acc = 0;
    }

    fn slot(&self, v: Value) -> Addr {
        Addr::new(self.counts, to_index(v.wrapping_sub(self.min)))
    }
}

impl Task for Tally {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        loop {
            match self.phase {
                TallyPhase::Scan => {
                    self.n = cx.main_len();
                    if self.n < 2 {
                        return Ok(Step::Done);
                    }
                    if self.scan.advance(cx, self.n)? {
                        return Ok(Step::Yield);
                    }
                    self.phase = TallyPhase::ReadMin;
                }
                TallyPhase::ReadMin => {
                    self.min = cx.read(Addr::main(self.scan.min_at))?;
                    self.phase = TallyPhase::ReadMax;
                    return Ok(Step::Yield);
                }
                TallyPhase::ReadMax => {
                    self.max = cx.read(Addr::main(self.scan.max_at))?;
                    self.phase = TallyPhase::SpawnCounts;
                    return Ok(Step::Yield);
                }
                TallyPhase::SpawnCounts => {
                    let Some(len) = span(self.name, self.min, self.max) else {
                        return Ok(Step::Done);
                    };
                    self.counts = cx.spawn_array(len);
                    self.phase = if self.stable {
                        TallyPhase::SpawnOutput
                    } else {
                        TallyPhase::Count
                    };
                    return Ok(Step::Yield);
                }
                TallyPhase::SpawnOutput => {
                    self.output = cx.spawn_array(self.n);
                    self.enter(TallyPhase::Count);
                    return Ok(Step::Yield);
                }
                TallyPhase::Count => {
                    if self.i >= self.n {
                        let next = if self.stable {
                            TallyPhase::Prefix
                        } else {
                            TallyPhase::Expand
                        };
                        self.enter(next);
                        continue;
                    }
                    if self.sub == 0 {
                        self.held = cx.read(Addr::main(self.i))?;
                        self.sub = 1;
                    } else {
                        cx.increment(1, self.slot(self.held))?;
                        self.i += 1;
                        self.sub = 0;
                    }
                    return Ok(Step::Yield);
                }
                TallyPhase::Prefix => {
                    let holes = to_index(self.max - self.min) + 1;
                    if self.i >= holes {
                        self.enter(TallyPhase::Scatter);
                        continue;
                    }
                    if self.sub == 0 {
                        self.held = cx.read(Addr::new(self.counts, self.i))?;
                        self.sub = 1;
                    } else {
                        cx.write(self.acc, Addr::new(self.counts, self.i))?;
                        self.acc += self.held;
                        self.i += 1;
                        self.sub = 0;
                    }
                    return Ok(Step::Yield);
                }
                TallyPhase::Scatter => {
                    if self.i >= self.n {
                        self.phase = TallyPhase::CopyBack;
                        continue;
                    }
                    match self.sub {
                        0 => self.held = cx.read(Addr::main(self.i))?,
                        1 => self.acc = cx.read(self.slot(self.held))?,
                        2 => cx.write(self.held, Addr::new(self.output, to_index(self.acc)))?,
                        _ => {
                            cx.increment(1, self.slot(self.held))?;
                            self.i += 1;
                            self.sub = 0;
                            return Ok(Step::Yield);
                        }
                    }
                    self.sub += 1;
                    return Ok(Step::Yield);
                }
                TallyPhase::CopyBack => {
                    self.phase = TallyPhase::DeleteOutput;
                    return Ok(Step::Call(Box::new(copy_array(self.output, 0))));
                }
                TallyPhase::DeleteOutput => {
                    cx.delete_array(self.output)?;
                    self.phase = TallyPhase::DeleteCounts;
                    return Ok(Step::Yield);
                }
                TallyPhase::Expand => {
                    let holes = to_index(self.max - self.min) + 1;
                    if self.acc > 0 {
                        cx.write(self.min + self.i as Value - 1, Addr::main(self.out))?;
                        self.out += 1;
                        self.acc -= 1;
                        return Ok(Step::Yield);
                    }
                    if self.i >= holes {
                        self.phase = TallyPhase::DeleteCounts;
                        continue;
                    }
                    self.acc = cx.read(Addr::new(self.counts, self.i))?;
                    self.i += 1;
                    return Ok(Step::Yield);
                }
                TallyPhase::DeleteCounts => {
                    cx.delete_array(self.counts)?;
                    self.phase = TallyPhase::Done;
                    return Ok(Step::Yield);
                }
                TallyPhase::Done => return Ok(Step::Done),
            }
        }
    }
}

/// Tallies each value into its hole, then writes the holes back in
/// order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PigeonholeSort;

impl Algorithm for PigeonholeSort {
    fn name(&self) -> &str {
        "Pigeonhole Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Tally::new("Pigeonhole Sort", false))
    }
}

/// Stable counting sort through a count array and an output array.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountingSort;

impl Algorithm for CountingSort {
    fn name(&self) -> &str {
        "Counting Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Tally::new("Counting Sort", true))
    }
}

// ── Gravity ─────────────────────────────────────────────────────

/// Bead sort.
///
/// Works from the top row of beads down: every element at least as tall
/// as the row loses its bead, and that many beads are added back to the
/// rightmost elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct GravitySort;

impl Algorithm for GravitySort {
    fn name(&self) -> &str {
        "Gravity Sort"
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        Box::new(Gravity {
            n: 0,
            heights: 0,
            phase: GravityPhase::Spawn,
            i: 0,
            row: 0,
            beads: 0,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GravityPhase {
    Spawn,
    Copy,
    Tallest,
    Lift,
    Take,
    Drop,
    Delete,
    Done,
}

struct Gravity {
    n: usize,
    heights: usize,
    phase: GravityPhase,
    i: usize,
    row: Value,
    beads: usize,
}

impl Task for Gravity {
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
        loop {
            match self.phase {
                GravityPhase::Spawn => {
                    self.n = cx.main_len();
                    self.heights = cx.spawn_array(self.n);
                    self.phase = GravityPhase::Copy;
                    return Ok(Step::Yield);
                }
                GravityPhase::Copy => {
                    self.phase = GravityPhase::Tallest;
                    self.i = 0;
                    return Ok(Step::Call(Box::new(copy_array(0, self.heights))));
                }
                GravityPhase::Tallest => {
                    if self.i < self.n {
                        let v = cx.read(Addr::new(self.heights, self.i))?;
                        self.row = self.row.max(v);
                        self.i += 1;
                        return Ok(Step::Yield);
                    }
                    self.i = 0;
                    self.beads = 0;
                    self.phase = GravityPhase::Lift;
                }
                GravityPhase::Lift => {
                    if self.row <= 0 {
                        self.phase = GravityPhase::Delete;
                        continue;
                    }
                    if self.i >= self.n {
                        self.i = self.n;
                        self.phase = GravityPhase::Drop;
                        continue;
                    }
                    let v = cx.read(Addr::new(self.heights, self.i))?;
                    if self.row <= v {
                        self.phase = GravityPhase::Take;
                    } else {
                        self.i += 1;
                    }
                    return Ok(Step::Yield);
                }
                GravityPhase::Take => {
                    cx.increment(-1, Addr::main(self.i))?;
                    self.beads += 1;
                    self.i += 1;
                    self.phase = GravityPhase::Lift;
                    return Ok(Step::Yield);
                }
                GravityPhase::Drop => {
                    if self.beads > 0 {
                        self.i -= 1;
                        self.beads -= 1;
                        cx.increment(1, Addr::main(self.i))?;
                        return Ok(Step::Yield);
                    }
                    self.row -= 1;
                    self.i = 0;
                    self.phase = GravityPhase::Lift;
                }
                GravityPhase::Delete => {
                    cx.delete_array(self.heights)?;
                    self.phase = GravityPhase::Done;
                    return Ok(Step::Yield);
                }
                GravityPhase::Done => return Ok(Step::Done),
            }
        }
    }
}
