//! Test utilities for stepsort development.
//!
//! Storage builders, sequence drivers that record per-step statistics,
//! value fixtures covering the usual edge cases, and the task fixtures
//! in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stepsort_core::{Statistics, Storage, StorageError, Value};
use stepsort_task::{Algorithm, StepSequence};

/// A storage engine whose main array holds `values`.
pub fn storage_with(values: &[Value]) -> Storage {
    Storage::from_values(values.to_vec())
}

/// The generator every test run uses for `seed`.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Install a `tracing` subscriber honouring `RUST_LOG`, writing through
/// the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// What draining one algorithm run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrainReport {
    pub steps: u64,
    pub max_depth: usize,
    pub verdict: Option<bool>,
}

/// Run `algorithm` to completion over `storage`.
pub fn drain(
    algorithm: &dyn Algorithm,
    storage: &mut Storage,
    seed: u64,
) -> Result<DrainReport, StorageError> {
    let mut seq = algorithm.run();
    let steps = seq.drain_seeded(storage, seed)?;
    Ok(DrainReport {
        steps,
        max_depth: seq.max_depth(),
        verdict: seq.verdict(),
    })
}

/// Run `algorithm` to completion, recording the statistics after every
/// step.
pub fn drain_recording(
    algorithm: &dyn Algorithm,
    storage: &mut Storage,
    seed: u64,
) -> Result<Vec<Statistics>, StorageError> {
    let mut seq: StepSequence = algorithm.run();
    let mut rng = seeded_rng(seed);
    let mut history = vec![*storage.stats()];
    loop {
        match seq.advance(storage, &mut rng) {
            Ok(()) => history.push(*storage.stats()),
            Err(stepsort_core::SequenceError::Exhausted) => return Ok(history),
            Err(stepsort_core::SequenceError::Storage(e)) => return Err(e),
        }
    }
}

/// Whether `a` and `b` hold the same multiset of values.
pub fn same_multiset(a: &[Value], b: &[Value]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Whether `values` is ascending.
pub fn is_ascending(values: &[Value]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// `1..=n` in a seeded random order.
pub fn shuffled(n: usize, seed: u64) -> Vec<Value> {
    let mut values: Vec<Value> = (1..=n as Value).collect();
    values.shuffle(&mut seeded_rng(seed));
    values
}

/// Named edge-case arrays of length about `n`: empty, singleton,
/// all-equal, sorted, reverse-sorted, random, and random with
/// duplicates.
pub fn edge_cases(n: usize, seed: u64) -> Vec<(&'static str, Vec<Value>)> {
    let sorted: Vec<Value> = (1..=n as Value).collect();
    let reversed: Vec<Value> = sorted.iter().rev().copied().collect();
    let duplicates: Vec<Value> = shuffled(n, seed).into_iter().map(|v| v / 3).collect();
    vec![
        ("empty", Vec::new()),
        ("singleton", vec![7]),
        ("all equal", vec![5; n]),
        ("sorted", sorted),
        ("reversed", reversed),
        ("random", shuffled(n, seed)),
        ("duplicates", duplicates),
    ]
}
