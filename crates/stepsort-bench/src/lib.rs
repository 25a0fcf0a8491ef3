//! Benchmark profiles for the stepsort engine.
//!
//! - [`reference_profile`]: a 1024-element run with a swap shuffle
//! - [`stress_profile`]: the same pipeline at 16K elements
//! - [`bench_values`]: a deterministic permutation for direct storage use

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stepsort_core::Value;
use stepsort_engine::{ControlConfig, Selection};

/// A 1024-element run of `sort` over a uniform-random input.
///
/// Steps per tick is high so tick overhead stays out of the measurement.
pub fn reference_profile(sort: &str, seed: u64) -> ControlConfig {
    ControlConfig {
        main_array_len: 1024,
        steps_per_tick: 4096,
        seed,
        input: Selection::named("Uniform Random"),
        shuffle: Selection::named("Swap Shuffle"),
        sort: Selection::named(sort),
        ..Default::default()
    }
}

/// Same pipeline as [`reference_profile`] at 16K elements.
pub fn stress_profile(sort: &str, seed: u64) -> ControlConfig {
    ControlConfig {
        main_array_len: 16 * 1024,
        ..reference_profile(sort, seed)
    }
}

/// `1..=n` in an order fixed by `seed`.
pub fn bench_values(n: usize, seed: u64) -> Vec<Value> {
    let mut values: Vec<Value> = (1..=n as Value).collect();
    values.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        assert!(reference_profile("Quick Sort", 0).validate().is_ok());
        assert!(stress_profile("Merge Sort", 0).validate().is_ok());
    }

    #[test]
    fn bench_values_are_a_permutation() {
        let mut v = bench_values(100, 3);
        assert_eq!(v, bench_values(100, 3));
        v.sort_unstable();
        assert_eq!(v, (1..=100).collect::<Vec<_>>());
    }
}
