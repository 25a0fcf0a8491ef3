//! Every catalog sort, under every option choice, over the usual edge
//! cases.

use std::sync::Arc;

use proptest::prelude::*;
use stepsort_catalog::sorts::{Network, NetworkSort};
use stepsort_catalog::Catalog;
use stepsort_core::{Stage, Statistics, Storage, Value};
use stepsort_task::{Algorithm, Domain, OptionValue};
use stepsort_test_utils::{
    drain, drain_recording, edge_cases, init_tracing, is_ascending, same_multiset, shuffled,
    storage_with,
};

/// Networks only sort power-of-two lengths.
const NETWORK_LEN: usize = 16;
const GENERAL_LEN: usize = 13;
/// Bogo Sort stays on tiny inputs.
const BOGO_LEN: usize = 5;

fn is_network(name: &str) -> bool {
    Network::ALL.iter().any(|&n| NetworkSort(n).name() == name)
}

fn len_for(name: &str) -> usize {
    match name {
        "Bogo Sort" => BOGO_LEN,
        n if is_network(n) => NETWORK_LEN,
        _ => GENERAL_LEN,
    }
}

/// Each sort once per option value worth trying: every choice of a
/// choice option, and the bounds plus the default of a range option.
fn configurations(catalog: &Catalog) -> Vec<(&'static str, Vec<(&'static str, OptionValue)>)> {
    let mut out = Vec::new();
    for name in catalog.names(Stage::Sort) {
        out.push((name, Vec::new()));
        for spec in catalog.options(Stage::Sort, name).unwrap() {
            let values: Vec<OptionValue> = match spec.domain {
                Domain::Choices(choices) => choices.iter().map(|&c| OptionValue::from(c)).collect(),
                Domain::Range { min, .. } => vec![OptionValue::Int(min), OptionValue::Int(16)],
            };
            for value in values {
                out.push((name, vec![(spec.name, value)]));
            }
        }
    }
    out
}

fn verify(catalog: &Catalog, storage: &mut Storage) -> Option<bool> {
    drain(&*catalog.verifier(), storage, 0).unwrap().verdict
}

#[test]
fn every_configuration_sorts_every_edge_case() {
    init_tracing();
    let catalog = Catalog::standard();
    for (name, options) in configurations(&catalog) {
        let sort = catalog.build(Stage::Sort, name, &options).unwrap();
        for (case, values) in edge_cases(len_for(name), 17) {
            let mut storage = storage_with(&values);
            let report = drain(&*sort, &mut storage, 1).unwrap();
            let label = format!("{name} {options:?} on {case}");
            assert_eq!(report.verdict, None, "{label}");
            assert!(is_ascending(storage.main_array()), "{label}: {:?}", storage.main_array());
            assert!(same_multiset(storage.main_array(), &values), "{label}");
            assert_eq!(storage.array_count(), 1, "{label} leaked scratch");
            assert_eq!(
                storage.stats().spawns,
                storage.stats().deletions,
                "{label}"
            );
            assert_eq!(verify(&catalog, &mut storage), Some(true), "{label}");
        }
    }
}

#[test]
fn empty_and_singleton_inputs_cost_no_writes() {
    let catalog = Catalog::standard();
    for name in catalog.names(Stage::Sort) {
        let sort = catalog.build(Stage::Sort, name, &[]).unwrap();
        for values in [Vec::new(), vec![42]] {
            let mut storage = storage_with(&values);
            drain(&*sort, &mut storage, 0).unwrap();
            assert_eq!(storage.main_array(), values.as_slice(), "{name}");
            assert_eq!(storage.stats().swaps, 0, "{name}");
        }
    }
}

/// How one step changed the counters. Every step is exactly one
/// primitive operation, so only these shapes can occur.
fn one_operation(before: &Statistics, after: &Statistics) -> bool {
    let d = (
        after.reads - before.reads,
        after.writes - before.writes,
        after.comparisons - before.comparisons,
        after.swaps - before.swaps,
        after.spawns - before.spawns,
        after.deletions - before.deletions,
    );
    matches!(
        d,
        (1, 0, 0, 0, 0, 0)
            | (0, 1, 0, 0, 0, 0)
            | (2, 0, 1, 0, 0, 0)
            | (2, 2, 0, 1, 0, 0)
            | (0, 0, 0, 0, 1, 0)
            | (0, 0, 0, 0, 0, 1)
    )
}

#[test]
fn every_step_is_one_primitive_operation() {
    let catalog = Catalog::standard();
    for name in catalog.names(Stage::Sort) {
        let sort = catalog.build(Stage::Sort, name, &[]).unwrap();
        let values = shuffled(len_for(name), 3);
        let mut storage = storage_with(&values);
        let history = drain_recording(&*sort, &mut storage, 3).unwrap();
        assert!(history.len() > 1, "{name} took no steps");
        for (i, pair) in history.windows(2).enumerate() {
            assert!(pair[1].dominates(&pair[0]), "{name} step {i}");
            assert!(
                one_operation(&pair[0], &pair[1]),
                "{name} step {i}: {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn inputs_and_shuffles_step_once_per_operation_too() {
    let catalog = Catalog::standard();
    for stage in [Stage::Input, Stage::Shuffle] {
        for name in catalog.names(stage) {
            let algorithm = catalog.build(stage, name, &[]).unwrap();
            let mut storage = storage_with(&shuffled(24, 9));
            let history = drain_recording(&*algorithm, &mut storage, 9).unwrap();
            for pair in history.windows(2) {
                assert!(one_operation(&pair[0], &pair[1]), "{stage} {name}");
            }
            assert_eq!(storage.array_count(), 1, "{stage} {name}");
        }
    }
}

#[test]
fn divide_and_conquer_depth_stays_logarithmic() {
    let catalog = Catalog::standard();
    let n = 256usize;
    let bound = 3 * n.ilog2() as usize + 6;
    for name in [
        "Quick Sort",
        "Merge Sort",
        "In-Place Merge Sort",
        "Bitonic Sort",
        "Odd-Even Merge Sort",
        "Pairwise Sorting Network",
    ] {
        let sort = catalog.build(Stage::Sort, name, &[]).unwrap();
        for values in [(1..=n as Value).collect::<Vec<_>>(), shuffled(n, 4)] {
            let mut storage = storage_with(&values);
            let report = drain(&*sort, &mut storage, 4).unwrap();
            assert!(is_ascending(storage.main_array()), "{name}");
            assert!(
                report.max_depth <= bound,
                "{name} reached depth {} (bound {bound})",
                report.max_depth
            );
        }
    }
}

#[test]
fn runs_are_independent_of_each_other() {
    let catalog = Catalog::standard();
    let sort: Arc<dyn Algorithm> = catalog.build(Stage::Sort, "Comb Sort", &[]).unwrap();
    let values = shuffled(20, 8);
    let mut first = storage_with(&values);
    let mut second = storage_with(&values);
    let a = drain(&*sort, &mut first, 0).unwrap();
    let b = drain(&*sort, &mut second, 0).unwrap();
    assert_eq!(a, b);
    assert_eq!(first.snapshot(), second.snapshot());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn general_sorts_handle_arbitrary_values(
        values in prop::collection::vec(-1000i64..1000, 0..40),
        seed in any::<u64>(),
    ) {
        let catalog = Catalog::standard();
        for name in ["Quick Sort", "Optimized Heap Sort", "In-Place Merge Sort", "Square Root Sort", "Circle Sort"] {
            let sort = catalog.build(Stage::Sort, name, &[]).unwrap();
            let mut storage = storage_with(&values);
            drain(&*sort, &mut storage, seed).unwrap();
            prop_assert!(is_ascending(storage.main_array()), "{}", name);
            prop_assert!(same_multiset(storage.main_array(), &values), "{}", name);
        }
    }

    #[test]
    fn distribution_sorts_handle_non_negative_values(
        values in prop::collection::vec(0i64..500, 0..40),
    ) {
        let catalog = Catalog::standard();
        for name in ["Radix LSD Sort", "In-Place Radix LSD Sort", "Counting Sort", "Pigeonhole Sort", "Gravity Sort"] {
            let sort = catalog.build(Stage::Sort, name, &[]).unwrap();
            let mut storage = storage_with(&values);
            drain(&*sort, &mut storage, 0).unwrap();
            prop_assert!(is_ascending(storage.main_array()), "{}", name);
            prop_assert!(same_multiset(storage.main_array(), &values), "{}", name);
            prop_assert_eq!(storage.array_count(), 1);
        }
    }
}
