//! Criterion micro-benchmarks for storage primitives and snapshots.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stepsort_bench::bench_values;
use stepsort_core::{Addr, Relation, Storage};

fn make_storage_16k() -> Storage {
    Storage::from_values(bench_values(16 * 1024, 1))
}

/// Sweep reads over the main array.
fn bench_read_sweep(c: &mut Criterion) {
    let mut storage = make_storage_16k();
    let n = storage.main_len();
    c.bench_function("read_sweep_16k", |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..n {
                sum = sum.wrapping_add(storage.read(Addr::main(i)).unwrap());
            }
            black_box(sum);
        });
    });
}

/// Compare-and-swap adjacent pairs, as one bubble pass does.
fn bench_compare_swap_pass(c: &mut Criterion) {
    let mut storage = make_storage_16k();
    let n = storage.main_len();
    c.bench_function("compare_swap_pass_16k", |b| {
        b.iter(|| {
            for i in 0..n - 1 {
                let (a, z) = (Addr::main(i), Addr::main(i + 1));
                if storage.compare(a, Relation::Gt, z).unwrap() {
                    storage.swap(a, z).unwrap();
                }
            }
        });
    });
}

/// Spawn, fill and delete one scratch array.
fn bench_scratch_lifecycle(c: &mut Criterion) {
    let mut storage = make_storage_16k();
    c.bench_function("scratch_lifecycle_1k", |b| {
        b.iter(|| {
            let aux = storage.spawn_array(1024);
            for i in 0..1024 {
                storage.write(i as i64, Addr::new(aux, i)).unwrap();
            }
            storage.delete_array(aux).unwrap();
        });
    });
}

/// Snapshot of a main array plus two scratch arrays.
fn bench_snapshot(c: &mut Criterion) {
    let mut storage = make_storage_16k();
    storage.spawn_array(4096);
    storage.spawn_array(4096);
    c.bench_function("snapshot_16k_plus_scratch", |b| {
        b.iter(|| {
            black_box(storage.snapshot());
        });
    });
}

criterion_group!(
    benches,
    bench_read_sweep,
    bench_compare_swap_pass,
    bench_scratch_lifecycle,
    bench_snapshot
);
criterion_main!(benches);
