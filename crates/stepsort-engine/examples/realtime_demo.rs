//! stepsort RealtimeControl: a background control thread with a polling
//! observer.
//!
//! Demonstrates:
//!   1. Starting a RealtimeControl with a step delay
//!   2. Polling snapshots from the main thread at a different cadence
//!   3. Hot-swapping the sort mid-run
//!   4. Reading the run report and shutting down
//!
//! # Lockstep vs. Realtime
//!
//! A lockstep `Control` advances only when the caller calls `tick()`,
//! which is what tests use. A `RealtimeControl` ticks on its own thread,
//! so a slow observer never holds the algorithm back and a slow
//! algorithm never blocks the observer.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example realtime_demo

use std::thread;
use std::time::{Duration, Instant};

use stepsort_core::Stage;
use stepsort_engine::{ControlConfig, ControlState, RealtimeControl, Selection};
use stepsort_task::OptionValue;

// ─── Render a main array as a one-line bar chart ────────────────

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn sparkline(values: &[i64]) -> String {
    let max = values.iter().copied().max().unwrap_or(1).max(1);
    values
        .iter()
        .map(|&v| {
            let level = (v.max(0) * (BARS.len() as i64 - 1) / max) as usize;
            BARS[level]
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ControlConfig {
        main_array_len: 48,
        step_delay: Duration::from_micros(200),
        steps_per_tick: 4,
        seed: 7,
        shuffle: Selection::named("Swap Shuffle"),
        sort: Selection::named("Cocktail Shaker Sort"),
        ..Default::default()
    };
    let mut control = RealtimeControl::new(config)?;
    control.start()?;

    // ─── Observe at ~20 frames per second ───────────────────────

    let begin = Instant::now();
    let mut swapped = false;
    loop {
        let snap = control.snapshot();
        let stage = snap.stage.map_or("-".to_string(), |s| s.to_string());
        println!(
            "{:>7} {:>8} {} r={} w={} c={} s={}",
            stage,
            snap.steps,
            sparkline(snap.storage.main_array()),
            snap.storage.stats.reads,
            snap.storage.stats.writes,
            snap.storage.stats.comparisons,
            snap.storage.stats.swaps,
        );

        // Swap in a radix sort once the first sort is under way.
        if !swapped && snap.stage == Some(Stage::Sort) {
            control.select_sort("Radix LSD Sort", &[("base", OptionValue::Int(4))])?;
            swapped = true;
        }

        if snap.state == ControlState::Stopped && snap.last_report.is_some() {
            break;
        }
        if begin.elapsed() > Duration::from_secs(30) {
            println!("giving up after 30s");
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    // ─── Report ─────────────────────────────────────────────────

    if let Some(report) = control.snapshot().last_report.clone() {
        println!(
            "{} + {} + {}: passed={} steps={} spawns={} elapsed={:?}",
            report.input,
            report.shuffle,
            report.sort,
            report.passed(),
            report.total_steps(),
            report.stats.spawns,
            report.elapsed,
        );
    }

    let shutdown = control.shutdown();
    println!(
        "shutdown in {}ms after {} ticks",
        shutdown.total_ms, shutdown.ticks
    );
    Ok(())
}
