//! stepsort: an instrumented, single-step-resumable execution engine for
//! array algorithms.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the stepsort sub-crates. For most users, adding `stepsort` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use stepsort::prelude::*;
//!
//! let config = ControlConfig {
//!     main_array_len: 32,
//!     steps_per_tick: 16,
//!     seed: 42,
//!     sort: Selection::named("Quick Sort"),
//!     ..Default::default()
//! };
//! let mut control = Control::new(config).unwrap();
//! control.start();
//! let report = loop {
//!     if let TickOutcome::Finished(report) = control.tick().unwrap() {
//!         break report;
//!     }
//! };
//! assert!(report.passed());
//! assert_eq!(report.steps(Stage::Input), 32);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `stepsort-core` | Storage engine, statistics, pointers, errors |
//! | [`task`] | `stepsort-task` | `Task`/`Algorithm` contract, step sequences, options |
//! | [`catalog`] | `stepsort-catalog` | Inputs, shuffles, sorts, the verifier and the registry |
//! | [`engine`] | `stepsort-engine` | Pipeline, lockstep and realtime controls |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Storage engine and core types (`stepsort-core`).
///
/// [`types::Storage`] counts every primitive operation into
/// [`types::Statistics`] and records the [`types::Pointers`] it touched.
pub use stepsort_core as types;

/// The task contract (`stepsort-task`).
///
/// Implement [`task::Task`] for a resumable frame and
/// [`task::Algorithm`] for a configured algorithm that starts a fresh
/// [`task::StepSequence`] on every run.
pub use stepsort_task as task;

/// Algorithm catalog (`stepsort-catalog`).
pub use stepsort_catalog as catalog;

/// Pipelines and controls (`stepsort-engine`).
///
/// [`engine::Control`] for caller-driven ticking,
/// [`engine::RealtimeControl`] for a background control thread.
pub use stepsort_engine as engine;

/// Common imports for typical stepsort usage.
///
/// ```rust
/// use stepsort::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use stepsort_core::{Addr, Relation, Snapshot, Stage, Statistics, Storage, Value};

    // Errors
    pub use stepsort_core::{ConfigError, SequenceError, StorageError};

    // Task contract
    pub use stepsort_task::{Algorithm, OptionValue, Step, StepSequence, Task, TaskContext};

    // Catalog
    pub use stepsort_catalog::{Catalog, Entry};

    // Engine
    pub use stepsort_engine::{
        Control, ControlConfig, ControlSnapshot, ControlState, RealtimeControl, RunReport,
        Selection, ShutdownReport, SubmitError, TickOutcome,
    };
}
