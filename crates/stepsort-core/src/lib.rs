//! Core types for the stepsort engine.
//!
//! This is the leaf crate of the workspace. It defines the instrumented
//! [`Storage`] engine that every algorithm operates on, along with the
//! address, pointer, statistics, relation, stage and error types shared
//! by the other crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pointer;
pub mod relation;
pub mod snapshot;
pub mod stage;
pub mod stats;
pub mod storage;

pub use error::{ConfigError, SequenceError, StorageError};
pub use pointer::{Access, Addr, Pointer, Pointers};
pub use relation::Relation;
pub use snapshot::Snapshot;
pub use stage::Stage;
pub use stats::Statistics;
pub use storage::Storage;

/// Element type of every array.
pub type Value = i64;
