//! Resumable task contract for stepsort algorithms.
//!
//! An [`Algorithm`] produces a [`StepSequence`], an explicit work stack of
//! [`Task`] frames that advances exactly one primitive storage operation
//! at a time. Tasks receive the storage engine through a [`TaskContext`]
//! on every resumption and never hold it between steps.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod algorithm;
pub mod context;
pub mod ops;
pub mod options;
pub mod sequence;
pub mod task;

pub use algorithm::Algorithm;
pub use context::TaskContext;
pub use ops::{copy_array, copy_array_slice, Chain, CopySlice};
pub use options::{Domain, OptionSet, OptionSetting, OptionSpec, OptionValue};
pub use sequence::StepSequence;
pub use task::{Step, Task};
