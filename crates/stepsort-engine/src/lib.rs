//! Orchestration and control for stepsort.
//!
//! Composes one input, shuffle and sort with the verifier into a
//! [`Pipeline`], and drives it either in lockstep through [`Control`]
//! or on a dedicated thread through [`RealtimeControl`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod control;
mod control_thread;
pub mod metrics;
pub mod pipeline;
pub mod realtime;

pub use config::{ControlConfig, Selection};
pub use control::{Control, ControlState, TickOutcome};
pub use metrics::{ControlSnapshot, RunReport};
pub use pipeline::Pipeline;
pub use realtime::{RealtimeControl, ShutdownReport, SubmitError};
