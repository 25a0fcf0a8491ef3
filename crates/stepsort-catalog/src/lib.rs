//! The stepsort algorithm catalog.
//!
//! Every input generator, shuffle and sort, the verifier, the shared
//! step-producing [`kernels`] they are built from, and the [`Catalog`]
//! registry drivers select them through.
//!
//! Algorithms are plain configured values implementing
//! [`stepsort_task::Algorithm`]; each call to `run()` starts a fresh
//! resumable step sequence over the caller's storage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod inputs;
pub mod kernels;
pub mod registry;
pub mod shuffles;
pub mod sorts;
pub mod verify;

pub use inputs::{Input, Shape};
pub use registry::{Builder, Catalog, Entry};
pub use shuffles::Shuffle;
pub use verify::{Verify, VerifyTask};
