//! Step-producing building blocks shared across the catalog.
//!
//! Algorithms are composed from these kernels rather than layered by
//! inheritance: a heap sort is a [`Heapify`] followed by an
//! [`ExtractRoots`], an in-place merge may end in an [`insertion`] pass,
//! and so on.

pub mod exchange;
pub mod heap;
pub mod insertion;
pub mod reversal;
pub mod roll_drop;
pub mod shuffle;

pub use exchange::{each, CompareSwap, Exchange, Pairs, Schedule};
pub use heap::{ExtractRoots, Heapify, HeapifyStrategy, Orientation, SiftDown};
pub use insertion::{insertion, insertion_all, InsertionSchedule};
pub use reversal::{BlockReverse, Reverse};
pub use roll_drop::RollAndDrop;
pub use shuffle::FisherYates;
