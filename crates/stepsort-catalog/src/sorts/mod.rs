//! Sorting algorithms, grouped by family.

pub mod degenerate;
pub mod distribution;
pub mod exchange;
pub mod heap;
pub mod merge;
pub mod network;
pub mod quick;
pub mod selection;
pub mod sqrt;

pub use degenerate::{BogoSort, SlowSort};
pub use distribution::{CountingSort, GravitySort, PigeonholeSort, Placement, RadixLsdSort};
pub use exchange::ExchangeSort;
pub use heap::HeapSort;
pub use merge::{Combine, InPlaceMergeSort, MergeSort};
pub use network::{Network, NetworkSort};
pub use quick::QuickSort;
pub use selection::SelectionSort;
pub use sqrt::SquareRootSort;
