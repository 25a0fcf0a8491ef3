//! Heap sorts.

use stepsort_core::Stage;
use stepsort_task::{Algorithm, Chain, OptionSetting, OptionSpec, Task};

use crate::kernels::{ExtractRoots, Heapify, HeapifyStrategy, Orientation, Reverse};

/// Declared option of both heap sorts.
pub fn orientation_option() -> OptionSpec {
    OptionSpec::choice("orientation", "max", Orientation::CHOICES)
}

/// Heapify, then repeatedly move the root behind the shrinking heap.
///
/// A max heap leaves the array ascending. A min heap leaves it
/// descending, so the min variant finishes with a reversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapSort {
    /// How the initial heap is built.
    pub heapify: HeapifyStrategy,
    /// Heap orientation.
    pub orientation: Orientation,
}

impl HeapSort {
    /// Heap sort with bubble-up heapify.
    pub fn naive(orientation: Orientation) -> Self {
        Self {
            heapify: HeapifyStrategy::BubbleUp,
            orientation,
        }
    }

    /// Heap sort with sift-down heapify.
    pub fn optimized(orientation: Orientation) -> Self {
        Self {
            heapify: HeapifyStrategy::SiftDown,
            orientation,
        }
    }
}

impl Algorithm for HeapSort {
    fn name(&self) -> &str {
        match self.heapify {
            HeapifyStrategy::BubbleUp => "Heap Sort",
            HeapifyStrategy::SiftDown => "Optimized Heap Sort",
        }
    }

    fn stage(&self) -> Stage {
        Stage::Sort
    }

    fn task(&self) -> Box<dyn Task> {
        let mut parts: Vec<Box<dyn Task>> = vec![
            Box::new(Heapify::new(self.orientation, self.heapify)),
            Box::new(ExtractRoots::new(self.orientation)),
        ];
        if self.orientation == Orientation::Min {
            parts.push(Box::new(Reverse::main()));
        }
        Box::new(Chain::new(parts))
    }

    fn options(&self) -> Vec<OptionSetting> {
        vec![orientation_option().setting(self.orientation.as_str())]
    }
}
