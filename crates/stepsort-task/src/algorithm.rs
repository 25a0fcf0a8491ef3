//! The [`Algorithm`] trait.

use stepsort_core::Stage;

use crate::options::OptionSetting;
use crate::sequence::StepSequence;
use crate::task::Task;

/// A named, configured algorithm that can produce fresh step sequences.
///
/// # Contract
///
/// - Instances hold only their typed option values and are immutable
///   during a run; all live state belongs to the task returned by
///   [`task()`](Self::task).
/// - [`task()`](Self::task) returns a new root task on every call. A
///   sequence cannot be restarted; run the algorithm again instead.
///
/// # Object safety
///
/// The catalog and the pipeline store algorithms as `Arc<dyn Algorithm>`.
pub trait Algorithm: Send + Sync {
    /// Display name, unique within its stage.
    fn name(&self) -> &str;

    /// The pipeline stage this algorithm belongs to.
    fn stage(&self) -> Stage;

    /// A fresh root task.
    fn task(&self) -> Box<dyn Task>;

    /// Current option values with their domains.
    fn options(&self) -> Vec<OptionSetting> {
        Vec::new()
    }

    /// A fresh step sequence rooted at [`task()`](Self::task).
    fn run(&self) -> StepSequence {
        StepSequence::new(self.task())
    }
}
