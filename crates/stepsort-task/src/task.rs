//! The [`Task`] trait and the [`Step`] signal.
//!
//! A task is one frame of a step sequence: a small explicit state machine
//! that performs at most one primitive storage operation per resumption.
//! Recursion is expressed by returning [`Step::Call`] with a child task
//! instead of calling it natively, so suspension after every operation
//! costs nothing on the native stack.

use crate::context::TaskContext;
use stepsort_core::StorageError;

/// What a task did during one resumption.
pub enum Step {
    /// Exactly one primitive operation (or one spawn/delete) was performed.
    /// The sequence suspends.
    Yield,
    /// Push this child frame and resume it next. No operation was
    /// performed. The parent resumes after the child finishes, with the
    /// child's verdict (if any) available through
    /// [`TaskContext::verdict`].
    Call(Box<dyn Task>),
    /// The task finished. Its frame is popped.
    Done,
    /// The task finished with a boolean result for its parent.
    Verdict(bool),
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yield => f.write_str("Yield"),
            Self::Call(_) => f.write_str("Call(..)"),
            Self::Done => f.write_str("Done"),
            Self::Verdict(v) => write!(f, "Verdict({v})"),
        }
    }
}

/// One frame of a resumable computation.
///
/// # Contract
///
/// - Each call to `resume()` performs **at most one** primitive storage
///   operation or array spawn/delete, and returns [`Step::Yield`] exactly
///   when it did.
/// - After returning [`Step::Done`] or [`Step::Verdict`] the task is never
///   resumed again.
/// - Tasks read the main array length lazily on first resumption, since
///   earlier stages may run between construction and start.
///
/// # Object safety
///
/// Step sequences store frames as `Vec<Box<dyn Task>>`.
///
/// # Examples
///
/// A task that reads every element of the main array once:
///
/// ```
/// use stepsort_core::{Addr, Storage, StorageError};
/// use stepsort_task::{Step, StepSequence, Task, TaskContext};
///
/// struct Scan { i: usize }
///
/// impl Task for Scan {
///     fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
///         if self.i >= cx.main_len() {
///             return Ok(Step::Done);
///         }
///         cx.read(Addr::main(self.i))?;
///         self.i += 1;
///         Ok(Step::Yield)
///     }
/// }
///
/// let mut storage = Storage::new(4);
/// let mut seq = StepSequence::new(Box::new(Scan { i: 0 }));
/// let steps = seq.drain_seeded(&mut storage, 0).unwrap();
/// assert_eq!(steps, 4);
/// assert_eq!(storage.stats().reads, 4);
/// ```
pub trait Task: Send {
    /// Advance this frame by at most one primitive operation.
    fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError>;
}
