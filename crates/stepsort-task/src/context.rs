//! Execution context passed to tasks on every resumption.
//!
//! [`TaskContext`] lends the task the storage engine and the run's random
//! generator for the duration of one `resume()` call. Nothing is held
//! across suspensions, which keeps algorithms free of storage references.

use rand_chacha::ChaCha8Rng;
use stepsort_core::{Addr, Relation, Storage, StorageError, Value};

/// Borrowed state available to a task during one resumption.
pub struct TaskContext<'a> {
    storage: &'a mut Storage,
    rng: &'a mut ChaCha8Rng,
    verdict: Option<bool>,
}

impl<'a> TaskContext<'a> {
    /// Construct a context.
    ///
    /// Typically called by [`StepSequence`](crate::StepSequence), not by
    /// tasks directly.
    pub fn new(storage: &'a mut Storage, rng: &'a mut ChaCha8Rng, verdict: Option<bool>) -> Self {
        Self {
            storage,
            rng,
            verdict,
        }
    }

    /// Read-only view of the storage engine.
    pub fn storage(&self) -> &Storage {
        self.storage
    }

    /// The run's seeded random generator.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        self.rng
    }

    /// Verdict of the most recently finished child frame, if it produced
    /// one. Cleared when the next child is called.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    /// Length of the main array.
    pub fn main_len(&self) -> usize {
        self.storage.main_len()
    }

    /// Length of array `array`.
    pub fn len_of(&self, array: usize) -> Result<usize, StorageError> {
        self.storage.len_of(array)
    }

    // ── Primitive operations (each is one suspension point) ─────

    /// See [`Storage::read`].
    pub fn read(&mut self, at: Addr) -> Result<Value, StorageError> {
        self.storage.read(at)
    }

    /// See [`Storage::write`].
    pub fn write(&mut self, value: Value, at: Addr) -> Result<(), StorageError> {
        self.storage.write(value, at)
    }

    /// See [`Storage::increment`].
    pub fn increment(&mut self, delta: Value, at: Addr) -> Result<(), StorageError> {
        self.storage.increment(delta, at)
    }

    /// See [`Storage::compare`].
    pub fn compare(&mut self, a: Addr, rel: Relation, b: Addr) -> Result<bool, StorageError> {
        self.storage.compare(a, rel, b)
    }

    /// See [`Storage::swap`].
    pub fn swap(&mut self, a: Addr, b: Addr) -> Result<(), StorageError> {
        self.storage.swap(a, b)
    }

    /// See [`Storage::spawn_array`].
    pub fn spawn_array(&mut self, size: usize) -> usize {
        self.storage.spawn_array(size)
    }

    /// See [`Storage::delete_array`].
    pub fn delete_array(&mut self, index: usize) -> Result<(), StorageError> {
        self.storage.delete_array(index)
    }
}
