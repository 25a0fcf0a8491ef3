//! [`StepSequence`]: the explicit work stack that drives tasks.
//!
//! Frames live on the heap in a `Vec`, so recursion depth never grows the
//! native stack. Each [`advance`](StepSequence::advance) resumes the top
//! frame until one of them yields after a primitive operation; calls and
//! returns in between are amortized O(1) each.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stepsort_core::{SequenceError, Storage, StorageError};

use crate::context::TaskContext;
use crate::task::{Step, Task};

/// A live, one-shot resumable computation.
///
/// Created by [`Algorithm::run`](crate::Algorithm::run). Not restartable:
/// once [`SequenceError::Exhausted`] is returned, build a new sequence.
pub struct StepSequence {
    frames: Vec<Box<dyn Task>>,
    verdict: Option<bool>,
    steps: u64,
    max_depth: usize,
}

impl StepSequence {
    /// A sequence whose work stack holds only `root`.
    pub fn new(root: Box<dyn Task>) -> Self {
        Self {
            frames: vec![root],
            verdict: None,
            steps: 0,
            max_depth: 1,
        }
    }

    /// Perform exactly one primitive operation.
    ///
    /// Returns [`SequenceError::Exhausted`] when the work stack empties
    /// without another operation. A storage failure discards the
    /// remaining frames and is returned as [`SequenceError::Storage`].
    pub fn advance(
        &mut self,
        storage: &mut Storage,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), SequenceError> {
        loop {
            let Some(top) = self.frames.last_mut() else {
                return Err(SequenceError::Exhausted);
            };
            let mut cx = TaskContext::new(storage, rng, self.verdict);
            let step = match top.resume(&mut cx) {
                Ok(step) => step,
                Err(e) => {
                    self.frames.clear();
                    return Err(SequenceError::Storage(e));
                }
            };
            match step {
                Step::Yield => {
                    self.steps += 1;
                    return Ok(());
                }
                Step::Call(child) => {
                    self.verdict = None;
                    self.frames.push(child);
                    self.max_depth = self.max_depth.max(self.frames.len());
                }
                Step::Done => {
                    self.frames.pop();
                    self.verdict = None;
                }
                Step::Verdict(v) => {
                    self.frames.pop();
                    self.verdict = Some(v);
                }
            }
        }
    }

    /// Advance until exhausted and return the number of steps taken by
    /// this call.
    pub fn drain(
        &mut self,
        storage: &mut Storage,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, StorageError> {
        let start = self.steps;
        loop {
            match self.advance(storage, rng) {
                Ok(()) => {}
                Err(SequenceError::Exhausted) => return Ok(self.steps - start),
                Err(SequenceError::Storage(e)) => return Err(e),
            }
        }
    }

    /// [`drain`](Self::drain) with a generator seeded from `seed`.
    pub fn drain_seeded(&mut self, storage: &mut Storage, seed: u64) -> Result<u64, StorageError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.drain(storage, &mut rng)
    }

    /// Whether the work stack is empty.
    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }

    /// Primitive operations performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current number of frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Largest number of frames seen at once.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The verdict of the most recently finished frame. After exhaustion
    /// this is the root's verdict, if it returned one.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }
}

impl std::fmt::Debug for StepSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepSequence")
            .field("depth", &self.frames.len())
            .field("steps", &self.steps)
            .field("max_depth", &self.max_depth)
            .field("verdict", &self.verdict)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_core::Addr;

    /// Reads main[0] `n` times.
    struct Reads(usize);

    impl Task for Reads {
        fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
            if self.0 == 0 {
                return Ok(Step::Done);
            }
            self.0 -= 1;
            cx.read(Addr::main(0))?;
            Ok(Step::Yield)
        }
    }

    /// Recurses `depth` levels, reading once per level on the way down,
    /// then reports whether the innermost child said true.
    struct Nest {
        depth: usize,
        pc: u8,
    }

    impl Task for Nest {
        fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
            match self.pc {
                0 => {
                    self.pc = 1;
                    cx.read(Addr::main(0))?;
                    Ok(Step::Yield)
                }
                1 if self.depth == 0 => Ok(Step::Verdict(true)),
                1 => {
                    self.pc = 2;
                    Ok(Step::Call(Box::new(Nest {
                        depth: self.depth - 1,
                        pc: 0,
                    })))
                }
                _ => Ok(Step::Verdict(cx.verdict() == Some(true))),
            }
        }
    }

    #[test]
    fn yields_once_per_operation() {
        let mut storage = Storage::new(1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut seq = StepSequence::new(Box::new(Reads(3)));
        for k in 1..=3 {
            seq.advance(&mut storage, &mut rng).unwrap();
            assert_eq!(storage.stats().reads, k);
        }
        assert_eq!(
            seq.advance(&mut storage, &mut rng),
            Err(SequenceError::Exhausted)
        );
        assert!(seq.is_exhausted());
        assert_eq!(
            seq.advance(&mut storage, &mut rng),
            Err(SequenceError::Exhausted)
        );
        assert_eq!(seq.steps(), 3);
    }

    #[test]
    fn verdict_propagates_through_frames() {
        let mut storage = Storage::new(1);
        let mut seq = StepSequence::new(Box::new(Nest { depth: 50, pc: 0 }));
        let steps = seq.drain_seeded(&mut storage, 0).unwrap();
        assert_eq!(steps, 51);
        assert_eq!(seq.max_depth(), 51);
        assert_eq!(seq.verdict(), Some(true));
    }

    #[test]
    fn deep_recursion_does_not_use_native_stack() {
        let mut storage = Storage::new(1);
        let mut seq = StepSequence::new(Box::new(Nest {
            depth: 200_000,
            pc: 0,
        }));
        seq.drain_seeded(&mut storage, 0).unwrap();
        assert_eq!(seq.verdict(), Some(true));
    }

    struct OutOfBounds;

    impl Task for OutOfBounds {
        fn resume(&mut self, cx: &mut TaskContext<'_>) -> Result<Step, StorageError> {
            cx.read(Addr::main(99))?;
            Ok(Step::Yield)
        }
    }

    #[test]
    fn storage_error_poisons_sequence() {
        let mut storage = Storage::new(2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut seq = StepSequence::new(Box::new(OutOfBounds));
        assert!(matches!(
            seq.advance(&mut storage, &mut rng),
            Err(SequenceError::Storage(StorageError::OutOfBounds { .. }))
        ));
        assert!(seq.is_exhausted());
    }
}
