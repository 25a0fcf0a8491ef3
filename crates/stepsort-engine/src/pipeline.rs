//! The four-stage run: input, shuffle, sort, verify.
//!
//! A [`Pipeline`] holds one algorithm per [`Stage`] and at most one live
//! [`StepSequence`]. Advancing past the end of a stage's sequence rolls
//! straight into the next stage within the same call, so every
//! successful [`advance`](Pipeline::advance) is exactly one primitive
//! operation.

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use stepsort_core::{SequenceError, Stage, Storage};
use stepsort_task::{Algorithm, StepSequence};
use tracing::debug;

/// One composed run over a storage engine.
pub struct Pipeline {
    algorithms: [Arc<dyn Algorithm>; 4],
    stage: Option<Stage>,
    sequence: Option<StepSequence>,
    stage_steps: [u64; 4],
    max_depth: usize,
    verdict: Option<bool>,
}

impl Pipeline {
    /// A pipeline positioned before the first input step.
    pub fn new(
        input: Arc<dyn Algorithm>,
        shuffle: Arc<dyn Algorithm>,
        sort: Arc<dyn Algorithm>,
        verify: Arc<dyn Algorithm>,
    ) -> Self {
        Self {
            algorithms: [input, shuffle, sort, verify],
            stage: Some(Stage::Input),
            sequence: None,
            stage_steps: [0; 4],
            max_depth: 0,
            verdict: None,
        }
    }

    /// Perform exactly one primitive operation.
    ///
    /// Returns [`SequenceError::Exhausted`] once the verify stage has
    /// finished. A storage failure ends the pipeline; later calls
    /// return `Exhausted`.
    pub fn advance(
        &mut self,
        storage: &mut Storage,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), SequenceError> {
        loop {
            let Some(stage) = self.stage else {
                return Err(SequenceError::Exhausted);
            };
            let sequence = self
                .sequence
                .get_or_insert_with(|| self.algorithms[stage.index()].run());
            match sequence.advance(storage, rng) {
                Ok(()) => {
                    self.stage_steps[stage.index()] += 1;
                    self.max_depth = self.max_depth.max(sequence.depth());
                    return Ok(());
                }
                Err(SequenceError::Exhausted) => {
                    if stage == Stage::Verify {
                        self.verdict = sequence.verdict();
                    }
                    self.sequence = None;
                    self.stage = stage.next();
                    debug!(
                        finished = %stage,
                        steps = self.stage_steps[stage.index()],
                        "stage complete"
                    );
                }
                Err(e @ SequenceError::Storage(_)) => {
                    self.sequence = None;
                    self.stage = None;
                    return Err(e);
                }
            }
        }
    }

    /// The stage currently executing, or `None` once finished.
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Whether every stage has run to completion (or the run failed).
    pub fn is_finished(&self) -> bool {
        self.stage.is_none()
    }

    /// The algorithm selected for `stage`.
    pub fn algorithm(&self, stage: Stage) -> &Arc<dyn Algorithm> {
        &self.algorithms[stage.index()]
    }

    /// Steps performed by `stage` so far.
    pub fn stage_steps(&self, stage: Stage) -> u64 {
        self.stage_steps[stage.index()]
    }

    /// Steps performed by all stages so far.
    pub fn steps(&self) -> u64 {
        self.stage_steps.iter().sum()
    }

    /// Deepest work stack observed after a step.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The verifier's verdict, once the verify stage has finished.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.algorithms.iter().map(|a| a.name()).collect();
        f.debug_struct("Pipeline")
            .field("algorithms", &names)
            .field("stage", &self.stage)
            .field("stage_steps", &self.stage_steps)
            .field("verdict", &self.verdict)
            .finish()
    }
}
