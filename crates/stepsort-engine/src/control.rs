//! Lockstep (caller-driven) control.
//!
//! [`Control`] owns the storage engine, the generator, the current
//! selection for every stage and the live [`Pipeline`]. The caller
//! drives it with [`tick()`](Control::tick) at whatever cadence it
//! likes and observes it between ticks.
//!
//! # States
//!
//! ```text
//! Constructed --start--> Running <--pause_play--> Paused
//!                           |
//!                  finished / failed / stop
//!                           v
//!                        Stopped --start--> Running
//! ```
//!
//! Selection and length changes discard the live pipeline, reset the
//! storage engine and rebuild, without changing the state. A finished
//! run leaves its final arrays and statistics in place until the next
//! [`start()`](Control::start).

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stepsort_catalog::Catalog;
use stepsort_core::{ConfigError, SequenceError, Snapshot, Stage, Storage, StorageError};
use stepsort_task::{Algorithm, OptionSetting, OptionSpec, OptionValue};
use tracing::{debug, info, warn};

use crate::config::{check_array_len, ControlConfig, Selection};
use crate::metrics::{ControlSnapshot, RunReport};
use crate::pipeline::Pipeline;

// ── ControlState ─────────────────────────────────────────────────

/// Run state of a [`Control`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlState {
    /// Built but never started.
    Constructed,
    /// Ticks advance the pipeline.
    Running,
    /// Ticks are ignored until resumed.
    Paused,
    /// The last run finished, failed or was stopped.
    Stopped,
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constructed => "constructed",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

// ── TickOutcome ──────────────────────────────────────────────────

/// What one [`Control::tick`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing happened.
    Idle,
    /// The pipeline performed `steps` primitive operations.
    Advanced {
        /// Operations performed this tick.
        steps: u64,
    },
    /// The verify stage finished during this tick.
    Finished(RunReport),
}

// ── Control ──────────────────────────────────────────────────────

struct Selected {
    selection: Selection,
    algorithm: Arc<dyn Algorithm>,
}

impl Selected {
    fn build(catalog: &Catalog, stage: Stage, selection: Selection) -> Result<Self, ConfigError> {
        let algorithm = catalog.build(stage, &selection.name, &selection.overrides())?;
        Ok(Self {
            selection,
            algorithm,
        })
    }
}

/// Single-owner driver of one storage engine.
///
/// `Control` is [`Send`]; move it into a thread to run it there, or use
/// [`RealtimeControl`](crate::RealtimeControl), which does exactly that.
pub struct Control {
    config: ControlConfig,
    catalog: Catalog,
    storage: Storage,
    rng: ChaCha8Rng,
    selected: [Selected; 4],
    pipeline: Pipeline,
    state: ControlState,
    last_report: Option<RunReport>,
    ticks: u64,
    run_ticks: u64,
    started_at: Option<Instant>,
}

impl Control {
    /// A control over the standard catalog.
    pub fn new(config: ControlConfig) -> Result<Self, ConfigError> {
        Self::with_catalog(config, Catalog::standard())
    }

    /// A control selecting from `catalog`.
    ///
    /// # Errors
    ///
    /// Any error from [`ControlConfig::validate`], or from building the
    /// configured selections.
    pub fn with_catalog(config: ControlConfig, catalog: Catalog) -> Result<Self, ConfigError> {
        config.validate()?;
        let verifier = catalog.verifier();
        let selected = [
            Selected::build(&catalog, Stage::Input, config.input.clone())?,
            Selected::build(&catalog, Stage::Shuffle, config.shuffle.clone())?,
            Selected::build(&catalog, Stage::Sort, config.sort.clone())?,
            Selected {
                selection: Selection::named(verifier.name()),
                algorithm: verifier,
            },
        ];
        let pipeline = compose(&selected);
        info!(
            len = config.main_array_len,
            input = %config.input.name,
            shuffle = %config.shuffle.name,
            sort = %config.sort.name,
            "control constructed"
        );
        Ok(Self {
            storage: Storage::new(config.main_array_len),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            catalog,
            selected,
            pipeline,
            state: ControlState::Constructed,
            last_report: None,
            ticks: 0,
            run_ticks: 0,
            started_at: None,
        })
    }

    // ── Run state ────────────────────────────────────────────────

    /// Begin a run, or resume a paused one.
    ///
    /// Starting from [`ControlState::Stopped`] resets the storage engine
    /// first, clearing the previous run's arrays and statistics.
    pub fn start(&mut self) {
        match self.state {
            ControlState::Running => {}
            ControlState::Paused => self.state = ControlState::Running,
            ControlState::Constructed | ControlState::Stopped => {
                self.rebuild();
                self.state = ControlState::Running;
                self.started_at = Some(Instant::now());
                info!(sort = self.name(Stage::Sort), "run started");
            }
        }
    }

    /// Abandon the current run, reset the storage engine and rebuild.
    pub fn stop(&mut self) {
        self.rebuild();
        if self.state != ControlState::Constructed {
            self.state = ControlState::Stopped;
        }
        info!("run stopped");
    }

    /// Toggle between running and paused. Other states are unchanged.
    /// Returns the resulting state.
    pub fn pause_play(&mut self) -> ControlState {
        self.state = match self.state {
            ControlState::Running => ControlState::Paused,
            ControlState::Paused => ControlState::Running,
            other => other,
        };
        debug!(state = %self.state, "pause/play");
        self.state
    }

    /// Advance the pipeline by up to `steps_per_tick` operations.
    ///
    /// # Errors
    ///
    /// A [`StorageError`] ends the run: the state becomes
    /// [`ControlState::Stopped`], the statistics are kept and a failed
    /// [`RunReport`] is recorded before the error is returned.
    pub fn tick(&mut self) -> Result<TickOutcome, StorageError> {
        if self.state != ControlState::Running {
            return Ok(TickOutcome::Idle);
        }
        self.ticks += 1;
        self.run_ticks += 1;
        let mut steps = 0;
        for _ in 0..self.config.steps_per_tick {
            match self.pipeline.advance(&mut self.storage, &mut self.rng) {
                Ok(()) => steps += 1,
                Err(SequenceError::Exhausted) => {
                    let report = self.finish(None);
                    info!(
                        sort = %report.sort,
                        verdict = ?report.verdict,
                        steps = report.total_steps(),
                        "run finished"
                    );
                    return Ok(TickOutcome::Finished(report));
                }
                Err(SequenceError::Storage(e)) => {
                    warn!(error = %e, stage = ?self.pipeline.stage(), "run failed");
                    self.finish(Some(e.clone()));
                    return Err(e);
                }
            }
        }
        Ok(TickOutcome::Advanced { steps })
    }

    fn finish(&mut self, failure: Option<StorageError>) -> RunReport {
        let report = RunReport {
            input: self.name(Stage::Input).to_string(),
            shuffle: self.name(Stage::Shuffle).to_string(),
            sort: self.name(Stage::Sort).to_string(),
            main_array_len: self.storage.main_len(),
            stage_steps: Stage::ALL.map(|s| self.pipeline.stage_steps(s)),
            max_depth: self.pipeline.max_depth(),
            stats: *self.storage.stats(),
            verdict: self.pipeline.verdict(),
            failure,
            ticks: self.run_ticks,
            elapsed: self
                .started_at
                .map(|t| t.elapsed())
                .unwrap_or(Duration::ZERO),
        };
        // The finished arrays stay visible; only the pipeline is fresh.
        self.pipeline = compose(&self.selected);
        self.run_ticks = 0;
        self.started_at = None;
        self.state = ControlState::Stopped;
        self.last_report = Some(report.clone());
        report
    }

    fn rebuild(&mut self) {
        self.storage.reset();
        self.pipeline = compose(&self.selected);
        self.run_ticks = 0;
        if matches!(self.state, ControlState::Running | ControlState::Paused) {
            self.started_at = Some(Instant::now());
        }
    }

    // ── Selection ────────────────────────────────────────────────

    /// Select the algorithm for `stage` by catalog name.
    ///
    /// On success the storage engine is reset and the pipeline rebuilt;
    /// the run state is kept, so a running control starts the new run on
    /// its next tick.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from the catalog. The previous selection stays
    /// active and nothing is reset.
    pub fn select(
        &mut self,
        stage: Stage,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<(), ConfigError> {
        let selection = Selection::from_overrides(name, options);
        match Selected::build(&self.catalog, stage, selection) {
            Ok(selected) => {
                info!(%stage, name, "algorithm selected");
                self.selected[stage.index()] = selected;
                self.rebuild();
                Ok(())
            }
            Err(e) => {
                warn!(%stage, name, error = %e, "selection rejected");
                Err(e)
            }
        }
    }

    /// [`select`](Self::select) for the input stage.
    pub fn select_input(
        &mut self,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<(), ConfigError> {
        self.select(Stage::Input, name, options)
    }

    /// [`select`](Self::select) for the shuffle stage.
    pub fn select_shuffle(
        &mut self,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<(), ConfigError> {
        self.select(Stage::Shuffle, name, options)
    }

    /// [`select`](Self::select) for the sort stage.
    pub fn select_sort(
        &mut self,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<(), ConfigError> {
        self.select(Stage::Sort, name, options)
    }

    // ── Settings ─────────────────────────────────────────────────

    /// Replace the main array with `[1..n]`, reset and rebuild.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidArrayLength`] if `n` is zero or above
    /// `max_array_len`; nothing changes.
    pub fn set_main_array_len(&mut self, n: usize) -> Result<(), ConfigError> {
        if let Err(e) = check_array_len(n, self.config.max_array_len) {
            warn!(error = %e, "array length rejected");
            return Err(e);
        }
        self.storage.change_main_array_len(n);
        self.config.main_array_len = n;
        self.rebuild();
        info!(len = n, "main array length changed");
        Ok(())
    }

    /// Set the operations performed per tick.
    pub fn set_steps_per_tick(&mut self, steps: usize) -> Result<(), ConfigError> {
        if steps == 0 {
            return Err(ConfigError::InvalidStepsPerTick);
        }
        self.config.steps_per_tick = steps;
        Ok(())
    }

    /// Set the minimum time between realtime ticks.
    pub fn set_step_delay(&mut self, delay: Duration) {
        self.config.step_delay = delay;
    }

    /// Reseed the generator, reset and rebuild.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.rebuild();
        debug!(seed, "generator reseeded");
    }

    // ── Observation ──────────────────────────────────────────────

    /// The storage engine, read-only.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// An owned copy of the arrays, pointers and statistics.
    pub fn snapshot(&self) -> Snapshot {
        self.storage.snapshot()
    }

    /// Everything an observer renders, as one owned value.
    pub fn control_snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            state: self.state,
            stage: self.stage(),
            steps: self.pipeline.steps(),
            ticks: self.ticks,
            storage: self.storage.snapshot(),
            last_report: self.last_report.clone(),
        }
    }

    /// Current run state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Stage executing, or `None` when not running or paused.
    pub fn stage(&self) -> Option<Stage> {
        match self.state {
            ControlState::Running | ControlState::Paused => self.pipeline.stage(),
            ControlState::Constructed | ControlState::Stopped => None,
        }
    }

    /// Steps performed by the current run.
    pub fn steps(&self) -> u64 {
        self.pipeline.steps()
    }

    /// Ticks spent running since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Report of the most recently finished or failed run.
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Current settings, including the live selections' names.
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    // ── Catalog introspection ────────────────────────────────────

    /// The catalog selections are made from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Names selectable for `stage`.
    pub fn names(&self, stage: Stage) -> Vec<&'static str> {
        self.catalog.names(stage)
    }

    /// Options declared by the catalog entry `name` of `stage`.
    pub fn declared_options(&self, stage: Stage, name: &str) -> Result<&[OptionSpec], ConfigError> {
        self.catalog.options(stage, name)
    }

    /// The active selection for `stage`.
    pub fn selection(&self, stage: Stage) -> &Selection {
        &self.selected[stage.index()].selection
    }

    /// The configured algorithm active for `stage`.
    pub fn algorithm(&self, stage: Stage) -> &Arc<dyn Algorithm> {
        &self.selected[stage.index()].algorithm
    }

    /// Current option values of the algorithm active for `stage`.
    pub fn options(&self, stage: Stage) -> Vec<OptionSetting> {
        self.algorithm(stage).options()
    }

    fn name(&self, stage: Stage) -> &str {
        self.selected[stage.index()].algorithm.name()
    }
}

fn compose(selected: &[Selected; 4]) -> Pipeline {
    let [input, shuffle, sort, verify] = selected;
    Pipeline::new(
        Arc::clone(&input.algorithm),
        Arc::clone(&shuffle.algorithm),
        Arc::clone(&sort.algorithm),
        Arc::clone(&verify.algorithm),
    )
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("state", &self.state)
            .field("pipeline", &self.pipeline)
            .field("main_array_len", &self.storage.main_len())
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

// Moving a control into its thread requires Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Control>();
    }
};

#[cfg(test)]
mod tests {
    use super::*;
    use stepsort_catalog::Entry;
    use stepsort_test_utils::fixtures::FailingSort;
    use stepsort_test_utils::is_ascending;

    fn config(len: usize, sort: &str) -> ControlConfig {
        ControlConfig {
            main_array_len: len,
            sort: Selection::named(sort),
            ..Default::default()
        }
    }

    fn run_to_end(control: &mut Control) -> RunReport {
        control.start();
        loop {
            if let TickOutcome::Finished(report) = control.tick().unwrap() {
                return report;
            }
        }
    }

    #[test]
    fn ticks_are_idle_until_started() {
        let mut c = Control::new(config(8, "Bubble Sort")).unwrap();
        assert_eq!(c.state(), ControlState::Constructed);
        assert_eq!(c.tick(), Ok(TickOutcome::Idle));
        assert_eq!(c.storage().stats().writes, 0);
        assert_eq!(c.stage(), None);
    }

    #[test]
    fn a_run_finishes_stopped_with_a_report() {
        let mut c = Control::new(config(16, "Quick Sort")).unwrap();
        let report = run_to_end(&mut c);
        assert!(report.passed());
        assert_eq!(report.steps(Stage::Input), 16);
        assert_eq!(c.state(), ControlState::Stopped);
        assert_eq!(c.last_report(), Some(&report));
        assert!(is_ascending(c.storage().main_array()));
        // Final statistics stay visible until the next start.
        assert_eq!(*c.storage().stats(), report.stats);
        c.start();
        assert_eq!(c.storage().stats().reads, 0);
        assert_eq!(c.state(), ControlState::Running);
    }

    #[test]
    fn steps_per_tick_batches_operations() {
        let mut c = Control::new(ControlConfig {
            steps_per_tick: 5,
            ..config(32, "Bubble Sort")
        })
        .unwrap();
        c.start();
        assert_eq!(c.tick(), Ok(TickOutcome::Advanced { steps: 5 }));
        assert_eq!(c.steps(), 5);
        assert_eq!(c.stage(), Some(Stage::Input));
    }

    #[test]
    fn pause_play_toggles_and_pauses_ticks() {
        let mut c = Control::new(config(8, "Bubble Sort")).unwrap();
        assert_eq!(c.pause_play(), ControlState::Constructed);
        c.start();
        c.tick().unwrap();
        assert_eq!(c.pause_play(), ControlState::Paused);
        assert_eq!(c.tick(), Ok(TickOutcome::Idle));
        assert_eq!(c.steps(), 1);
        assert_eq!(c.pause_play(), ControlState::Running);
        c.tick().unwrap();
        assert_eq!(c.steps(), 2);
    }

    #[test]
    fn stop_resets_storage() {
        let mut c = Control::new(config(8, "Merge Sort")).unwrap();
        c.start();
        for _ in 0..40 {
            c.tick().unwrap();
        }
        c.stop();
        assert_eq!(c.state(), ControlState::Stopped);
        let snap = c.snapshot();
        assert_eq!(snap.main_array(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(snap.array_count(), 1);
        assert!(snap.pointers.is_empty());
        assert_eq!(snap.stats, Default::default());
    }

    #[test]
    fn hot_swap_drops_scratch_arrays_and_keeps_running() {
        let mut c = Control::new(ControlConfig {
            shuffle: Selection::named("No Shuffle"),
            ..config(16, "Merge Sort")
        })
        .unwrap();
        c.start();
        while c.storage().array_count() == 1 {
            c.tick().unwrap();
        }
        c.select_sort("Heap Sort", &[]).unwrap();
        assert_eq!(c.storage().array_count(), 1);
        assert_eq!(c.state(), ControlState::Running);
        assert_eq!(c.steps(), 0);
        let report = loop {
            if let TickOutcome::Finished(r) = c.tick().unwrap() {
                break r;
            }
        };
        assert_eq!(report.sort, "Heap Sort");
        assert!(report.passed());
    }

    #[test]
    fn failed_selection_keeps_previous() {
        let mut c = Control::new(config(8, "Bubble Sort")).unwrap();
        let err = c.select_sort("Sleep Sort", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAlgorithm { .. }));
        let err = c
            .select_sort("Radix LSD Sort", &[("base", OptionValue::Int(1))])
            .unwrap_err();
        assert!(matches!(err, ConfigError::OptionOutOfDomain { .. }));
        assert_eq!(c.selection(Stage::Sort).name, "Bubble Sort");
        assert_eq!(c.algorithm(Stage::Sort).name(), "Bubble Sort");
    }

    #[test]
    fn selected_options_are_reported() {
        let mut c = Control::new(config(8, "Bubble Sort")).unwrap();
        c.select_sort("Radix LSD Sort", &[("base", OptionValue::Int(4))])
            .unwrap();
        let options = c.options(Stage::Sort);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].name, "base");
        assert_eq!(options[0].value, OptionValue::Int(4));
        assert_eq!(c.selection(Stage::Sort).options.len(), 1);
        assert_eq!(c.declared_options(Stage::Sort, "Bubble Sort"), Ok(&[][..]));
        assert_eq!(c.names(Stage::Sort).len(), 33);
    }

    #[test]
    fn array_length_changes_are_validated() {
        let mut c = Control::new(ControlConfig {
            max_array_len: 100,
            ..config(8, "Bubble Sort")
        })
        .unwrap();
        assert!(c.set_main_array_len(0).is_err());
        assert!(c.set_main_array_len(101).is_err());
        assert_eq!(c.storage().main_len(), 8);
        c.set_main_array_len(100).unwrap();
        assert_eq!(c.storage().main_len(), 100);
        assert_eq!(c.config().main_array_len, 100);
        assert_eq!(c.set_steps_per_tick(0), Err(ConfigError::InvalidStepsPerTick));
    }

    #[test]
    fn reseed_matches_a_fresh_control() {
        let seeded = |seed| ControlConfig {
            seed,
            input: Selection::named("Uniform Random"),
            ..config(24, "Comb Sort")
        };
        let mut fresh = Control::new(seeded(1)).unwrap();
        let mut reseeded = Control::new(seeded(9)).unwrap();
        reseeded.start();
        reseeded.tick().unwrap();
        reseeded.reseed(1);
        assert_eq!(reseeded.storage().stats().writes, 0);
        assert_eq!(reseeded.config().seed, 1);
        let a = run_to_end(&mut fresh);
        let b = run_to_end(&mut reseeded);
        assert_eq!(a.stats, b.stats);
        assert_eq!(fresh.snapshot(), reseeded.snapshot());
    }

    #[test]
    fn unknown_configured_sort_fails_construction() {
        let err = Control::new(config(8, "Sleep Sort")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAlgorithm { stage: Stage::Sort, .. }));
    }

    #[test]
    fn storage_error_stops_the_run() {
        let mut catalog = Catalog::standard();
        catalog
            .register(
                Stage::Sort,
                Entry::new("Failing Sort", |_| {
                    Ok(Arc::new(FailingSort::new(3)) as Arc<dyn Algorithm>)
                }),
            )
            .unwrap();
        let mut c = Control::with_catalog(config(4, "Failing Sort"), catalog).unwrap();
        c.start();
        let err = loop {
            match c.tick() {
                Ok(_) => {}
                Err(e) => break e,
            }
        };
        assert!(matches!(err, StorageError::OutOfBounds { index: 4, .. }));
        assert_eq!(c.state(), ControlState::Stopped);
        let report = c.last_report().unwrap();
        assert_eq!(report.failure, Some(err));
        assert!(!report.passed());
        // Statistics survive the failure.
        assert!(c.storage().stats().reads >= 3);
        assert_eq!(c.tick(), Ok(TickOutcome::Idle));
    }
}
