//! Control loop, command draining and snapshot publication for
//! realtime mode.
//!
//! The control thread owns its [`Control`] exclusively (moved in via
//! `thread::spawn`). Commands arrive over a bounded crossbeam channel,
//! each with its own reply channel, and are applied between ticks, so a
//! selection never lands in the middle of a primitive operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use stepsort_core::{ConfigError, Stage};
use tracing::debug;

use crate::config::Selection;
use crate::control::{Control, ControlState, TickOutcome};
use crate::metrics::ControlSnapshot;

/// How long the thread parks between polls while not running.
/// Submitted commands unpark it early.
const IDLE_PARK: Duration = Duration::from_millis(50);

/// A driver request applied on the control thread.
#[derive(Clone, Debug)]
pub(crate) enum Command {
    Select { stage: Stage, selection: Selection },
    SetMainArrayLen(usize),
    SetStepsPerTick(usize),
    SetStepDelay(Duration),
    Start,
    Stop,
    PausePlay,
}

/// A command paired with the channel its result goes back on.
pub(crate) struct CommandRequest {
    pub command: Command,
    pub reply: Sender<Result<ControlState, ConfigError>>,
}

/// The most recently published snapshot.
#[derive(Debug)]
pub(crate) struct SnapshotSlot(Mutex<Arc<ControlSnapshot>>);

impl SnapshotSlot {
    pub fn new(initial: ControlSnapshot) -> Self {
        Self(Mutex::new(Arc::new(initial)))
    }

    pub fn load(&self) -> Arc<ControlSnapshot> {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn store(&self, snapshot: ControlSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

/// What the control thread hands back when it exits.
pub(crate) struct ThreadExit {
    pub control: Control,
    pub finished_runs: u64,
    pub failed_runs: u64,
}

/// State held by the control thread's main loop.
pub(crate) struct ControlThreadState {
    control: Control,
    cmd_rx: Receiver<CommandRequest>,
    slot: Arc<SnapshotSlot>,
    shutdown_flag: Arc<AtomicBool>,
    thread_stopped: Arc<AtomicBool>,
    finished_runs: u64,
    failed_runs: u64,
}

impl ControlThreadState {
    pub fn new(
        control: Control,
        cmd_rx: Receiver<CommandRequest>,
        slot: Arc<SnapshotSlot>,
        shutdown_flag: Arc<AtomicBool>,
        thread_stopped: Arc<AtomicBool>,
    ) -> Self {
        Self {
            control,
            cmd_rx,
            slot,
            shutdown_flag,
            thread_stopped,
            finished_runs: 0,
            failed_runs: 0,
        }
    }

    /// Main loop. Runs until `shutdown_flag` is set, then returns the
    /// control so its final state can be inspected.
    pub fn run(mut self) -> ThreadExit {
        debug!("control thread started");
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }

            let tick_start = Instant::now();

            // 1. Apply pending commands.
            let mut changed = self.drain_command_channel();

            // 2. Tick.
            match self.control.tick() {
                Ok(TickOutcome::Idle) => {}
                Ok(TickOutcome::Advanced { .. }) => changed = true,
                Ok(TickOutcome::Finished(report)) => {
                    changed = true;
                    self.finished_runs += 1;
                    debug!(passed = report.passed(), "control thread finished a run");
                }
                Err(_) => {
                    changed = true;
                    self.failed_runs += 1;
                }
            }

            // 3. Publish.
            if changed {
                self.slot.store(self.control.control_snapshot());
            }

            // 4. Park for the remaining budget. `unpark` from a
            //    submitter or from shutdown wakes the thread early.
            let budget = match self.control.state() {
                ControlState::Running => self.control.config().step_delay,
                _ => IDLE_PARK,
            };
            if let Some(remaining) = budget.checked_sub(tick_start.elapsed()) {
                if !remaining.is_zero() {
                    thread::park_timeout(remaining);
                }
            }
        }

        self.thread_stopped.store(true, Ordering::Release);
        debug!(
            finished = self.finished_runs,
            failed = self.failed_runs,
            "control thread stopped"
        );
        ThreadExit {
            control: self.control,
            finished_runs: self.finished_runs,
            failed_runs: self.failed_runs,
        }
    }

    /// Apply every queued command. Returns whether any arrived.
    fn drain_command_channel(&mut self) -> bool {
        let mut any = false;
        while let Ok(request) = self.cmd_rx.try_recv() {
            any = true;
            let result = apply(&mut self.control, request.command);
            // The submitter may have given up on the reply.
            let _ = request.reply.send(result);
        }
        any
    }
}

fn apply(control: &mut Control, command: Command) -> Result<ControlState, ConfigError> {
    match command {
        Command::Select { stage, selection } => {
            control.select(stage, &selection.name, &selection.overrides())?;
        }
        Command::SetMainArrayLen(n) => control.set_main_array_len(n)?,
        Command::SetStepsPerTick(n) => control.set_steps_per_tick(n)?,
        Command::SetStepDelay(delay) => control.set_step_delay(delay),
        Command::Start => control.start(),
        Command::Stop => control.stop(),
        Command::PausePlay => {
            control.pause_play();
        }
    }
    Ok(control.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;

    fn control() -> Control {
        Control::new(ControlConfig {
            main_array_len: 8,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn apply_reports_resulting_state() {
        let mut c = control();
        assert_eq!(apply(&mut c, Command::Start), Ok(ControlState::Running));
        assert_eq!(apply(&mut c, Command::PausePlay), Ok(ControlState::Paused));
        assert_eq!(apply(&mut c, Command::Stop), Ok(ControlState::Stopped));
    }

    #[test]
    fn apply_surfaces_config_errors() {
        let mut c = control();
        let err = apply(
            &mut c,
            Command::Select {
                stage: Stage::Shuffle,
                selection: Selection::named("Heap Layout").with("orientation", "sideways"),
            },
        );
        assert!(matches!(err, Err(ConfigError::OptionOutOfDomain { .. })));
        assert_eq!(
            apply(&mut c, Command::SetMainArrayLen(0)),
            Err(ConfigError::InvalidArrayLength {
                requested: 0,
                max: 1 << 16
            })
        );
    }

    #[test]
    fn slot_returns_latest_store() {
        let c = control();
        let slot = SnapshotSlot::new(c.control_snapshot());
        assert_eq!(slot.load().state, ControlState::Constructed);
        let mut snap = c.control_snapshot();
        snap.ticks = 9;
        slot.store(snap);
        assert_eq!(slot.load().ticks, 9);
    }
}
