//! User-facing [`RealtimeControl`] API and shutdown.
//!
//! The control loop runs on a dedicated thread at its own cadence,
//! while observers read the latest published snapshot at theirs.
//!
//! # Architecture
//!
//! ```text
//! Driver thread                   Control thread ("stepsort-control")
//!     |                               |
//!     |--select_sort()/start()/..---->| cmd_rx.try_recv()
//!     |   [cmd_tx: bounded(64)]       | control.select()/start()/..
//!     |<--Result via reply channel----|
//!     |                               | control.tick()
//!     |                               | slot.store(snapshot)
//!     |                               | park_timeout(delay - elapsed)
//!     |                               |
//! Observer thread(s)                  |
//!     |--snapshot()--> slot.load()    |
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use stepsort_core::{ConfigError, Stage};
use stepsort_task::OptionValue;
use tracing::{debug, warn};

use crate::config::{ControlConfig, Selection};
use crate::control::{Control, ControlState};
use crate::control_thread::{Command, CommandRequest, ControlThreadState, SnapshotSlot, ThreadExit};
use crate::metrics::ControlSnapshot;

/// Capacity of the command channel.
const COMMAND_CAPACITY: usize = 64;

// ── Error types ──────────────────────────────────────────────────

/// Error submitting a command to the control thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The control thread has shut down.
    Shutdown,
    /// The command channel is full (back-pressure).
    ChannelFull,
    /// The control rejected the command; its previous settings stay in
    /// effect.
    Rejected(ConfigError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "control thread has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
            Self::Rejected(e) => write!(f, "command rejected: {e}"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SubmitError {
    fn from(e: ConfigError) -> Self {
        Self::Rejected(e)
    }
}

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`RealtimeControl::shutdown`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Time from the shutdown request until the thread was joined.
    pub total_ms: u64,
    /// Whether the control thread was joined successfully.
    pub thread_joined: bool,
    /// Ticks the control spent running.
    pub ticks: u64,
    /// Runs that reached the end of verify.
    pub finished_runs: u64,
    /// Runs ended by a storage failure.
    pub failed_runs: u64,
}

// ── RealtimeControl ──────────────────────────────────────────────

/// A [`Control`] running on its own thread.
///
/// Every method that changes the control blocks until the control
/// thread has applied it (at most one tick period plus the command's
/// own cost) and returns the resulting state.
pub struct RealtimeControl {
    cmd_tx: Option<crossbeam_channel::Sender<CommandRequest>>,
    slot: Arc<SnapshotSlot>,
    shutdown_flag: Arc<AtomicBool>,
    thread_stopped: Arc<AtomicBool>,
    thread: Option<JoinHandle<ThreadExit>>,
    /// Recovered from the thread on shutdown. In a Mutex so that
    /// `RealtimeControl` is Sync even though `Control` is not.
    recovered: Mutex<Option<Control>>,
    last_report: Option<ShutdownReport>,
}

impl RealtimeControl {
    /// Build a control from `config` and spawn its thread.
    pub fn new(config: ControlConfig) -> Result<Self, ConfigError> {
        Self::spawn(Control::new(config)?)
    }

    /// Move an existing control onto a new thread.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ThreadSpawnFailed`] if the OS refuses the thread.
    pub fn spawn(control: Control) -> Result<Self, ConfigError> {
        let slot = Arc::new(SnapshotSlot::new(control.control_snapshot()));
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let thread_stopped = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(COMMAND_CAPACITY);

        let state = ControlThreadState::new(
            control,
            cmd_rx,
            Arc::clone(&slot),
            Arc::clone(&shutdown_flag),
            Arc::clone(&thread_stopped),
        );
        let thread = thread::Builder::new()
            .name("stepsort-control".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        debug!("control thread spawned");

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            slot,
            shutdown_flag,
            thread_stopped,
            thread: Some(thread),
            recovered: Mutex::new(None),
            last_report: None,
        })
    }

    fn submit(&self, command: Command) -> Result<ControlState, SubmitError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let request = CommandRequest {
            command,
            reply: reply_tx,
        };
        cmd_tx.try_send(request).map_err(|e| match e {
            crossbeam_channel::TrySendError::Full(_) => SubmitError::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })?;

        // Wake the thread if it is parked between ticks.
        if let Some(handle) = &self.thread {
            handle.thread().unpark();
        }

        let result = reply_rx.recv().map_err(|_| SubmitError::Shutdown)?;
        Ok(result?)
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Select the algorithm for `stage`; see [`Control::select`].
    pub fn select(
        &self,
        stage: Stage,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<ControlState, SubmitError> {
        self.submit(Command::Select {
            stage,
            selection: Selection::from_overrides(name, options),
        })
    }

    /// Select the input generator.
    pub fn select_input(
        &self,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<ControlState, SubmitError> {
        self.select(Stage::Input, name, options)
    }

    /// Select the shuffle.
    pub fn select_shuffle(
        &self,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<ControlState, SubmitError> {
        self.select(Stage::Shuffle, name, options)
    }

    /// Select the sort.
    pub fn select_sort(
        &self,
        name: &str,
        options: &[(&str, OptionValue)],
    ) -> Result<ControlState, SubmitError> {
        self.select(Stage::Sort, name, options)
    }

    /// See [`Control::set_main_array_len`].
    pub fn set_main_array_len(&self, n: usize) -> Result<ControlState, SubmitError> {
        self.submit(Command::SetMainArrayLen(n))
    }

    /// See [`Control::set_steps_per_tick`].
    pub fn set_steps_per_tick(&self, steps: usize) -> Result<ControlState, SubmitError> {
        self.submit(Command::SetStepsPerTick(steps))
    }

    /// Set the minimum time between ticks.
    pub fn set_step_delay(&self, delay: Duration) -> Result<ControlState, SubmitError> {
        self.submit(Command::SetStepDelay(delay))
    }

    /// See [`Control::start`].
    pub fn start(&self) -> Result<ControlState, SubmitError> {
        self.submit(Command::Start)
    }

    /// See [`Control::stop`].
    pub fn stop(&self) -> Result<ControlState, SubmitError> {
        self.submit(Command::Stop)
    }

    /// See [`Control::pause_play`].
    pub fn pause_play(&self) -> Result<ControlState, SubmitError> {
        self.submit(Command::PausePlay)
    }

    // ── Observation ──────────────────────────────────────────────

    /// The latest published snapshot. Never blocks on the control loop.
    pub fn snapshot(&self) -> Arc<ControlSnapshot> {
        self.slot.load()
    }

    /// Whether the control thread is still looping.
    pub fn is_alive(&self) -> bool {
        self.thread.is_some() && !self.thread_stopped.load(Ordering::Acquire)
    }

    /// Take the control recovered from the thread by
    /// [`shutdown`](Self::shutdown).
    pub fn take_control(&mut self) -> Option<Control> {
        self.recovered
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Shut down and take back the control.
    pub fn into_control(mut self) -> Option<Control> {
        self.shutdown();
        self.take_control()
    }

    // ── Shutdown ─────────────────────────────────────────────────

    /// Stop the control thread and join it.
    ///
    /// Sets the shutdown flag, unparks the thread (waking it from its
    /// tick delay immediately), closes the command channel and joins.
    /// Idempotent: later calls return the first report.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if let Some(report) = &self.last_report {
            return report.clone();
        }

        let start = Instant::now();
        self.shutdown_flag.store(true, Ordering::Release);
        self.cmd_tx.take();

        let mut report = ShutdownReport {
            total_ms: 0,
            thread_joined: false,
            ticks: 0,
            finished_runs: 0,
            failed_runs: 0,
        };
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            match handle.join() {
                Ok(exit) => {
                    report.thread_joined = true;
                    report.ticks = exit.control.ticks();
                    report.finished_runs = exit.finished_runs;
                    report.failed_runs = exit.failed_runs;
                    self.slot.store(exit.control.control_snapshot());
                    *self.recovered.get_mut().unwrap_or_else(PoisonError::into_inner) =
                        Some(exit.control);
                }
                Err(_) => warn!("control thread panicked"),
            }
        }
        report.total_ms = start.elapsed().as_millis() as u64;
        debug!(total_ms = report.total_ms, "control shut down");
        self.last_report = Some(report.clone());
        report
    }
}

impl Drop for RealtimeControl {
    fn drop(&mut self) {
        if self.last_report.is_none() {
            self.shutdown();
        }
    }
}

impl fmt::Debug for RealtimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeControl")
            .field("alive", &self.is_alive())
            .field("shut_down", &self.last_report.is_some())
            .finish_non_exhaustive()
    }
}

const _: () = {
    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send_sync::<RealtimeControl>();
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ControlConfig {
        ControlConfig {
            main_array_len: 32,
            steps_per_tick: 16,
            shuffle: Selection::named("Reversal"),
            sort: Selection::named("Insertion Sort"),
            ..Default::default()
        }
    }

    fn wait_for(rt: &RealtimeControl, pred: impl Fn(&ControlSnapshot) -> bool) -> Arc<ControlSnapshot> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let snap = rt.snapshot();
            if pred(&snap) {
                return snap;
            }
            assert!(Instant::now() < deadline, "timed out waiting for control");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn commands_report_resulting_state() {
        let rt = RealtimeControl::new(test_config()).unwrap();
        assert_eq!(rt.snapshot().state, ControlState::Constructed);
        assert_eq!(rt.start(), Ok(ControlState::Running));
        assert_eq!(rt.stop(), Ok(ControlState::Stopped));
    }

    #[test]
    fn run_completes_on_control_thread() {
        let rt = RealtimeControl::new(test_config()).unwrap();
        rt.start().unwrap();
        let snap = wait_for(&rt, |s| s.last_report.is_some());
        let report = snap.last_report.as_ref().unwrap();
        assert!(report.passed());
        assert_eq!(report.sort, "Insertion Sort");
    }

    #[test]
    fn rejected_command_surfaces_config_error() {
        let rt = RealtimeControl::new(test_config()).unwrap();
        let err = rt.select_sort("Sleep Sort", &[]).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Rejected(ConfigError::UnknownAlgorithm { .. })
        ));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn shutdown_is_idempotent_and_recovers_control() {
        let mut rt = RealtimeControl::new(test_config()).unwrap();
        rt.start().unwrap();
        let first = rt.shutdown();
        assert!(first.thread_joined);
        assert!(!rt.is_alive());
        assert_eq!(rt.shutdown(), first);
        assert_eq!(rt.start(), Err(SubmitError::Shutdown));
        assert!(rt.take_control().is_some());
        assert!(rt.take_control().is_none());
    }

    #[test]
    fn shutdown_wakes_a_slow_thread() {
        let mut rt = RealtimeControl::new(ControlConfig {
            step_delay: Duration::from_secs(60),
            ..test_config()
        })
        .unwrap();
        rt.start().unwrap();
        let report = rt.shutdown();
        assert!(report.thread_joined);
        assert!(report.total_ms < 5_000, "shutdown took {}ms", report.total_ms);
    }

    #[test]
    fn drop_triggers_shutdown() {
        let rt = RealtimeControl::new(test_config()).unwrap();
        rt.start().unwrap();
        drop(rt);
        // If this doesn't hang, shutdown worked.
    }
}
