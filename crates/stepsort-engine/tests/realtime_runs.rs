//! Runs driven by the control thread while observers poll snapshots.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use stepsort_core::Stage;
use stepsort_engine::{
    Control, ControlConfig, ControlSnapshot, ControlState, RealtimeControl, Selection, SubmitError,
};
use stepsort_test_utils::{init_tracing, is_ascending};

fn config(sort: &str) -> ControlConfig {
    ControlConfig {
        main_array_len: 64,
        steps_per_tick: 8,
        seed: 11,
        sort: Selection::named(sort),
        ..Default::default()
    }
}

fn wait_until(
    rt: &RealtimeControl,
    what: &str,
    pred: impl Fn(&ControlSnapshot) -> bool,
) -> Arc<ControlSnapshot> {
    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        let snap = rt.snapshot();
        if pred(&snap) {
            return snap;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn observers_see_consistent_snapshots_while_running() {
    init_tracing();
    let rt = Arc::new(RealtimeControl::new(config("Odd-Even Merge Sort")).unwrap());
    rt.start().unwrap();

    let observers: Vec<_> = (0..3)
        .map(|_| {
            let rt = Arc::clone(&rt);
            thread::spawn(move || {
                let mut last_reads = 0;
                let mut frames = 0;
                while frames < 200 {
                    let snap = rt.snapshot();
                    // Whole-run counters only grow until the run ends.
                    if snap.state == ControlState::Running {
                        assert!(snap.storage.stats.reads >= last_reads);
                        last_reads = snap.storage.stats.reads;
                    }
                    assert_eq!(snap.storage.main_array().len(), 64);
                    frames += 1;
                    thread::sleep(Duration::from_micros(200));
                }
            })
        })
        .collect();
    for o in observers {
        o.join().unwrap();
    }

    let snap = wait_until(&rt, "run to finish", |s| s.last_report.is_some());
    let report = snap.last_report.as_ref().unwrap();
    assert!(report.passed(), "{report:?}");
    assert!(is_ascending(snap.storage.main_array()));
}

#[test]
fn hot_swap_through_the_channel() {
    let rt = RealtimeControl::new(ControlConfig {
        step_delay: Duration::from_micros(100),
        steps_per_tick: 1,
        ..config("Merge Sort")
    })
    .unwrap();
    rt.start().unwrap();
    wait_until(&rt, "merge scratch array", |s| s.storage.array_count() > 1);

    assert_eq!(rt.pause_play(), Ok(ControlState::Paused));
    assert!(matches!(
        rt.select_sort("Sleep Sort", &[]),
        Err(SubmitError::Rejected(_))
    ));
    assert_eq!(rt.select_sort("Pigeonhole Sort", &[]), Ok(ControlState::Paused));
    wait_until(&rt, "storage reset", |s| {
        s.storage.array_count() == 1 && s.steps == 0
    });

    rt.set_steps_per_tick(64).unwrap();
    assert_eq!(rt.pause_play(), Ok(ControlState::Running));
    let snap = wait_until(&rt, "pigeonhole to finish", |s| s.last_report.is_some());
    assert_eq!(snap.last_report.as_ref().unwrap().sort, "Pigeonhole Sort");
}

#[test]
fn pause_holds_the_step_count() {
    let rt = RealtimeControl::new(ControlConfig {
        step_delay: Duration::from_micros(200),
        steps_per_tick: 1,
        ..config("Bubble Sort")
    })
    .unwrap();
    rt.start().unwrap();
    wait_until(&rt, "some steps", |s| s.steps > 10);
    assert_eq!(rt.pause_play(), Ok(ControlState::Paused));
    let held = rt.snapshot().steps;
    thread::sleep(Duration::from_millis(30));
    assert_eq!(rt.snapshot().steps, held);
    assert!(rt.snapshot().stage.is_some());
    assert_eq!(rt.pause_play(), Ok(ControlState::Running));
    wait_until(&rt, "progress after resume", |s| s.steps > held);
}

#[test]
fn settings_are_validated_on_the_control_thread() {
    let rt = RealtimeControl::new(config("Bubble Sort")).unwrap();
    assert!(matches!(
        rt.set_main_array_len(0),
        Err(SubmitError::Rejected(_))
    ));
    assert!(matches!(
        rt.set_steps_per_tick(0),
        Err(SubmitError::Rejected(_))
    ));
    assert_eq!(rt.set_main_array_len(10), Ok(ControlState::Constructed));
    wait_until(&rt, "length change", |s| s.storage.main_array().len() == 10);
    assert_eq!(
        rt.set_step_delay(Duration::from_millis(1)),
        Ok(ControlState::Constructed)
    );
}

#[test]
fn shutdown_hands_back_the_control() {
    let rt = RealtimeControl::new(config("Insertion Sort")).unwrap();
    rt.start().unwrap();
    wait_until(&rt, "run to finish", |s| s.last_report.is_some());

    let control: Control = rt.into_control().unwrap();
    assert_eq!(control.state(), ControlState::Stopped);
    assert!(control.last_report().unwrap().passed());
    assert_eq!(control.selection(Stage::Sort).name, "Insertion Sort");
}

#[test]
fn spawning_from_a_lockstep_control_keeps_its_selection() {
    let mut lockstep = Control::new(config("Bubble Sort")).unwrap();
    lockstep.select_sort("Gravity Sort", &[]).unwrap();
    let mut rt = RealtimeControl::spawn(lockstep).unwrap();
    rt.start().unwrap();
    let snap = wait_until(&rt, "run to finish", |s| s.last_report.is_some());
    assert_eq!(snap.last_report.as_ref().unwrap().sort, "Gravity Sort");
    let report = rt.shutdown();
    assert!(report.thread_joined);
    assert_eq!(report.finished_runs, 1);
    assert_eq!(report.failed_runs, 0);
    assert!(report.ticks > 0);
}
