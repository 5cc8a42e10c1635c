//! Integration tests driving the motion controller against a recording
//! backend double. No hardware required.


use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use guideway_exerciser::{
    Direction, ENABLE_PIN, Error, FORWARD_PIN, Level, MotionConfig, MotionController, REVERSE_PIN,
    RunOutcome,
};
use test_utils::{
    MockBackend, assert_single_drive_active, count_disconnects, count_shutdown_sequences,
    drive_sequence, replay_state,
};

/// Configuration with waits short enough for tests.
fn fast_config(cycles: f64, start_direction: Direction) -> MotionConfig {
    MotionConfig {
        drive_time: Duration::from_millis(1),
        pause_time: Duration::from_millis(1),
        start_direction,
        cycles,
        ..MotionConfig::default()
    }
}

fn no_stop() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[test]
fn three_cycles_alternate_directions() {
    let (backend, log) = MockBackend::new();
    let config = fast_config(3.0, Direction::Forward);
    let mut controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    let outcome = controller.run_cycles().unwrap();
    controller.shutdown().unwrap();
    controller.release().unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(
        drive_sequence(&log),
        [
            FORWARD_PIN,
            REVERSE_PIN,
            FORWARD_PIN,
            REVERSE_PIN,
            FORWARD_PIN,
            REVERSE_PIN
        ]
    );
}

#[test]
fn fractional_cycle_count_ends_mid_pair() {
    let (backend, log) = MockBackend::new();
    let config = fast_config(2.5, Direction::Forward);
    let mut controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    let outcome = controller.run_cycles().unwrap();
    controller.shutdown().unwrap();
    controller.release().unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    // 2.5 cycles = exactly 5 movements, ending on a forward phase.
    assert_eq!(
        drive_sequence(&log),
        [FORWARD_PIN, REVERSE_PIN, FORWARD_PIN, REVERSE_PIN, FORWARD_PIN]
    );
}

#[test]
fn start_direction_is_honored() {
    let (backend, log) = MockBackend::new();
    let config = fast_config(1.0, Direction::Reverse);
    let mut controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    controller.run_cycles().unwrap();
    controller.shutdown().unwrap();
    controller.release().unwrap();

    assert_eq!(drive_sequence(&log), [REVERSE_PIN, FORWARD_PIN]);
}

#[test]
fn direction_lines_are_mutually_exclusive() {
    let (backend, log) = MockBackend::new();
    let config = fast_config(3.0, Direction::Forward);
    let mut controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    controller.run_cycles().unwrap();
    controller.shutdown().unwrap();
    controller.release().unwrap();

    assert_single_drive_active(&log, FORWARD_PIN, REVERSE_PIN);
}

#[test]
fn final_phase_has_no_trailing_pause() {
    let (backend, _log) = MockBackend::new();
    let config = MotionConfig {
        drive_time: Duration::from_millis(1),
        pause_time: Duration::from_millis(200),
        cycles: 0.5,
        ..MotionConfig::default()
    };
    let mut controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    // A single movement must not be followed by the 200 ms pause.
    let started = Instant::now();
    let outcome = controller.run_cycles().unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
    assert!(
        started.elapsed() < Duration::from_millis(100),
        "trailing pause after the final phase"
    );
}

#[test]
fn pause_separates_consecutive_phases() {
    let (backend, _log) = MockBackend::new();
    let config = MotionConfig {
        drive_time: Duration::from_millis(1),
        pause_time: Duration::from_millis(150),
        cycles: 1.0,
        ..MotionConfig::default()
    };
    let mut controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    let started = Instant::now();
    controller.run_cycles().unwrap();
    assert!(
        started.elapsed() >= Duration::from_millis(150),
        "missing pause between the two phases of a cycle"
    );
}

#[test]
fn shutdown_is_idempotent() {
    let (backend, log) = MockBackend::new();
    let config = fast_config(1.0, Direction::Forward);
    let mut controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    controller.shutdown().unwrap();
    let (levels_once, duties_once) = replay_state(&log);
    controller.shutdown().unwrap();
    let (levels_twice, duties_twice) = replay_state(&log);

    assert_eq!(levels_once, levels_twice);
    assert_eq!(duties_once, duties_twice);
    assert_eq!(levels_twice[&FORWARD_PIN], Level::Low);
    assert_eq!(levels_twice[&REVERSE_PIN], Level::Low);
    assert_eq!(levels_twice[&ENABLE_PIN], Level::Low);

    controller.release().unwrap();
}

#[test]
fn interrupt_during_drive_wait_shuts_down_once() {
    let stop = no_stop();
    let (mut backend, log) = MockBackend::new();
    // Phase 3 of a 3-cycle run is the 5th nonzero duty write; the flag trips
    // while that phase's drive wait is in progress.
    backend.stop_on_drive(5, Arc::clone(&stop));

    let config = MotionConfig {
        drive_time: Duration::from_millis(50),
        pause_time: Duration::from_millis(1),
        cycles: 3.0,
        ..MotionConfig::default()
    };
    let mut controller = MotionController::initialize(backend, config, stop).unwrap();

    let outcome = controller.run_cycles().unwrap();
    controller.shutdown().unwrap();
    controller.release().unwrap();
    drop(controller);

    assert_eq!(outcome, RunOutcome::Interrupted);
    assert_eq!(
        drive_sequence(&log),
        [FORWARD_PIN, REVERSE_PIN, FORWARD_PIN, REVERSE_PIN, FORWARD_PIN]
    );
    assert_eq!(
        count_shutdown_sequences(&log, FORWARD_PIN, REVERSE_PIN, ENABLE_PIN),
        1
    );
    assert_eq!(count_disconnects(&log), 1);
}

#[test]
fn stop_before_first_phase_drives_nothing() {
    let stop = no_stop();
    stop.store(true, std::sync::atomic::Ordering::Relaxed);

    let (backend, log) = MockBackend::new();
    let config = fast_config(3.0, Direction::Forward);
    let mut controller = MotionController::initialize(backend, config, stop).unwrap();

    let outcome = controller.run_cycles().unwrap();
    assert_eq!(outcome, RunOutcome::Interrupted);
    assert!(drive_sequence(&log).is_empty());

    controller.shutdown().unwrap();
    controller.release().unwrap();
}

#[test]
fn unavailable_hardware_touches_no_pins() {
    let result = MockBackend::connect(false);
    assert!(matches!(result, Err(Error::HardwareUnavailable)));

    // A failing acquisition leaves nothing to clean up and no pin was
    // touched; the binary maps this to a non-zero exit.
    let (backend, log) = MockBackend::new();
    drop(backend);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn invalid_config_is_rejected_before_any_pin_write() {
    let (backend, log) = MockBackend::new();
    let config = MotionConfig {
        voltage: 13.0,
        ..fast_config(3.0, Direction::Forward)
    };
    let result = MotionController::initialize(backend, config, no_stop());
    assert!(matches!(result, Err(Error::InvalidValue)));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn dropped_controller_shuts_down_and_releases() {
    let (backend, log) = MockBackend::new();
    let config = fast_config(1.0, Direction::Forward);
    let controller = MotionController::initialize(backend, config, no_stop()).unwrap();

    drop(controller);

    assert_eq!(
        count_shutdown_sequences(&log, FORWARD_PIN, REVERSE_PIN, ENABLE_PIN),
        1
    );
    assert_eq!(count_disconnects(&log), 1);
}
