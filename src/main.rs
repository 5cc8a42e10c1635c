//! Exercises the slide on the linear guideway: drives the DC motor back and
//! forth for a fixed number of cycles, then halts it safely.
//!
//! All parameters default to the constants below; each setting can be
//! overridden through an environment variable (or a `.env` file), e.g.
//! `GUIDEWAY_VOLTAGE=4.5 GUIDEWAY_CYCLES=2.5 guideway-exerciser`.
//!
//! Ctrl-C stops the run cleanly: the in-progress movement is abandoned, the
//! motor is de-energized and the process exits with code 0.

use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use guideway_exerciser::{
    Direction, Error, GpioBackend, MotionConfig, MotionController, RunOutcome,
};

/// Voltage for the DC motor [V], between 0 and 12 V (supply is always 12 V).
const VOLTAGE: f64 = 6.0;
/// Time to drive the DC motor for each movement.
const DRIVE_TIME: Duration = Duration::from_secs(2);
/// Pause between two consecutive movements (up/down) of the slide.
const PAUSE_TIME: Duration = Duration::from_secs(2);
/// Direction of the first movement of the slide.
const START_DIRECTION: Direction = Direction::Forward;
/// Number of cycles (one movement in each direction per cycle).
const CYCLES: f64 = 3.0;

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    if let Err(err) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        eprintln!("Failed to install Ctrl-C handler: {err}");
        return ExitCode::FAILURE;
    }

    match run(config_from_env(), stop) {
        Ok(RunOutcome::Completed) => {
            println!("Exiting");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Interrupted) => {
            // Operator stop is a clean outcome, not a failure.
            println!("Run interrupted by operator");
            println!("Exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: MotionConfig, stop: Arc<AtomicBool>) -> Result<RunOutcome, Error> {
    println!(
        "Driving slide at {:.1} V for {} cycles ({} movements)",
        config.voltage,
        config.cycles,
        config.half_cycles()
    );

    let backend = GpioBackend::connect(&config)?;
    let mut controller = MotionController::initialize(backend, config, stop)?;
    let outcome = controller.run_cycles();

    // Shutdown and release run on the interrupted path as well; a failure
    // before release still reaches them through the controller's Drop.
    controller.shutdown()?;
    println!("\nMotor stopped");
    controller.release()?;

    outcome
}

fn config_from_env() -> MotionConfig {
    MotionConfig {
        voltage: env_override("GUIDEWAY_VOLTAGE", VOLTAGE),
        drive_time: duration_override("GUIDEWAY_DRIVE_SECS", DRIVE_TIME),
        pause_time: duration_override("GUIDEWAY_PAUSE_SECS", PAUSE_TIME),
        start_direction: start_direction_from_env(),
        cycles: env_override("GUIDEWAY_CYCLES", CYCLES),
        ..MotionConfig::default()
    }
}

/// Reads an override from the environment, keeping the compile-time default
/// when the variable is unset or malformed.
fn env_override<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Ignoring malformed {key}={raw}");
                default
            }
        },
        Err(_) => default,
    }
}

fn duration_override(key: &str, default: Duration) -> Duration {
    let secs = env_override(key, default.as_secs_f64());
    Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
        eprintln!("Ignoring negative {key}");
        default
    })
}

fn start_direction_from_env() -> Direction {
    match env::var("GUIDEWAY_START_DIRECTION") {
        Ok(raw) => match raw.trim().parse().ok().and_then(Direction::from_index) {
            Some(direction) => direction,
            None => {
                eprintln!("Ignoring malformed GUIDEWAY_START_DIRECTION={raw}");
                START_DIRECTION
            }
        },
        Err(_) => START_DIRECTION,
    }
}
