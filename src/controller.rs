//! The motion controller: direction-alternation loop and safety shutdown.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::Error;
use crate::backend::{Level, PinBackend};
use crate::config::MotionConfig;
use crate::direction::Direction;

/// How often the timed waits poll the operator stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How a run of the motion loop ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All configured half-cycles were driven.
    Completed,
    /// The operator requested a stop; the in-progress phase was abandoned.
    Interrupted,
}

/// Drives the motor back and forth for the configured number of half-cycles,
/// then guarantees a de-energized, disabled driver.
///
/// The controller exclusively owns the hardware handle for the lifetime of
/// the run. Dropping it without an explicit [`shutdown`](Self::shutdown) and
/// [`release`](Self::release) performs both best-effort, so no exit path can
/// leave the motor energized.
pub struct MotionController<B: PinBackend> {
    backend: B,
    config: MotionConfig,
    stop: Arc<AtomicBool>,
    released: bool,
}

impl<B: PinBackend> MotionController<B> {
    /// Takes ownership of a connected backend and prepares the driver:
    /// enable line high, PWM carrier configured on both direction lines.
    ///
    /// # Errors
    /// Returns `Error::InvalidValue` if the configuration fails its
    /// preconditions (checked before any pin is touched), or a backend error
    /// if a pin write fails.
    pub fn initialize(
        backend: B,
        config: MotionConfig,
        stop: Arc<AtomicBool>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let mut controller = Self {
            backend,
            config,
            stop,
            released: false,
        };
        let pins = controller.config.pins;
        controller.backend.set_line(pins.enable, Level::High)?;
        controller
            .backend
            .set_pwm_frequency(pins.forward, controller.config.pwm_frequency)?;
        controller
            .backend
            .set_pwm_frequency(pins.reverse, controller.config.pwm_frequency)?;
        Ok(controller)
    }

    /// Runs the direction-alternation loop.
    ///
    /// Each phase drives one direction line with the computed duty cycle for
    /// the drive time while the opposite line is held at 0 V, then stops the
    /// drive and flips direction. Phases are separated by the pause time;
    /// the final phase is never followed by a pause. The operator stop flag
    /// is observed at every phase boundary and inside the timed waits.
    ///
    /// # Errors
    /// Propagates backend write failures. An operator stop is not an error;
    /// it yields `RunOutcome::Interrupted`.
    pub fn run_cycles(&mut self) -> Result<RunOutcome, Error> {
        let duty = self.config.duty_cycle();
        let phases = self.config.half_cycles();
        let mut direction = self.config.start_direction;

        for phase in 0..phases {
            if self.stop.load(Ordering::Relaxed) {
                return Ok(RunOutcome::Interrupted);
            }

            let (active, inactive) = self.direction_pins(direction);
            // Hold the opposite line at 0 V before energizing: the H-bridge
            // must never see both direction inputs active.
            self.backend.set_line(inactive, Level::Low)?;
            self.backend.set_pwm_duty_cycle(active, duty)?;
            let drive_finished = self.wait(self.config.drive_time);
            self.backend.set_pwm_duty_cycle(active, 0)?;
            if !drive_finished {
                return Ok(RunOutcome::Interrupted);
            }

            direction = direction.opposite();
            if phase + 1 < phases && !self.wait(self.config.pause_time) {
                return Ok(RunOutcome::Interrupted);
            }
        }
        Ok(RunOutcome::Completed)
    }

    /// Leaves the motor de-energized and the driver disabled.
    ///
    /// Strict order: enable line high (a disabled driver may ignore line
    /// writes), both direction lines to 0 V, enable line low. Idempotent.
    ///
    /// # Errors
    /// Propagates backend write failures.
    pub fn shutdown(&mut self) -> Result<(), Error> {
        let pins = self.config.pins;
        self.backend.set_line(pins.enable, Level::High)?;
        self.backend.set_line(pins.forward, Level::Low)?;
        self.backend.set_line(pins.reverse, Level::Low)?;
        self.backend.set_line(pins.enable, Level::Low)?;
        Ok(())
    }

    /// Releases the hardware handle. Subsequent calls are no-ops, so the
    /// backend is disconnected exactly once on every exit path.
    ///
    /// # Errors
    /// Propagates a backend disconnect failure.
    pub fn release(&mut self) -> Result<(), Error> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.backend.disconnect()
    }

    fn direction_pins(&self, direction: Direction) -> (u8, u8) {
        let pins = self.config.pins;
        match direction {
            Direction::Forward => (pins.forward, pins.reverse),
            Direction::Reverse => (pins.reverse, pins.forward),
        }
    }

    /// Sleeps for `total`, polling the stop flag. Returns `false` if the
    /// wait was cut short by an operator stop.
    fn wait(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(STOP_POLL_INTERVAL));
        }
    }
}

impl<B: PinBackend> Drop for MotionController<B> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.shutdown();
            let _ = self.release();
        }
    }
}

impl<B: PinBackend> fmt::Debug for MotionController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionController")
            .field("config", &self.config)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}
