//! Static run configuration and the duty-cycle arithmetic derived from it.

use std::time::Duration;

use crate::direction::Direction;
use crate::{
    DEFAULT_PWM_FREQUENCY, DEFAULT_PWM_RESOLUTION, ENABLE_PIN, Error, FORWARD_PIN, MAX_VOLTAGE,
    REVERSE_PIN,
};

/// BCM pin assignment of the motor driver interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MotorPins {
    /// Forward direction input (M1).
    pub forward: u8,
    /// Reverse direction input (M2).
    pub reverse: u8,
    /// Enable input gating the driver output stage (D1).
    pub enable: u8,
}

impl Default for MotorPins {
    fn default() -> Self {
        Self {
            forward: FORWARD_PIN,
            reverse: REVERSE_PIN,
            enable: ENABLE_PIN,
        }
    }
}

/// Immutable parameters of one exercising run.
///
/// All values must be set before [`MotionController::initialize`] is called;
/// nothing is reconfigurable mid-run.
///
/// [`MotionController::initialize`]: crate::MotionController::initialize
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionConfig {
    /// Pin assignment of the motor driver.
    pub pins: MotorPins,
    /// Voltage applied to the motor, 0..=12 V.
    pub voltage: f64,
    /// PWM carrier frequency in Hz.
    pub pwm_frequency: f64,
    /// PWM duty-cycle resolution in bits.
    pub pwm_resolution: u8,
    /// Time the motor is driven during each movement.
    pub drive_time: Duration,
    /// Pause between two consecutive movements of the slide.
    pub pause_time: Duration,
    /// Direction of the first movement.
    pub start_direction: Direction,
    /// Number of back-and-forth cycles; fractional in half-cycle steps.
    pub cycles: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pins: MotorPins::default(),
            voltage: 6.0,
            pwm_frequency: DEFAULT_PWM_FREQUENCY,
            pwm_resolution: DEFAULT_PWM_RESOLUTION,
            drive_time: Duration::from_secs(2),
            pause_time: Duration::from_secs(2),
            start_direction: Direction::Forward,
            cycles: 3.0,
        }
    }
}

impl MotionConfig {
    /// Checks the run preconditions.
    ///
    /// # Errors
    /// Returns `Error::InvalidValue` if the voltage is outside 0..=12 V, the
    /// cycle count is not positive, the resolution is outside 1..=16 bits, or
    /// the three driver pins are not pairwise distinct.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=MAX_VOLTAGE).contains(&self.voltage) {
            return Err(Error::InvalidValue);
        }
        if self.cycles.is_nan() || self.cycles <= 0.0 {
            return Err(Error::InvalidValue);
        }
        if !(1..=16).contains(&self.pwm_resolution) {
            return Err(Error::InvalidValue);
        }
        let pins = self.pins;
        if pins.forward == pins.reverse || pins.forward == pins.enable || pins.reverse == pins.enable
        {
            return Err(Error::InvalidValue);
        }
        Ok(())
    }

    /// Full-scale duty value for the configured resolution (`2^bits - 1`).
    #[must_use]
    pub fn full_scale(&self) -> u32 {
        (1_u32 << u32::from(self.pwm_resolution)) - 1
    }

    /// Duty cycle corresponding to the configured voltage.
    ///
    /// Scales the voltage against the 12 V rated maximum onto the full-scale
    /// value and rounds half away from zero, so 127.5 becomes 128.
    #[must_use]
    pub fn duty_cycle(&self) -> u32 {
        let duty = f64::from(self.full_scale()) / MAX_VOLTAGE * self.voltage;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (duty + 0.5) as u32
        }
    }

    /// Number of single-direction drive phases in the run.
    ///
    /// One cycle is a movement in each direction, so 2.5 cycles is 5 phases.
    #[must_use]
    pub fn half_cycles(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (self.cycles * 2.0).round() as u32
        }
    }
}
