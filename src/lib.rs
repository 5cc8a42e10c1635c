//! Cyclic exerciser for a DC-motor-driven slide on a linear guideway.
//!
//! This library drives an H-bridge style motor driver with PWM signals,
//! alternating the rotation direction for a configured number of half-cycles
//! and then leaving the motor in a de-energized, disabled state. It is used
//! to move a slide back and forth for measurement and calibration runs in a
//! lab setting.
//!
//! The hardware is reached exclusively through the [`PinBackend`] trait, so
//! any backend exposing digital and PWM pin writes (the real GPIO peripheral,
//! a simulator, a test double) is interchangeable.

pub mod backend;
pub mod config;
pub mod controller;
pub mod direction;
mod errors;

pub use backend::{GpioBackend, Level, PinBackend};
pub use config::{MotionConfig, MotorPins};
pub use controller::{MotionController, RunOutcome};
pub use direction::Direction;
pub use errors::Error;

/// Maximum rated voltage of the DC motor; equals the 12 V driver supply.
pub const MAX_VOLTAGE: f64 = 12.0;

/// BCM pin wired to the forward direction input (M1) of the motor driver.
pub const FORWARD_PIN: u8 = 20;
/// BCM pin wired to the reverse direction input (M2) of the motor driver.
pub const REVERSE_PIN: u8 = 21;
/// BCM pin gating the driver output stage (D1).
pub const ENABLE_PIN: u8 = 26;

/// Default PWM carrier frequency in Hz.
pub const DEFAULT_PWM_FREQUENCY: f64 = 4000.0;
/// Default PWM duty-cycle resolution in bits (8 bit -> duty range 0..=255).
pub const DEFAULT_PWM_RESOLUTION: u8 = 8;
