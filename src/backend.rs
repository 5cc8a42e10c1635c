//! Pin-control backend contract and the Raspberry Pi GPIO implementation.
//!
//! The controller depends on exactly four operations: drive a line high or
//! low, set a PWM frequency on a line, set a PWM duty cycle on a line, and
//! release the hardware. [`GpioBackend`] implements them with `rppal`
//! software PWM on ordinary GPIO lines.

use std::collections::HashMap;

use rppal::gpio::{Gpio, OutputPin};

use crate::Error;
use crate::config::MotionConfig;

/// Digital line state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Level {
    /// 0 V.
    Low = 0,
    /// Logic high.
    High = 1,
}

/// Contract of the pin-control hardware.
///
/// Any backend exposing these four operations is interchangeable: the real
/// GPIO peripheral, a simulator, or a recording test double.
pub trait PinBackend {
    /// Drives a digital line to the given level. Cancels PWM on that line.
    fn set_line(&mut self, pin: u8, level: Level) -> Result<(), Error>;

    /// Sets the PWM carrier frequency on a line.
    fn set_pwm_frequency(&mut self, pin: u8, hz: f64) -> Result<(), Error>;

    /// Sets the PWM duty cycle on a line, on the configured full scale.
    /// A duty of 0 stops driving the line.
    fn set_pwm_duty_cycle(&mut self, pin: u8, duty: u32) -> Result<(), Error>;

    /// Releases the hardware, leaving all claimed lines low.
    fn disconnect(&mut self) -> Result<(), Error>;
}

#[derive(Debug)]
struct PwmLine {
    pin: OutputPin,
    frequency: f64,
}

/// Real backend claiming the three driver lines through `rppal`.
///
/// The duty signal is software PWM, which matches the original lab setup
/// closely enough for a 4 kHz carrier; the direction lines are ordinary
/// GPIOs, not the Pi's two hardware PWM channels.
#[derive(Debug)]
pub struct GpioBackend {
    lines: HashMap<u8, PwmLine>,
    full_scale: u32,
}

impl GpioBackend {
    /// Claims the configured pins from the GPIO peripheral, all output low.
    ///
    /// # Errors
    /// Returns `Error::HardwareUnavailable` if the GPIO character device
    /// cannot be opened or a pin cannot be claimed. No line has been touched
    /// when this fails.
    pub fn connect(config: &MotionConfig) -> Result<Self, Error> {
        let gpio = Gpio::new().map_err(|_| Error::HardwareUnavailable)?;
        let mut lines = HashMap::new();
        for pin in [config.pins.forward, config.pins.reverse, config.pins.enable] {
            let output = gpio
                .get(pin)
                .map_err(|_| Error::HardwareUnavailable)?
                .into_output_low();
            lines.insert(
                pin,
                PwmLine {
                    pin: output,
                    frequency: config.pwm_frequency,
                },
            );
        }
        Ok(Self {
            lines,
            full_scale: config.full_scale(),
        })
    }

    fn line(&mut self, pin: u8) -> Result<&mut PwmLine, Error> {
        self.lines.get_mut(&pin).ok_or(Error::InvalidValue)
    }
}

impl PinBackend for GpioBackend {
    fn set_line(&mut self, pin: u8, level: Level) -> Result<(), Error> {
        let line = self.line(pin)?;
        line.pin.clear_pwm().map_err(|_| Error::HardwareUnavailable)?;
        match level {
            Level::Low => line.pin.set_low(),
            Level::High => line.pin.set_high(),
        }
        Ok(())
    }

    fn set_pwm_frequency(&mut self, pin: u8, hz: f64) -> Result<(), Error> {
        let line = self.line(pin)?;
        line.frequency = hz;
        // Start the carrier at zero duty; the line stays at 0 V until a
        // nonzero duty cycle is applied.
        line.pin
            .set_pwm_frequency(hz, 0.0)
            .map_err(|_| Error::HardwareUnavailable)
    }

    fn set_pwm_duty_cycle(&mut self, pin: u8, duty: u32) -> Result<(), Error> {
        let full_scale = self.full_scale;
        let line = self.line(pin)?;
        let fraction = f64::from(duty.min(full_scale)) / f64::from(full_scale);
        line.pin
            .set_pwm_frequency(line.frequency, fraction)
            .map_err(|_| Error::HardwareUnavailable)
    }

    fn disconnect(&mut self) -> Result<(), Error> {
        for line in self.lines.values_mut() {
            let _ = line.pin.clear_pwm();
            line.pin.set_low();
        }
        self.lines.clear();
        Ok(())
    }
}
