//! Solenoid valve driver.
//!
//! Opens the valve for a fixed pulse, then closes it.  Generic over the
//! `embedded-hal` output pin and delay so the same driver runs on the
//! board (`HwPin` + `HwDelay`) and against test doubles.
//!
//! The driver is a dumb actuator: *when* to water is the controller's
//! decision.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::ActuationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveState {
    Closed,
    Open,
}

pub struct ValveDriver<P, D> {
    pin: P,
    delay: D,
    pulse_ms: u32,
    state: ValveState,
    pulses: u32,
}

impl<P: OutputPin, D: DelayNs> ValveDriver<P, D> {
    pub fn new(pin: P, delay: D, pulse_ms: u32) -> Self {
        Self {
            pin,
            delay,
            pulse_ms,
            state: ValveState::Closed,
            pulses: 0,
        }
    }

    /// Open for `pulse_ms`, then close.  Blocks for the whole pulse.
    pub fn pulse(&mut self) -> Result<(), ActuationError> {
        self.open()?;
        self.delay.delay_ms(self.pulse_ms);
        self.close()?;
        self.pulses = self.pulses.wrapping_add(1);
        Ok(())
    }

    pub fn open(&mut self) -> Result<(), ActuationError> {
        self.pin.set_high().map_err(|_| ActuationError::PinWriteFailed)?;
        self.state = ValveState::Open;
        Ok(())
    }

    /// Close the valve.  State is updated only once the pin write succeeds.
    pub fn close(&mut self) -> Result<(), ActuationError> {
        self.pin.set_low().map_err(|_| ActuationError::PinWriteFailed)?;
        self.state = ValveState::Closed;
        Ok(())
    }

    pub fn state(&self) -> ValveState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ValveState::Open
    }

    /// Completed open/close pulses since construction.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }
}
