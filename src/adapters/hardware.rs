//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! [`ProbeBank`] serves [`AcquisitionPort`] from the ADC1 oneshot unit;
//! [`ValveDriver`] and [`NoopValve`] serve [`WateringPort`].  On
//! non-espidf targets the probe bank reads per-channel atomics that tests
//! and the host binary inject via [`sim_set_raw`] / [`sim_set_failure`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::{AcquisitionPort, WateringPort};
use crate::config::ValveConfig;
use crate::drivers::hw_init::{HwDelay, HwPin};
use crate::drivers::valve::ValveDriver;
use crate::error::{AcquisitionError, ActuationError};
use crate::sensors::calibration::AdcScale;
use crate::sensors::moisture::SensorId;

/// ADC1 channels on the ESP32-S3.
pub const ADC1_CHANNELS: usize = 10;

/// ESP-IDF generic failure code, reported for simulated read faults.
#[cfg(not(target_os = "espidf"))]
const SIM_READ_FAILURE: i32 = -1;

#[cfg(not(target_os = "espidf"))]
#[allow(clippy::declare_interior_mutable_const)]
const SIM_ZERO: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_RAW: [AtomicU16; ADC1_CHANNELS] = [SIM_ZERO; ADC1_CHANNELS];
#[cfg(not(target_os = "espidf"))]
static SIM_FAILING: AtomicU32 = AtomicU32::new(0);

/// Inject the raw sample returned for `channel` (simulation only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_raw(channel: u32, raw: u16) {
    if let Some(slot) = SIM_RAW.get(channel as usize) {
        slot.store(raw, Ordering::Relaxed);
    }
}

/// Make reads on `channel` fail until cleared (simulation only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_failure(channel: u32, failing: bool) {
    let bit = 1u32 << (channel % 32);
    if failing {
        SIM_FAILING.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_FAILING.fetch_and(!bit, Ordering::Relaxed);
    }
}

// ── Probe bank ────────────────────────────────────────────────

/// Every VH400 probe behind one ADC unit.
pub struct ProbeBank {
    scale: AdcScale,
    reads: u64,
}

impl ProbeBank {
    pub fn new(scale: AdcScale) -> Self {
        Self { scale, reads: 0 }
    }

    /// Successful acquisitions since construction.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self, channel: u32) -> Result<u16, AcquisitionError> {
        crate::drivers::hw_init::adc1_read(channel).map_err(AcquisitionError::AdcReadFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self, channel: u32) -> Result<u16, AcquisitionError> {
        if SIM_FAILING.load(Ordering::Relaxed) & (1u32 << (channel % 32)) != 0 {
            return Err(AcquisitionError::AdcReadFailed(SIM_READ_FAILURE));
        }
        Ok(SIM_RAW[channel as usize].load(Ordering::Relaxed))
    }
}

impl AcquisitionPort for ProbeBank {
    fn acquire(&mut self, channel: u32) -> Result<u16, AcquisitionError> {
        if channel as usize >= ADC1_CHANNELS {
            return Err(AcquisitionError::ChannelUnavailable(channel));
        }
        let raw = self.read_raw(channel)?;
        if raw > self.scale.max_raw {
            return Err(AcquisitionError::OutOfRange(raw));
        }
        self.reads += 1;
        Ok(raw)
    }
}

// ── Watering ──────────────────────────────────────────────────

/// Watering hook for boards without a valve: logs and succeeds.
#[derive(Debug, Default)]
pub struct NoopValve {
    triggered: u32,
}

impl NoopValve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggered(&self) -> u32 {
        self.triggered
    }
}

impl WateringPort for NoopValve {
    fn trigger_watering(&mut self, sensors: &[SensorId]) -> Result<(), ActuationError> {
        self.triggered += 1;
        info!("watering requested for sensors {:?} (no valve fitted)", sensors);
        Ok(())
    }
}

/// One shared valve: a single pulse waters every selected sensor's bed.
impl<P: OutputPin, D: DelayNs> WateringPort for ValveDriver<P, D> {
    fn trigger_watering(&mut self, sensors: &[SensorId]) -> Result<(), ActuationError> {
        info!(
            "valve: {} ms pulse for sensors {:?}",
            self.pulse_ms(),
            sensors
        );
        self.pulse().inspect_err(|e| {
            warn!("valve pulse failed: {}", e);
            // Never leave the valve open after a failed pulse.
            let _ = self.close();
        })
    }
}

/// The board's watering hook, chosen once from configuration.
pub enum BoardValve {
    None(NoopValve),
    Fitted(ValveDriver<HwPin, HwDelay>),
}

impl BoardValve {
    pub fn from_config(valve: Option<ValveConfig>) -> Self {
        match valve {
            Some(v) => Self::Fitted(ValveDriver::new(HwPin(v.gpio), HwDelay, v.pulse_ms)),
            None => Self::None(NoopValve::new()),
        }
    }
}

impl WateringPort for BoardValve {
    fn trigger_watering(&mut self, sensors: &[SensorId]) -> Result<(), ActuationError> {
        match self {
            Self::None(v) => v.trigger_watering(sensors),
            Self::Fitted(v) => v.trigger_watering(sensors),
        }
    }
}
