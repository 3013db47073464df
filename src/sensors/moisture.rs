//! VH400 soil-moisture sensor.
//!
//! Each sensor owns its calibration and a two-slot condition history.
//! [`MoistureSensor::read`] is the only mutator: it acquires a raw sample,
//! converts it, classifies it and shifts `current` into `previous`.
//!
//! ```text
//!  STARTUP ──[first read]──▶ DRY | WET | OK | BAD_READ
//!                               ▲                  │
//!                               └──[each read]─────┘
//! ```
//!
//! `Startup` is only ever the initial value.  Classification can never
//! produce it, so it cannot be re-entered.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::calibration::{self, AdcScale};
use crate::app::ports::AcquisitionPort;
use crate::error::AcquisitionError;

/// Stable sensor identity.
pub type SensorId = u8;

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Classified soil condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Condition {
    /// No reading has completed yet.
    Startup = 0,
    Ok = 1,
    Dry = 2,
    Wet = 3,
    /// VWC matched no other class (e.g. NaN from a broken probe).
    BadRead = 4,
}

impl Condition {
    /// Every condition, in discriminant order.
    pub const ALL: [Condition; 5] = [
        Condition::Startup,
        Condition::Ok,
        Condition::Dry,
        Condition::Wet,
        Condition::BadRead,
    ];

    /// Bit for this condition inside a [`TriggerSet`](crate::app::triggers::TriggerSet).
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Ok => "ok",
            Self::Dry => "dry",
            Self::Wet => "wet",
            Self::BadRead => "bad_read",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Acquisition strategy.  Only `Normal` sensors take part in triggering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Normal,
    /// Sampled every cycle for the log, never classified.
    Record,
    /// Left alone by the loop; driven by the batch statistics tool.
    RecordRange,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One acquired sample with its derived values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub sensor: SensorId,
    pub raw: u16,
    pub volts: f32,
    /// Volumetric water content in percent (converter output).
    pub vwc_percent: f32,
    /// Volumetric water content as a fraction, compared against thresholds.
    pub vwc: f32,
}

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

pub struct MoistureSensor {
    id: SensorId,
    channel: u32,
    dry_threshold: f32,
    wet_threshold: f32,
    mode: Mode,
    scale: AdcScale,
    current: Condition,
    previous: Condition,
    last_vwc: Option<f32>,
}

impl MoistureSensor {
    /// Build a sensor in the `Startup` condition.
    ///
    /// Threshold ordering is not checked here; see
    /// [`ControllerConfig::validate`](crate::config::ControllerConfig::validate).
    pub fn new(
        id: SensorId,
        channel: u32,
        dry_threshold: f32,
        wet_threshold: f32,
        mode: Mode,
        scale: AdcScale,
    ) -> Self {
        Self {
            id,
            channel,
            dry_threshold,
            wet_threshold,
            mode,
            scale,
            current: Condition::Startup,
            previous: Condition::Startup,
            last_vwc: None,
        }
    }

    /// Acquire and convert one sample without touching condition state.
    pub fn sample(&self, acq: &mut impl AcquisitionPort) -> Result<Reading, AcquisitionError> {
        let raw = acq.acquire(self.channel)?;
        if raw > self.scale.max_raw {
            return Err(AcquisitionError::OutOfRange(raw));
        }
        let volts = self.scale.to_volts(raw);
        let vwc_percent = calibration::convert(volts);
        Ok(Reading {
            sensor: self.id,
            raw,
            volts,
            vwc_percent,
            vwc: calibration::percent_to_fraction(vwc_percent),
        })
    }

    /// Acquire, convert, classify and store.
    ///
    /// On acquisition failure the condition and last VWC are kept and the
    /// history settles (`previous = current`), so the edge seen by the
    /// last good read is not reported a second time.
    pub fn read(&mut self, acq: &mut impl AcquisitionPort) -> Result<Reading, AcquisitionError> {
        let reading = match self.sample(acq) {
            Ok(reading) => reading,
            Err(e) => {
                self.previous = self.current;
                return Err(e);
            }
        };
        self.previous = self.current;
        self.current = self.classify(reading.vwc);
        self.last_vwc = Some(reading.vwc);
        Ok(reading)
    }

    /// Order-sensitive classification.  The dry check runs first, so a
    /// value at or below both thresholds is `Dry`.
    pub fn classify(&self, vwc: f32) -> Condition {
        if vwc <= self.dry_threshold {
            Condition::Dry
        } else if vwc <= self.wet_threshold {
            Condition::Wet
        } else if vwc > 0.0 {
            Condition::Ok
        } else {
            Condition::BadRead
        }
    }

    /// `true` iff the last read moved the sensor to a different condition.
    /// Always `false` straight after the first read.
    pub fn did_change(&self) -> bool {
        if self.previous == Condition::Startup {
            return false;
        }
        self.current != self.previous
    }

    /// `true` once, straight after the first successful read.
    pub fn is_first_reading(&self) -> bool {
        self.previous == Condition::Startup && self.current != Condition::Startup
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn current_condition(&self) -> Condition {
        self.current
    }

    pub fn previous_condition(&self) -> Condition {
        self.previous
    }

    /// VWC fraction from the last successful read.
    pub fn last_vwc(&self) -> Option<f32> {
        self.last_vwc
    }
}
