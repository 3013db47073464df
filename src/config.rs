//! Controller configuration.
//!
//! Loaded once at process start (JSON file on the host, defaults on the
//! device) and validated by [`ControllerConfig::validate`] before the
//! controller is built.  Nothing is re-validated while the loop runs.

use core::time::Duration;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::app::triggers::{FirstReading, TriggerSet};
use crate::error::ConfigError;
use crate::sensors::calibration::AdcScale;
use crate::sensors::moisture::{Condition, Mode, SensorId};

/// Maximum number of probes one controller drives.
pub const MAX_SENSORS: usize = 8;
/// Maximum notification recipients.
pub const MAX_RECIPIENTS: usize = 4;

/// Reference soil thresholds (VWC fraction).
pub const DRY_THRESHOLD: f32 = 0.10;
pub const WET_THRESHOLD: f32 = 0.25;

/// Reference pause between cycles.
pub const DEFAULT_IDLE_SECS: u32 = 120;

/// One probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub id: SensorId,
    /// ADC channel (device) or simulation slot (host).
    pub channel: u32,
    pub dry_threshold: f32,
    pub wet_threshold: f32,
    #[serde(default)]
    pub mode: Mode,
}

impl SensorConfig {
    pub fn normal(id: SensorId, channel: u32) -> Self {
        Self {
            id,
            channel,
            dry_threshold: DRY_THRESHOLD,
            wet_threshold: WET_THRESHOLD,
            mode: Mode::Normal,
        }
    }
}

/// Mail / SMS-gateway notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailConfig {
    pub sender: String<64>,
    pub recipients: Vec<String<64>, MAX_RECIPIENTS>,
}

/// Watering valve on a GPIO.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValveConfig {
    pub gpio: i32,
    /// How long the valve stays open per watering event.
    pub pulse_ms: u32,
}

/// Full controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Probes ---
    pub sensors: Vec<SensorConfig, MAX_SENSORS>,
    pub adc: AdcScale,

    // --- Actions ---
    /// Conditions whose entry sends a notification.
    pub notify_on: TriggerSet,
    /// Conditions whose entry triggers watering.
    pub water_on: TriggerSet,
    /// Treat each sensor's first classification as a transition.
    pub trigger_on_first_reading: bool,

    // --- Timing ---
    /// Pause between the end of one cycle and the start of the next.
    pub idle_period_secs: u32,

    // --- Collaborators ---
    pub mail: Option<MailConfig>,
    pub valve: Option<ValveConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let mut sensors = Vec::new();
        let _ = sensors.push(SensorConfig::normal(0, 0));
        let _ = sensors.push(SensorConfig::normal(1, 1));

        Self {
            sensors,
            adc: AdcScale::default(),

            notify_on: TriggerSet::of(&[Condition::Dry, Condition::Wet]),
            water_on: TriggerSet::of(&[Condition::Dry]),
            trigger_on_first_reading: false,

            idle_period_secs: DEFAULT_IDLE_SECS,

            mail: None,
            valve: None,
        }
    }
}

impl ControllerConfig {
    pub fn idle_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.idle_period_secs))
    }

    pub fn first_reading(&self) -> FirstReading {
        if self.trigger_on_first_reading {
            FirstReading::Trigger
        } else {
            FirstReading::Ignore
        }
    }

    /// Reject configurations the control loop cannot run meaningfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }

        for (i, s) in self.sensors.iter().enumerate() {
            if self.sensors[..i].iter().any(|o| o.id == s.id) {
                return Err(ConfigError::DuplicateSensor(s.id));
            }
            let ordered = 0.0 <= s.dry_threshold
                && s.dry_threshold < s.wet_threshold
                && s.wet_threshold <= 1.0;
            if !ordered {
                return Err(ConfigError::ThresholdOrder(s.id));
            }
        }

        if self.notify_on.contains(Condition::Startup) {
            return Err(ConfigError::ValidationFailed("notify_on may not contain startup"));
        }
        if self.water_on.contains(Condition::Startup) {
            return Err(ConfigError::ValidationFailed("water_on may not contain startup"));
        }
        if self.idle_period_secs == 0 {
            return Err(ConfigError::ValidationFailed("idle_period_secs must be > 0"));
        }
        if self.adc.max_raw == 0 || self.adc.max_volts <= 0.0 {
            return Err(ConfigError::ValidationFailed("adc scale must be positive"));
        }
        if let Some(mail) = &self.mail {
            if mail.recipients.is_empty() {
                return Err(ConfigError::ValidationFailed("mail.recipients is empty"));
            }
        }

        Ok(())
    }
}
