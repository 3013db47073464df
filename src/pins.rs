//! GPIO / ADC assignments for the PlantBot controller board.
//!
//! Single source of truth for the device build.  The JSON config used on
//! the host may override channels; the device takes these values.

use crate::sensors::calibration::AdcScale;

// ---------------------------------------------------------------------------
// Moisture probes — Analog (ADC1)
// ---------------------------------------------------------------------------

/// VH400 probe 0.  ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const PROBE0_ADC_CHANNEL: u32 = 3;
/// VH400 probe 1.  ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const PROBE1_ADC_CHANNEL: u32 = 4;

/// Probe channels in sensor-id order.
pub const PROBE_ADC_CHANNELS: [u32; 2] = [PROBE0_ADC_CHANNEL, PROBE1_ADC_CHANNEL];

/// 12-bit oneshot at 12 dB attenuation.
pub const PROBE_ADC_SCALE: AdcScale = AdcScale {
    max_raw: 4095,
    max_volts: 3.1,
};

// ---------------------------------------------------------------------------
// Irrigation
// ---------------------------------------------------------------------------

/// Digital output: solenoid valve driver (active HIGH).
pub const VALVE_GPIO: i32 = 2;
/// Default valve open time per watering event.
pub const VALVE_PULSE_MS: u32 = 5_000;
