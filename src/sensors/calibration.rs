//! VH400 signal converter.
//!
//! Two pure steps:
//!
//! 1. [`AdcScale::to_volts`] — raw ADC counts mapped linearly onto the
//!    probe's output voltage range.
//! 2. [`convert`] — voltage to volumetric water content (percent) via the
//!    manufacturer's five-segment piecewise-linear curve.
//!
//! ```text
//!   VWC %
//!    50 ┤                                   ╱
//!       │                              ╱╱╱╱
//!    40 ┤                         ╱╱╱╱
//!       │                  ╱╱╱╱╱╱
//!    10 ┤          ╱╱╱╱╱╱╱
//!     0 ┼─────────┬────┬──────┬─────┬──────── V
//!            1.1  1.3   1.82  2.2
//! ```

use serde::{Deserialize, Serialize};

/// Linear mapping from raw ADC counts to volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdcScale {
    /// Raw count corresponding to full scale (e.g. 1023 for a 10-bit ADC).
    pub max_raw: u16,
    /// Voltage at full scale.
    pub max_volts: f32,
}

impl Default for AdcScale {
    fn default() -> Self {
        Self {
            max_raw: 1023,
            max_volts: 3.0,
        }
    }
}

impl AdcScale {
    /// Convert a raw sample to volts.
    pub fn to_volts(&self, raw: u16) -> f32 {
        raw as f32 * (self.max_volts / self.max_raw as f32)
    }
}

/// Convert a probe voltage to volumetric water content in percent.
///
/// Segment upper bounds are inclusive.  Any result `<= 0` (including
/// negative voltages, which are outside the probe's output range) is
/// reported as exactly `0.0`.
pub fn convert(volts: f32) -> f32 {
    let vwc = if volts <= 1.1 {
        10.0 * volts - 1.0
    } else if volts <= 1.3 {
        25.0 * volts - 17.5
    } else if volts <= 1.82 {
        48.08 * volts - 47.5
    } else if volts <= 2.2 {
        26.32 * volts - 7.89
    } else {
        62.5 * volts - 87.5
    };

    if vwc <= 0.0 { 0.0 } else { vwc }
}

/// Percent to the fractional VWC used by the classification thresholds.
pub fn percent_to_fraction(percent: f32) -> f32 {
    percent / 100.0
}
