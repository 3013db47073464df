//! Batch sampling statistics for probe calibration.
//!
//! Diagnostic only — the control loop never calls into this module.
//! [`Samples`] is a finite, restartable sequence of readings; [`record_range`]
//! folds it into mean / population standard deviation for raw counts,
//! volts and VWC.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use super::moisture::{MoistureSensor, Reading};
use crate::app::ports::AcquisitionPort;
use crate::error::{self, AcquisitionError, Error};

/// Upper bound on samples per batch (fixed-capacity buffer).
pub const MAX_SAMPLES: usize = 256;

/// Mean and standard deviation of one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingStats {
    pub samples: usize,
    pub mean_raw: f32,
    pub mean_volts: f32,
    pub mean_vwc: f32,
    pub sd_raw: f32,
    pub sd_volts: f32,
    pub sd_vwc: f32,
}

/// Iterator over `count` samples from one sensor.
///
/// Uses [`MoistureSensor::sample`], so the sensor's condition history is
/// left alone.  Call [`Samples::restart`] to run the same batch again.
pub struct Samples<'a, A: AcquisitionPort> {
    sensor: &'a MoistureSensor,
    acq: &'a mut A,
    count: usize,
    taken: usize,
}

impl<'a, A: AcquisitionPort> Samples<'a, A> {
    pub fn new(sensor: &'a MoistureSensor, acq: &'a mut A, count: usize) -> Self {
        Self {
            sensor,
            acq,
            count,
            taken: 0,
        }
    }

    pub fn restart(&mut self) {
        self.taken = 0;
    }
}

impl<A: AcquisitionPort> Iterator for Samples<'_, A> {
    type Item = Result<Reading, AcquisitionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.taken >= self.count {
            return None;
        }
        self.taken += 1;
        Some(self.sensor.sample(&mut *self.acq))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.taken;
        (left, Some(left))
    }
}

/// Take `count` samples `delay_ms` apart and summarise them.
///
/// Fails on the first acquisition error.  `count` is clamped to
/// [`MAX_SAMPLES`]; a zero count is rejected as an empty batch.
pub fn record_range(
    sensor: &MoistureSensor,
    acq: &mut impl AcquisitionPort,
    count: usize,
    delay: &mut impl DelayNs,
    delay_ms: u32,
) -> error::Result<ReadingStats> {
    let count = count.min(MAX_SAMPLES);
    if count == 0 {
        return Err(Error::NoSamples);
    }

    let mut batch: Vec<Reading, MAX_SAMPLES> = Vec::new();
    for (i, reading) in Samples::new(sensor, acq, count).enumerate() {
        let reading = reading?;
        // Capacity equals the clamp above.
        let _ = batch.push(reading);
        if i + 1 < count {
            delay.delay_ms(delay_ms);
        }
    }

    Ok(summarise(&batch))
}

fn summarise(batch: &[Reading]) -> ReadingStats {
    let (mean_raw, sd_raw) = mean_sd(batch, |r| r.raw as f32);
    let (mean_volts, sd_volts) = mean_sd(batch, |r| r.volts);
    let (mean_vwc, sd_vwc) = mean_sd(batch, |r| r.vwc);

    ReadingStats {
        samples: batch.len(),
        mean_raw,
        mean_volts,
        mean_vwc,
        sd_raw,
        sd_volts,
        sd_vwc,
    }
}

fn mean_sd(batch: &[Reading], field: impl Fn(&Reading) -> f32) -> (f32, f32) {
    let n = batch.len() as f32;
    let mean = batch.iter().map(&field).sum::<f32>() / n;
    let var = batch.iter().map(|r| (field(r) - mean).powi(2)).sum::<f32>() / n;
    (mean, var.sqrt())
}
