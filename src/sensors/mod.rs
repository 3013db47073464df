//! Sensor subsystem — the VH400 converter, per-probe state machine, and the
//! aggregating [`SensorHub`].
//!
//! The hub owns every sensor and runs one read pass per control cycle.

pub mod calibration;
pub mod moisture;
pub mod stats;

use heapless::Vec;
use log::warn;

use crate::app::ports::AcquisitionPort;
use crate::config::MAX_SENSORS;
use crate::error::AcquisitionError;
use moisture::{Mode, MoistureSensor, Reading, SensorId};

/// Result of reading every sensor once.
#[derive(Debug, Clone, Default)]
pub struct ReadPass {
    /// Classified readings from `Normal` sensors.
    pub readings: Vec<Reading, MAX_SENSORS>,
    /// Unclassified samples from `Record` sensors.
    pub recorded: Vec<Reading, MAX_SENSORS>,
    /// Sensors whose acquisition failed this pass.
    pub failures: Vec<(SensorId, AcquisitionError), MAX_SENSORS>,
}

/// Owns every sensor in a stable order.
pub struct SensorHub {
    sensors: Vec<MoistureSensor, MAX_SENSORS>,
}

impl SensorHub {
    pub fn new(sensors: Vec<MoistureSensor, MAX_SENSORS>) -> Self {
        Self { sensors }
    }

    /// Read every sensor once, in collection order.
    ///
    /// Individual read failures are logged and that sensor keeps its
    /// previous condition.
    pub fn read_all(&mut self, acq: &mut impl AcquisitionPort) -> ReadPass {
        let mut pass = ReadPass::default();

        for sensor in &mut self.sensors {
            let result = match sensor.mode() {
                Mode::Normal => sensor.read(acq).map(|r| {
                    let _ = pass.readings.push(r);
                }),
                Mode::Record => sensor.sample(acq).map(|r| {
                    let _ = pass.recorded.push(r);
                }),
                Mode::RecordRange => Ok(()),
            };

            if let Err(e) = result {
                warn!("sensor {} (ch {}): {}", sensor.id(), sensor.channel(), e);
                let _ = pass.failures.push((sensor.id(), e));
            }
        }

        pass
    }

    pub fn sensors(&self) -> &[MoistureSensor] {
        &self.sensors
    }

    pub fn get(&self, id: SensorId) -> Option<&MoistureSensor> {
        self.sensors.iter().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
