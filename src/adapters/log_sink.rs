//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (ESP-IDF console in production, `env_logger` on the host).
//! Every line starts with a fixed tag so serial captures can be grepped.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted += 1;
        match event {
            AppEvent::Started { sensors } => {
                info!("START | sensors={}", sensors);
            }
            AppEvent::PhaseChanged { from, to } => {
                debug!("PHASE | {} -> {}", from.name(), to.name());
            }
            AppEvent::Classified {
                reading,
                condition,
                changed,
            } => {
                info!(
                    "COND | sensor={} | raw={} | {:.3}V | VWC={:.1}% | {}{}",
                    reading.sensor,
                    reading.raw,
                    reading.volts,
                    reading.vwc_percent,
                    condition,
                    if *changed { " (changed)" } else { "" },
                );
            }
            AppEvent::Recorded(reading) => {
                info!(
                    "COND | sensor={} | raw={} | {:.3}V | VWC={:.1}% | recorded",
                    reading.sensor, reading.raw, reading.volts, reading.vwc_percent,
                );
            }
            AppEvent::AcquisitionFailed { sensor, error } => {
                warn!("COND | sensor={} | read failed: {}", sensor, error);
            }
            AppEvent::NotificationSent { channel, sensors } => {
                info!("NOTIFY | {} | sensors={:?}", channel, sensors.as_slice());
            }
            AppEvent::NotificationFailed { channel, error } => {
                warn!("NOTIFY | {} | failed: {}", channel, error);
            }
            AppEvent::WateringTriggered { sensors } => {
                info!("WATER | sensors={:?}", sensors.as_slice());
            }
            AppEvent::WateringFailed { error } => {
                warn!("WATER | failed: {}", error);
            }
            AppEvent::CycleCompleted(s) => {
                info!(
                    "CYCLE | #{} | read={} failed={} | notified={} watered={}",
                    s.cycle, s.read_ok, s.read_failed, s.notified, s.watered,
                );
            }
            AppEvent::Stopped { cycles } => {
                info!("STOP | after {} cycles", cycles);
            }
        }
    }
}
