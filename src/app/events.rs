//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use heapless::Vec;

use crate::config::MAX_SENSORS;
use crate::error::{AcquisitionError, ActuationError, NotifyError};
use crate::fsm::Phase;
use crate::sensors::moisture::{Condition, Reading, SensorId};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller has started (carries the sensor count).
    Started { sensors: usize },

    /// The controller moved between phases.
    PhaseChanged { from: Phase, to: Phase },

    /// A `Normal` sensor produced a classified reading.
    Classified {
        reading: Reading,
        condition: Condition,
        changed: bool,
    },

    /// A `Record` sensor was sampled.
    Recorded(Reading),

    /// A probe could not be read; its condition was kept.
    AcquisitionFailed {
        sensor: SensorId,
        error: AcquisitionError,
    },

    /// The aggregate notification was delivered on one channel.
    NotificationSent {
        channel: heapless::String<16>,
        sensors: Vec<SensorId, MAX_SENSORS>,
    },

    /// One notification channel failed.  Not retried.
    NotificationFailed {
        channel: heapless::String<16>,
        error: NotifyError,
    },

    /// The watering hook ran for these sensors.
    WateringTriggered { sensors: Vec<SensorId, MAX_SENSORS> },

    /// The watering hook failed.  Not retried.
    WateringFailed { error: ActuationError },

    /// A cycle finished all of its phases.
    CycleCompleted(CycleSummary),

    /// The loop observed a stop request.
    Stopped { cycles: u64 },
}

/// Compact per-cycle digest for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub read_ok: usize,
    pub read_failed: usize,
    pub notified: usize,
    pub watered: usize,
}
