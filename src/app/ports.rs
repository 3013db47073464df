//! Port traits — the hexagonal boundary between the control loop and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (probes, notifiers, valves, event sinks, timers)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the domain core never touches hardware,
//! mail servers or wall-clock time directly.
//!
//! Every fallible port returns a typed error.  The controller reports
//! failures and keeps cycling; none of them are fatal.

use core::future::Future;
use core::time::Duration;

use crate::error::{AcquisitionError, ActuationError, NotifyError};
use crate::sensors::moisture::SensorId;

// ───────────────────────────────────────────────────────────────
// Acquisition port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: a sensor calls this to obtain one raw sample.
pub trait AcquisitionPort {
    /// Sample the probe on `channel`.  The result is a raw integer in the
    /// converter's `0..=max_raw` range.
    fn acquire(&mut self, channel: u32) -> Result<u16, AcquisitionError>;
}

// ───────────────────────────────────────────────────────────────
// Notification port (driven adapter: domain → user)
// ───────────────────────────────────────────────────────────────

/// One notification channel (mail, SMS gateway, log, ...).
pub trait NotifierPort {
    /// Short channel name used in logs and events.
    fn channel(&self) -> &str;

    /// Deliver one text message.
    fn send(&mut self, message: &str) -> Result<(), NotifyError>;
}

// ───────────────────────────────────────────────────────────────
// Watering port (driven adapter: domain → valve)
// ───────────────────────────────────────────────────────────────

/// Write-side port: invoked at most once per cycle with every sensor
/// whose transition selected it for watering.  Per-sensor valve
/// addressing is the adapter's business.
pub trait WateringPort {
    fn trigger_watering(&mut self, sensors: &[SensorId]) -> Result<(), ActuationError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Idle timer port (driven adapter: domain → time)
// ───────────────────────────────────────────────────────────────

/// Suspension between cycles.
///
/// The returned future must be cancel-safe: the controller races it
/// against the stop signal and drops it if the stop wins.  Test doubles
/// complete immediately and record the requested period.
pub trait IdleTimer {
    fn idle(&mut self, period: Duration) -> impl Future<Output = ()>;
}
