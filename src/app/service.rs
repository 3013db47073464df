//! Application service — the hexagonal core.
//!
//! [`Controller`] owns the sensor hub, both trigger sets and the phase
//! tracker.  All I/O flows through port traits injected at call sites,
//! making the whole loop testable with mock adapters.
//!
//! ```text
//!  AcquisitionPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                      │       Controller        │ ──▶ NotifierPort (×N)
//!        IdleTimer ──▶ │  Hub · Triggers · FSM   │ ──▶ WateringPort
//!       StopSignal ──▶ └────────────────────────┘
//! ```

use core::fmt::Write as _;
use core::time::Duration;

use futures_lite::future;
use heapless::{String, Vec};
use log::{debug, info, warn};

use crate::config::{ControllerConfig, MAX_SENSORS};
use crate::error::{ActuationError, ConfigError, NotifyError};
use crate::fsm::{Phase, PhaseTracker};
use crate::sensors::moisture::{MoistureSensor, SensorId};
use crate::sensors::{ReadPass, SensorHub};

use super::events::{AppEvent, CycleSummary};
use super::ports::{AcquisitionPort, EventSink, IdleTimer, NotifierPort, WateringPort};
use super::stop::StopSignal;
use super::triggers::{self, FirstReading, TriggerSet};

/// Upper bound on one aggregate notification body.
pub const MAX_MESSAGE_LEN: usize = 512;

pub type Message = String<MAX_MESSAGE_LEN>;

// ───────────────────────────────────────────────────────────────
// Cycle results
// ───────────────────────────────────────────────────────────────

/// Everything one completed cycle observed and did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 1-based number of this cycle.
    pub cycle: u64,
    pub pass: ReadPass,
    /// Sensors selected by the notify trigger set.
    pub notify_set: Vec<SensorId, MAX_SENSORS>,
    /// Sensors selected by the water trigger set.
    pub water_set: Vec<SensorId, MAX_SENSORS>,
    /// Channels that accepted the aggregate notification.
    pub channels_ok: usize,
    /// Channels that rejected it.  Not retried.
    pub channels_failed: usize,
    /// `None` when nothing was selected for watering.
    pub watering: Option<Result<(), ActuationError>>,
}

impl CycleReport {
    fn summary(&self) -> CycleSummary {
        CycleSummary {
            cycle: self.cycle,
            read_ok: self.pass.readings.len() + self.pass.recorded.len(),
            read_failed: self.pass.failures.len(),
            notified: if self.channels_ok > 0 { self.notify_set.len() } else { 0 },
            watered: match self.watering {
                Some(Ok(())) => self.water_set.len(),
                _ => 0,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// A stop request was seen between phases; the cycle was abandoned.
    Interrupted,
}

/// Why [`Controller::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoppedBy {
    StopRequested,
    CycleLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed cycles over the controller's lifetime.
    pub cycles: u64,
    pub stopped_by: StoppedBy,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    hub: SensorHub,
    phases: PhaseTracker,
    notify_on: TriggerSet,
    water_on: TriggerSet,
    first_reading: FirstReading,
    idle_period: Duration,
    cycles: u64,
}

impl Controller {
    /// Validate `config` and build one sensor per entry, all in `Startup`.
    ///
    /// Emits nothing; call [`start`](Self::start) next.
    pub fn new(config: &ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let sensors: Vec<MoistureSensor, MAX_SENSORS> = config
            .sensors
            .iter()
            .map(|s| {
                MoistureSensor::new(
                    s.id,
                    s.channel,
                    s.dry_threshold,
                    s.wet_threshold,
                    s.mode,
                    config.adc,
                )
            })
            .collect();

        Ok(Self {
            hub: SensorHub::new(sensors),
            phases: PhaseTracker::new(),
            notify_on: config.notify_on,
            water_on: config.water_on,
            first_reading: config.first_reading(),
            idle_period: config.idle_period(),
            cycles: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            sensors: self.hub.len(),
        });
        info!(
            "Controller started: {} sensors, notify_on=0b{:05b}, water_on=0b{:05b}, idle={}s",
            self.hub.len(),
            self.notify_on.bits(),
            self.water_on.bits(),
            self.idle_period.as_secs()
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one cycle: read → evaluate → notify → water.
    ///
    /// Both selections are computed once, after the read pass, and every
    /// dispatch in the cycle sees that same snapshot.  The stop signal is
    /// checked before reading and before each dispatch phase.
    pub fn run_cycle(
        &mut self,
        acq: &mut impl AcquisitionPort,
        notifiers: &mut [&mut dyn NotifierPort],
        water: &mut impl WateringPort,
        sink: &mut impl EventSink,
        stop: &StopSignal,
    ) -> CycleOutcome {
        if stop.is_requested() {
            return self.abandon(sink);
        }
        let cycle = self.cycles + 1;

        // 1. Reading
        self.enter(Phase::Reading, sink);
        let pass = self.hub.read_all(acq);
        self.report_pass(&pass, sink);

        // 2. Evaluating
        self.enter(Phase::Evaluating, sink);
        let sensors = self.hub.sensors();
        let notify_set = triggers::select(sensors, self.notify_on, self.first_reading);
        let water_set = triggers::select(sensors, self.water_on, self.first_reading);
        debug!(
            "cycle {}: notify={:?} water={:?}",
            cycle,
            notify_set.as_slice(),
            water_set.as_slice()
        );

        // 3. Notifying
        let mut channels_ok = 0;
        let mut channels_failed = 0;
        if !notify_set.is_empty() {
            if stop.is_requested() {
                return self.abandon(sink);
            }
            self.enter(Phase::Notifying, sink);
            (channels_ok, channels_failed) = self.dispatch_notification(&notify_set, notifiers, sink);
            self.enter(Phase::Evaluating, sink);
        }

        // 4. Watering
        let mut watering = None;
        if !water_set.is_empty() {
            if stop.is_requested() {
                return self.abandon(sink);
            }
            self.enter(Phase::Watering, sink);
            let result = water.trigger_watering(&water_set);
            match result {
                Ok(()) => sink.emit(&AppEvent::WateringTriggered {
                    sensors: water_set.clone(),
                }),
                Err(error) => {
                    warn!("watering failed: {}", error);
                    sink.emit(&AppEvent::WateringFailed { error });
                }
            }
            watering = Some(result);
            self.enter(Phase::Evaluating, sink);
        }

        self.cycles = cycle;
        let report = CycleReport {
            cycle,
            pass,
            notify_set,
            water_set,
            channels_ok,
            channels_failed,
            watering,
        };
        sink.emit(&AppEvent::CycleCompleted(report.summary()));
        CycleOutcome::Completed(report)
    }

    /// Cycle forever (or `limit` cycles), idling between them.
    ///
    /// The idle suspension is raced against `stop`; a stop request that
    /// arrives mid-idle wakes the loop immediately.  No idle follows the
    /// final cycle of a limited run.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &mut self,
        acq: &mut impl AcquisitionPort,
        notifiers: &mut [&mut dyn NotifierPort],
        water: &mut impl WateringPort,
        sink: &mut impl EventSink,
        timer: &mut impl IdleTimer,
        stop: &StopSignal,
        limit: Option<u64>,
    ) -> RunSummary {
        let mut ran = 0u64;
        let stopped_by = loop {
            if limit.is_some_and(|n| ran >= n) {
                break StoppedBy::CycleLimit;
            }

            match self.run_cycle(acq, notifiers, water, sink, stop) {
                CycleOutcome::Completed(_) => ran += 1,
                CycleOutcome::Interrupted => break StoppedBy::StopRequested,
            }

            if limit.is_some_and(|n| ran >= n) {
                break StoppedBy::CycleLimit;
            }

            self.enter(Phase::Idling, sink);
            let period = self.idle_period;
            let stopped = future::or(
                async {
                    stop.wait().await;
                    true
                },
                async {
                    timer.idle(period).await;
                    false
                },
            )
            .await;

            if stopped {
                self.abandon(sink);
                break StoppedBy::StopRequested;
            }
        };

        sink.emit(&AppEvent::Stopped {
            cycles: self.cycles,
        });
        info!("Controller stopped after {} cycles ({:?})", self.cycles, stopped_by);
        RunSummary {
            cycles: self.cycles,
            stopped_by,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phases.current()
    }

    pub fn phase_entries(&self, phase: Phase) -> u64 {
        self.phases.entries(phase)
    }

    pub fn sensors(&self) -> &[MoistureSensor] {
        self.hub.sensors()
    }

    /// Completed cycles since construction.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    pub fn idle_period(&self) -> Duration {
        self.idle_period
    }

    // ── Internal ──────────────────────────────────────────────

    fn enter(&mut self, next: Phase, sink: &mut impl EventSink) {
        if let Some(from) = self.phases.enter(next) {
            sink.emit(&AppEvent::PhaseChanged { from, to: next });
        }
    }

    /// Drop whatever the cycle was doing; the next call starts fresh.
    fn abandon(&mut self, sink: &mut impl EventSink) -> CycleOutcome {
        info!("stop requested during {}", self.phases.current().name());
        self.enter(Phase::Startup, sink);
        CycleOutcome::Interrupted
    }

    fn report_pass(&self, pass: &ReadPass, sink: &mut impl EventSink) {
        for reading in &pass.readings {
            if let Some(sensor) = self.hub.get(reading.sensor) {
                sink.emit(&AppEvent::Classified {
                    reading: *reading,
                    condition: sensor.current_condition(),
                    changed: sensor.did_change(),
                });
            }
        }
        for reading in &pass.recorded {
            sink.emit(&AppEvent::Recorded(*reading));
        }
        for &(sensor, error) in &pass.failures {
            sink.emit(&AppEvent::AcquisitionFailed { sensor, error });
        }
    }

    /// Send one aggregate message on every channel.  Returns
    /// `(delivered, failed)` channel counts.
    fn dispatch_notification(
        &self,
        selected: &[SensorId],
        notifiers: &mut [&mut dyn NotifierPort],
        sink: &mut impl EventSink,
    ) -> (usize, usize) {
        let message = match compose_message(&self.hub, selected) {
            Ok(m) => m,
            Err(error) => {
                warn!("notification not composed: {}", error);
                for n in notifiers.iter() {
                    sink.emit(&AppEvent::NotificationFailed {
                        channel: channel_name(n.channel()),
                        error,
                    });
                }
                return (0, notifiers.len());
            }
        };

        let mut ok = 0;
        let mut failed = 0;
        for n in notifiers.iter_mut() {
            let channel = channel_name(n.channel());
            match n.send(&message) {
                Ok(()) => {
                    ok += 1;
                    sink.emit(&AppEvent::NotificationSent {
                        channel,
                        sensors: selected.iter().copied().collect(),
                    });
                }
                Err(error) => {
                    failed += 1;
                    warn!("notification on {} failed: {}", channel, error);
                    sink.emit(&AppEvent::NotificationFailed { channel, error });
                }
            }
        }
        (ok, failed)
    }
}

/// Build the aggregate notification body: one line per selected sensor.
pub fn compose_message(hub: &SensorHub, selected: &[SensorId]) -> Result<Message, NotifyError> {
    let mut msg = Message::new();
    writeln!(msg, "PlantBot: {} sensor(s) changed condition", selected.len())
        .map_err(|_| NotifyError::MessageTooLong)?;

    for sensor in selected.iter().filter_map(|&id| hub.get(id)) {
        let vwc = sensor.last_vwc().unwrap_or(f32::NAN) * 100.0;
        writeln!(
            msg,
            "sensor {}: {} (was {}), VWC {:.1}%",
            sensor.id(),
            sensor.current_condition(),
            sensor.previous_condition(),
            vwc
        )
        .map_err(|_| NotifyError::MessageTooLong)?;
    }
    Ok(msg)
}

fn channel_name(name: &str) -> String<16> {
    let mut out = String::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
