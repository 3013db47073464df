//! Mock adapters for integration tests.
//!
//! Every port records its full call history so tests can assert on what
//! the controller did, in order, without touching GPIO or the ADC.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::time::Duration;

use plantbot::app::events::AppEvent;
use plantbot::app::ports::{AcquisitionPort, EventSink, IdleTimer, NotifierPort, WateringPort};
use plantbot::app::stop::StopSignal;
use plantbot::error::{AcquisitionError, ActuationError, NotifyError};
use plantbot::fsm::Phase;
use plantbot::sensors::moisture::SensorId;

// ── Raw samples at the default 1023 → 3.0 V scale ─────────────

/// ~0.50 V → 4.0 % VWC → dry
pub const RAW_0V5: u16 = 171;
/// 1.00 V → 9.0 % VWC → dry
pub const RAW_1V0: u16 = 341;
/// ~1.20 V → 12.5 % VWC → wet
pub const RAW_1V2: u16 = 409;
/// ~2.50 V → 68.8 % VWC → ok
pub const RAW_2V5: u16 = 853;

// ── Acquisition ───────────────────────────────────────────────

/// Per-channel scripted samples.  Each channel plays its queue in order,
/// then repeats its last value.
#[derive(Default)]
pub struct ScriptedProbes {
    queues: HashMap<u32, VecDeque<Result<u16, AcquisitionError>>>,
    last: HashMap<u32, Result<u16, AcquisitionError>>,
    pub calls: Vec<u32>,
}

#[allow(dead_code)]
impl ScriptedProbes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant sample on `channel`.
    pub fn set(&mut self, channel: u32, raw: u16) -> &mut Self {
        self.queues.remove(&channel);
        self.last.insert(channel, Ok(raw));
        self
    }

    /// Queue one sample per cycle on `channel`.
    pub fn script(&mut self, channel: u32, raws: &[u16]) -> &mut Self {
        self.queues
            .entry(channel)
            .or_default()
            .extend(raws.iter().map(|&r| Ok(r)));
        self
    }

    /// Queue a single failed read on `channel`.
    pub fn fail_next(&mut self, channel: u32, error: AcquisitionError) -> &mut Self {
        self.queues.entry(channel).or_default().push_back(Err(error));
        self
    }
}

impl AcquisitionPort for ScriptedProbes {
    fn acquire(&mut self, channel: u32) -> Result<u16, AcquisitionError> {
        self.calls.push(channel);
        if let Some(next) = self.queues.get_mut(&channel).and_then(VecDeque::pop_front) {
            if next.is_ok() {
                self.last.insert(channel, next);
            }
            return next;
        }
        self.last
            .get(&channel)
            .copied()
            .unwrap_or(Err(AcquisitionError::ChannelUnavailable(channel)))
    }
}

// ── Notification ──────────────────────────────────────────────

pub struct RecordingNotifier {
    name: &'static str,
    pub messages: Vec<String>,
    pub fail_with: Option<NotifyError>,
    pub attempts: usize,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            messages: Vec::new(),
            fail_with: None,
            attempts: 0,
        }
    }

    pub fn failing(name: &'static str, error: NotifyError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(name)
        }
    }
}

impl NotifierPort for RecordingNotifier {
    fn channel(&self) -> &str {
        self.name
    }

    fn send(&mut self, message: &str) -> Result<(), NotifyError> {
        self.attempts += 1;
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.messages.push(message.to_owned());
        Ok(())
    }
}

// ── Watering ──────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingValve {
    pub calls: Vec<Vec<SensorId>>,
    pub fail_with: Option<ActuationError>,
}

#[allow(dead_code)]
impl RecordingValve {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WateringPort for RecordingValve {
    fn trigger_watering(&mut self, sensors: &[SensorId]) -> Result<(), ActuationError> {
        self.calls.push(sensors.to_vec());
        match self.fail_with {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every phase entered, in order.
    pub fn phases(&self) -> Vec<Phase> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Idle timers ───────────────────────────────────────────────

/// Completes immediately; records every requested period.
#[derive(Default)]
pub struct VirtualTimer {
    pub requested: Vec<Duration>,
}

#[allow(dead_code)]
impl VirtualTimer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdleTimer for VirtualTimer {
    fn idle(&mut self, period: Duration) -> impl Future<Output = ()> {
        self.requested.push(period);
        async {}
    }
}

/// Raises a stop request on the `nth` idle (1-based), then never elapses,
/// so only the stop signal can end that idle.
pub struct StopOnIdle<'a> {
    pub stop: &'a StopSignal,
    pub nth: usize,
    pub idles: usize,
}

impl IdleTimer for StopOnIdle<'_> {
    fn idle(&mut self, _period: Duration) -> impl Future<Output = ()> {
        self.idles += 1;
        let fire = self.idles >= self.nth;
        let stop = self.stop;
        async move {
            if fire {
                stop.request();
                std::future::pending::<()>().await;
            }
        }
    }
}
