//! Integration tests for the Controller → triggers → dispatch pipeline.
//!
//! Each test scripts probe samples per cycle, runs `run_cycle` directly
//! and asserts on the recorded notifier / valve / event histories.

use plantbot::app::events::AppEvent;
use plantbot::app::ports::NotifierPort;
use plantbot::app::stop::StopSignal;
use plantbot::app::triggers::TriggerSet;
use plantbot::config::{ControllerConfig, SensorConfig};
use plantbot::error::{AcquisitionError, ActuationError, NotifyError};
use plantbot::fsm::Phase;
use plantbot::sensors::moisture::{Condition, Mode};
use plantbot::{Controller, CycleOutcome, CycleReport};

use crate::mock_ports::{
    RAW_0V5, RAW_1V0, RAW_1V2, RAW_2V5, RecordingNotifier, RecordingSink, RecordingValve,
    ScriptedProbes,
};

// ── Rig ───────────────────────────────────────────────────────

fn config(sensors: u8) -> ControllerConfig {
    let mut c = ControllerConfig::default();
    c.sensors.clear();
    for id in 0..sensors {
        let _ = c.sensors.push(SensorConfig::normal(id, u32::from(id)));
    }
    c
}

struct Rig {
    ctl: Controller,
    probes: ScriptedProbes,
    notifier: RecordingNotifier,
    valve: RecordingValve,
    sink: RecordingSink,
    stop: StopSignal,
}

impl Rig {
    fn new(config: &ControllerConfig) -> Self {
        let mut sink = RecordingSink::new();
        let mut ctl = Controller::new(config).unwrap();
        ctl.start(&mut sink);
        Self {
            ctl,
            probes: ScriptedProbes::new(),
            notifier: RecordingNotifier::new("test"),
            valve: RecordingValve::new(),
            sink,
            stop: StopSignal::new(),
        }
    }

    fn cycle(&mut self) -> CycleReport {
        match self.ctl.run_cycle(
            &mut self.probes,
            &mut [&mut self.notifier],
            &mut self.valve,
            &mut self.sink,
            &self.stop,
        ) {
            CycleOutcome::Completed(report) => report,
            CycleOutcome::Interrupted => panic!("cycle unexpectedly interrupted"),
        }
    }
}

// ── Edge triggering ───────────────────────────────────────────

#[test]
fn dry_fires_once_on_entry_not_while_it_persists() {
    let mut rig = Rig::new(&config(1));
    rig.probes.script(0, &[RAW_2V5, RAW_0V5, RAW_0V5, RAW_0V5]);

    let reports: Vec<CycleReport> = (0..4).map(|_| rig.cycle()).collect();

    assert!(reports[0].notify_set.is_empty());
    assert_eq!(reports[1].notify_set.as_slice(), &[0]);
    assert_eq!(reports[1].water_set.as_slice(), &[0]);
    assert!(reports[2].notify_set.is_empty());
    assert!(reports[3].water_set.is_empty());

    assert_eq!(rig.notifier.messages.len(), 1);
    assert_eq!(rig.valve.calls, vec![vec![0]]);
}

#[test]
fn first_classification_is_silent_by_default() {
    let mut rig = Rig::new(&config(1));
    rig.probes.set(0, RAW_0V5);

    for _ in 0..3 {
        rig.cycle();
    }

    assert_eq!(rig.ctl.sensors()[0].current_condition(), Condition::Dry);
    assert!(rig.notifier.messages.is_empty());
    assert!(rig.valve.calls.is_empty());
}

#[test]
fn first_classification_fires_once_when_enabled() {
    let mut c = config(1);
    c.trigger_on_first_reading = true;
    let mut rig = Rig::new(&c);
    rig.probes.set(0, RAW_0V5);

    let first = rig.cycle();
    rig.cycle();
    rig.cycle();

    assert_eq!(first.notify_set.as_slice(), &[0]);
    assert_eq!(rig.notifier.messages.len(), 1);
    assert!(rig.notifier.messages[0].contains("sensor 0: dry (was startup)"));
    assert_eq!(rig.valve.calls, vec![vec![0]]);
}

#[test]
fn wet_notifies_but_never_waters_by_default() {
    let mut rig = Rig::new(&config(1));
    rig.probes.script(0, &[RAW_2V5, RAW_1V2]);

    rig.cycle();
    let report = rig.cycle();

    assert_eq!(rig.ctl.sensors()[0].current_condition(), Condition::Wet);
    assert_eq!(report.notify_set.as_slice(), &[0]);
    assert!(report.water_set.is_empty());
    assert_eq!(report.watering, None);
    assert!(rig.valve.calls.is_empty());
}

// ── Aggregation ───────────────────────────────────────────────

#[test]
fn simultaneous_transitions_share_one_notification() {
    let mut rig = Rig::new(&config(3));
    rig.probes
        .script(0, &[RAW_2V5, RAW_0V5])
        .script(1, &[RAW_2V5, RAW_1V0])
        .set(2, RAW_2V5);

    rig.cycle();
    let report = rig.cycle();

    assert_eq!(report.notify_set.as_slice(), &[0, 1]);
    assert_eq!(rig.notifier.messages.len(), 1);
    let msg = &rig.notifier.messages[0];
    assert!(msg.contains("sensor 0: dry (was ok)"));
    assert!(msg.contains("sensor 1: dry (was ok)"));
    assert!(!msg.contains("sensor 2"));

    // One watering call covering both sensors.
    assert_eq!(rig.valve.calls, vec![vec![0, 1]]);
}

#[test]
fn message_is_sent_once_per_channel() {
    let mut rig = Rig::new(&config(1));
    rig.probes.script(0, &[RAW_2V5, RAW_0V5]);
    let mut second = RecordingNotifier::new("second");

    for _ in 0..2 {
        rig.ctl.run_cycle(
            &mut rig.probes,
            &mut [&mut rig.notifier, &mut second as &mut dyn NotifierPort],
            &mut rig.valve,
            &mut rig.sink,
            &rig.stop,
        );
    }

    assert_eq!(rig.notifier.messages.len(), 1);
    assert_eq!(second.messages, rig.notifier.messages);
    let sent = rig.sink.count(|e| matches!(e, AppEvent::NotificationSent { .. }));
    assert_eq!(sent, 2);
}

// ── End-to-end calibration scenario ───────────────────────────

#[test]
fn half_volt_one_volt_two_and_a_half_volts() {
    let mut c = config(1);
    c.notify_on.insert(Condition::Ok);
    let mut rig = Rig::new(&c);
    rig.probes.script(0, &[RAW_0V5, RAW_1V0, RAW_2V5]);

    let conditions: Vec<Condition> = (0..3)
        .map(|_| {
            rig.cycle();
            rig.ctl.sensors()[0].current_condition()
        })
        .collect();

    assert_eq!(conditions, [Condition::Dry, Condition::Dry, Condition::Ok]);
    assert_eq!(rig.notifier.messages.len(), 1);
    assert!(rig.notifier.messages[0].contains("sensor 0: ok (was dry)"));
    assert!(rig.valve.calls.is_empty());
}

#[test]
fn half_volt_scenario_with_first_reading_trigger() {
    let mut c = config(1);
    c.notify_on.insert(Condition::Ok);
    c.trigger_on_first_reading = true;
    let mut rig = Rig::new(&c);
    rig.probes.script(0, &[RAW_0V5, RAW_1V0, RAW_2V5]);

    let reports: Vec<CycleReport> = (0..3).map(|_| rig.cycle()).collect();

    assert_eq!(reports[0].notify_set.as_slice(), &[0]);
    assert_eq!(reports[0].water_set.as_slice(), &[0]);
    assert!(reports[1].notify_set.is_empty());
    assert_eq!(reports[2].notify_set.as_slice(), &[0]);
    assert!(reports[2].water_set.is_empty());

    assert_eq!(rig.notifier.messages.len(), 2);
    assert_eq!(rig.valve.calls.len(), 1);
}

// ── Failure isolation ─────────────────────────────────────────

#[test]
fn failed_probe_keeps_condition_and_others_proceed() {
    let mut rig = Rig::new(&config(2));
    rig.probes
        .set(0, RAW_2V5)
        .script(1, &[RAW_2V5, RAW_0V5]);

    rig.cycle();
    rig.probes.fail_next(0, AcquisitionError::AdcReadFailed(-1));
    let report = rig.cycle();

    assert_eq!(report.pass.failures.as_slice(), &[(0, AcquisitionError::AdcReadFailed(-1))]);
    assert_eq!(report.water_set.as_slice(), &[1]);
    assert_eq!(rig.ctl.sensors()[0].current_condition(), Condition::Ok);
    let failed = rig.sink.count(|e| matches!(e, AppEvent::AcquisitionFailed { sensor: 0, .. }));
    assert_eq!(failed, 1);

    // Recovery is not a transition.
    let report = rig.cycle();
    assert!(report.pass.failures.is_empty());
    assert!(!rig.ctl.sensors()[0].did_change());
    assert!(report.notify_set.is_empty());
}

#[test]
fn failed_read_after_a_transition_does_not_fire_again() {
    let mut rig = Rig::new(&config(1));
    rig.probes
        .script(0, &[RAW_2V5, RAW_0V5])
        .fail_next(0, AcquisitionError::AdcReadFailed(-1));

    rig.cycle();
    let entered = rig.cycle();
    assert_eq!(entered.notify_set.as_slice(), &[0]);
    assert_eq!(entered.water_set.as_slice(), &[0]);

    let failed = rig.cycle();
    assert_eq!(failed.pass.failures.len(), 1);
    assert!(failed.notify_set.is_empty());
    assert!(failed.water_set.is_empty());
    assert_eq!(rig.ctl.sensors()[0].current_condition(), Condition::Dry);
    assert_eq!(rig.notifier.messages.len(), 1);
    assert_eq!(rig.valve.calls, vec![vec![0]]);

    // Still dry after recovery: no new edge either.
    let recovered = rig.cycle();
    assert!(recovered.notify_set.is_empty());
    assert_eq!(rig.valve.calls.len(), 1);
}

#[test]
fn failed_read_after_a_triggering_first_reading_does_not_fire_again() {
    let mut c = config(1);
    c.trigger_on_first_reading = true;
    let mut rig = Rig::new(&c);
    rig.probes
        .script(0, &[RAW_0V5])
        .fail_next(0, AcquisitionError::AdcReadFailed(-1));

    let first = rig.cycle();
    assert_eq!(first.notify_set.as_slice(), &[0]);
    assert_eq!(first.water_set.as_slice(), &[0]);

    let failed = rig.cycle();
    assert_eq!(failed.pass.failures.len(), 1);
    assert!(failed.notify_set.is_empty());
    assert!(failed.water_set.is_empty());
    assert_eq!(rig.notifier.messages.len(), 1);
    assert_eq!(rig.valve.calls.len(), 1);
}

#[test]
fn failed_read_does_not_mask_another_sensors_transition() {
    let mut rig = Rig::new(&config(2));
    rig.probes
        .script(0, &[RAW_2V5, RAW_0V5])
        .fail_next(0, AcquisitionError::AdcReadFailed(-1))
        .script(1, &[RAW_2V5, RAW_2V5, RAW_0V5]);

    rig.cycle();
    rig.cycle();
    let report = rig.cycle();

    assert_eq!(report.notify_set.as_slice(), &[1]);
    assert_eq!(report.water_set.as_slice(), &[1]);
    assert_eq!(rig.valve.calls, vec![vec![0], vec![1]]);
}

#[test]
fn notification_failure_is_reported_and_watering_still_runs() {
    let mut rig = Rig::new(&config(1));
    rig.probes.script(0, &[RAW_2V5, RAW_0V5, RAW_0V5]);
    let mut broken = RecordingNotifier::failing("broken", NotifyError::DeliveryFailed("offline"));

    let run = |rig: &mut Rig, broken: &mut RecordingNotifier| match rig.ctl.run_cycle(
        &mut rig.probes,
        &mut [broken as &mut dyn NotifierPort, &mut rig.notifier],
        &mut rig.valve,
        &mut rig.sink,
        &rig.stop,
    ) {
        CycleOutcome::Completed(r) => r,
        CycleOutcome::Interrupted => panic!("interrupted"),
    };

    run(&mut rig, &mut broken);
    let report = run(&mut rig, &mut broken);
    assert_eq!(report.channels_failed, 1);
    assert_eq!(report.channels_ok, 1);
    assert_eq!(report.watering, Some(Ok(())));
    assert_eq!(rig.valve.calls.len(), 1);
    let failed = rig.sink.count(|e| {
        matches!(
            e,
            AppEvent::NotificationFailed {
                error: NotifyError::DeliveryFailed(_),
                ..
            }
        )
    });
    assert_eq!(failed, 1);

    // The lost alert is not retried on the next cycle.
    run(&mut rig, &mut broken);
    assert_eq!(broken.attempts, 1);
}

#[test]
fn watering_failure_is_reported_not_fatal() {
    let mut rig = Rig::new(&config(1));
    rig.valve.fail_with = Some(ActuationError::PinWriteFailed);
    rig.probes.script(0, &[RAW_2V5, RAW_0V5, RAW_2V5]);

    rig.cycle();
    let report = rig.cycle();
    assert_eq!(report.watering, Some(Err(ActuationError::PinWriteFailed)));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::WateringFailed { .. })), 1);

    let report = rig.cycle();
    assert_eq!(report.cycle, 3);
    assert_eq!(rig.ctl.cycle_count(), 3);
}

// ── Phases & events ───────────────────────────────────────────

#[test]
fn phases_follow_read_evaluate_dispatch() {
    let mut rig = Rig::new(&config(1));
    rig.probes.script(0, &[RAW_2V5, RAW_0V5]);

    rig.cycle();
    assert_eq!(rig.sink.phases(), [Phase::Reading, Phase::Evaluating]);

    rig.sink.events.clear();
    rig.cycle();
    assert_eq!(
        rig.sink.phases(),
        [
            Phase::Reading,
            Phase::Evaluating,
            Phase::Notifying,
            Phase::Evaluating,
            Phase::Watering,
            Phase::Evaluating,
        ]
    );
    assert!(matches!(rig.sink.events.last(), Some(AppEvent::CycleCompleted(s)) if s.cycle == 2 && s.notified == 1 && s.watered == 1));
}

#[test]
fn classified_events_carry_change_flag() {
    let mut rig = Rig::new(&config(1));
    rig.probes.script(0, &[RAW_2V5, RAW_0V5]);
    rig.cycle();
    rig.cycle();

    let flags: Vec<(Condition, bool)> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Classified {
                condition, changed, ..
            } => Some((*condition, *changed)),
            _ => None,
        })
        .collect();
    assert_eq!(flags, [(Condition::Ok, false), (Condition::Dry, true)]);
}

#[test]
fn record_mode_sensor_never_triggers() {
    let mut c = config(2);
    c.sensors[1].mode = Mode::Record;
    c.notify_on = TriggerSet::of(&[Condition::Dry, Condition::Ok]);
    let mut rig = Rig::new(&c);
    rig.probes.script(0, &[RAW_2V5, RAW_2V5]).script(1, &[RAW_2V5, RAW_0V5]);

    rig.cycle();
    let report = rig.cycle();

    assert_eq!(report.pass.recorded.len(), 1);
    assert_eq!(report.pass.recorded[0].raw, RAW_0V5);
    assert!(report.notify_set.is_empty());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Recorded(_))), 2);
}

// ── Stop between phases ───────────────────────────────────────

/// Notifier that raises a stop request while sending.
struct StopOnSend<'a> {
    stop: &'a StopSignal,
}

impl NotifierPort for StopOnSend<'_> {
    fn channel(&self) -> &str {
        "stopper"
    }

    fn send(&mut self, _message: &str) -> Result<(), NotifyError> {
        self.stop.request();
        Ok(())
    }
}

#[test]
fn stop_between_notify_and_water_abandons_cycle() {
    let mut rig = Rig::new(&config(1));
    rig.probes.script(0, &[RAW_2V5, RAW_0V5, RAW_2V5]);
    rig.cycle();

    let stop = StopSignal::new();
    let mut stopper = StopOnSend { stop: &stop };
    let outcome = rig.ctl.run_cycle(
        &mut rig.probes,
        &mut [&mut stopper],
        &mut rig.valve,
        &mut rig.sink,
        &stop,
    );

    assert!(matches!(outcome, CycleOutcome::Interrupted));
    assert!(rig.valve.calls.is_empty());
    assert_eq!(rig.ctl.phase(), Phase::Startup);
    assert_eq!(rig.ctl.cycle_count(), 1);

    // Next call starts a fresh cycle from Startup.
    rig.sink.events.clear();
    let report = rig.cycle();
    assert_eq!(report.cycle, 2);
    assert_eq!(rig.sink.phases()[0], Phase::Reading);
    assert!(matches!(
        rig.sink.events.first(),
        Some(AppEvent::PhaseChanged {
            from: Phase::Startup,
            to: Phase::Reading
        })
    ));
}
