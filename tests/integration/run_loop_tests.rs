//! Integration tests for the async run loop: idle scheduling, cycle
//! limits and stop requests.

use std::time::{Duration, Instant};

use futures_lite::future::block_on;

use plantbot::adapters::time::ReactorTimer;
use plantbot::app::events::AppEvent;
use plantbot::app::stop::StopSignal;
use plantbot::config::ControllerConfig;
use plantbot::fsm::Phase;
use plantbot::{Controller, StoppedBy};

use crate::mock_ports::{
    RAW_0V5, RAW_2V5, RecordingNotifier, RecordingSink, RecordingValve, ScriptedProbes,
    StopOnIdle, VirtualTimer,
};

fn started(config: &ControllerConfig, sink: &mut RecordingSink) -> Controller {
    let mut ctl = Controller::new(config).unwrap();
    ctl.start(sink);
    ctl
}

fn probes() -> ScriptedProbes {
    let mut p = ScriptedProbes::new();
    p.set(0, RAW_2V5).set(1, RAW_2V5);
    p
}

#[test]
fn limited_run_idles_between_cycles_only() {
    let mut sink = RecordingSink::new();
    let mut ctl = started(&ControllerConfig::default(), &mut sink);
    let mut probes = probes();
    let mut notifier = RecordingNotifier::new("test");
    let mut timer = VirtualTimer::new();
    let stop = StopSignal::new();

    let summary = block_on(ctl.run(
        &mut probes,
        &mut [&mut notifier],
        &mut RecordingValve::new(),
        &mut sink,
        &mut timer,
        &stop,
        Some(3),
    ));

    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.stopped_by, StoppedBy::CycleLimit);
    assert_eq!(timer.requested, [Duration::from_secs(120); 2]);
    assert_eq!(ctl.phase_entries(Phase::Idling), 2);
    assert_eq!(probes.calls.len(), 6);
    assert!(matches!(sink.events.last(), Some(AppEvent::Stopped { cycles: 3 })));
}

#[test]
fn configured_idle_period_is_requested() {
    let mut config = ControllerConfig::default();
    config.idle_period_secs = 30;
    let mut sink = RecordingSink::new();
    let mut ctl = started(&config, &mut sink);
    let mut timer = VirtualTimer::new();

    block_on(ctl.run(
        &mut probes(),
        &mut [],
        &mut RecordingValve::new(),
        &mut sink,
        &mut timer,
        &StopSignal::new(),
        Some(2),
    ));

    assert_eq!(timer.requested, [Duration::from_secs(30)]);
    assert_eq!(ctl.idle_period(), Duration::from_secs(30));
}

#[test]
fn zero_cycle_limit_reads_nothing() {
    let mut sink = RecordingSink::new();
    let mut ctl = started(&ControllerConfig::default(), &mut sink);
    let mut probes = probes();

    let summary = block_on(ctl.run(
        &mut probes,
        &mut [],
        &mut RecordingValve::new(),
        &mut sink,
        &mut VirtualTimer::new(),
        &StopSignal::new(),
        Some(0),
    ));

    assert_eq!(summary.cycles, 0);
    assert!(probes.calls.is_empty());
}

#[test]
fn stop_during_idle_ends_the_loop() {
    let mut sink = RecordingSink::new();
    let mut ctl = started(&ControllerConfig::default(), &mut sink);
    let stop = StopSignal::new();
    let mut timer = StopOnIdle {
        stop: &stop,
        nth: 2,
        idles: 0,
    };

    let summary = block_on(ctl.run(
        &mut probes(),
        &mut [],
        &mut RecordingValve::new(),
        &mut sink,
        &mut timer,
        &stop,
        None,
    ));

    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.stopped_by, StoppedBy::StopRequested);
    assert_eq!(timer.idles, 2);
    assert_eq!(ctl.phase(), Phase::Startup);
    assert_eq!(
        sink.phases().last().copied(),
        Some(Phase::Startup),
        "an interrupted idle returns to Startup"
    );
}

#[test]
fn stop_requested_before_run_reads_nothing() {
    let mut sink = RecordingSink::new();
    let mut ctl = started(&ControllerConfig::default(), &mut sink);
    let mut probes = probes();
    let stop = StopSignal::new();
    stop.request();

    let summary = block_on(ctl.run(
        &mut probes,
        &mut [],
        &mut RecordingValve::new(),
        &mut sink,
        &mut VirtualTimer::new(),
        &stop,
        None,
    ));

    assert_eq!(summary.cycles, 0);
    assert_eq!(summary.stopped_by, StoppedBy::StopRequested);
    assert!(probes.calls.is_empty());
}

#[test]
fn restart_after_stop_begins_a_fresh_cycle() {
    let mut sink = RecordingSink::new();
    let mut ctl = started(&ControllerConfig::default(), &mut sink);
    let mut probes = ScriptedProbes::new();
    probes.script(0, &[RAW_2V5, RAW_0V5]).set(1, RAW_2V5);
    let mut valve = RecordingValve::new();
    let stop = StopSignal::new();
    let mut timer = StopOnIdle {
        stop: &stop,
        nth: 1,
        idles: 0,
    };

    block_on(ctl.run(&mut probes, &mut [], &mut valve, &mut sink, &mut timer, &stop, None));
    assert_eq!(ctl.cycle_count(), 1);

    stop.reset();
    sink.events.clear();
    let summary = block_on(ctl.run(
        &mut probes,
        &mut [],
        &mut valve,
        &mut sink,
        &mut VirtualTimer::new(),
        &stop,
        Some(1),
    ));

    assert_eq!(summary.cycles, 2);
    assert_eq!(sink.phases()[0], Phase::Reading);
    // Sensor state survives the restart: ok → dry is still a transition.
    assert_eq!(valve.calls, vec![vec![0]]);
}

#[test]
fn stop_from_another_thread_cuts_a_real_idle_short() {
    static STOP: StopSignal = StopSignal::new();

    let mut sink = RecordingSink::new();
    let mut ctl = started(&ControllerConfig::default(), &mut sink);
    let mut timer = ReactorTimer::new();

    let stopper = std::thread::spawn(|| {
        std::thread::sleep(Duration::from_millis(50));
        STOP.request();
    });

    let t0 = Instant::now();
    let summary = block_on(ctl.run(
        &mut probes(),
        &mut [],
        &mut RecordingValve::new(),
        &mut sink,
        &mut timer,
        &STOP,
        None,
    ));
    stopper.join().unwrap();

    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.stopped_by, StoppedBy::StopRequested);
    assert!(t0.elapsed() < Duration::from_secs(60));
}

#[test]
fn dry_probe_triggers_through_the_run_loop() {
    let mut sink = RecordingSink::new();
    let mut ctl = started(&ControllerConfig::default(), &mut sink);
    let mut probes = ScriptedProbes::new();
    probes.script(0, &[RAW_2V5, RAW_0V5, RAW_0V5]).set(1, RAW_2V5);
    let mut notifier = RecordingNotifier::new("test");
    let mut valve = RecordingValve::new();

    block_on(ctl.run(
        &mut probes,
        &mut [&mut notifier],
        &mut valve,
        &mut sink,
        &mut VirtualTimer::new(),
        &StopSignal::new(),
        Some(3),
    ));

    assert_eq!(notifier.messages.len(), 1);
    assert_eq!(valve.calls, vec![vec![0]]);
}
