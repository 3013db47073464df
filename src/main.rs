//! PlantBot — Main Entry Point
//!
//! Hexagonal architecture: the controller core knows only port traits;
//! this file picks the adapters and drives the loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ProbeBank        LogEventSink   LogNotifier    ReactorTimer   │
//! │  (Acquisition)    (EventSink)    MailNotifier   (IdleTimer)    │
//! │  BoardValve                      (Notifier)                    │
//! │  (Watering)                                                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            Controller (pure logic)                     │    │
//! │  │  SensorHub · TriggerSets · PhaseTracker                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::info;

use plantbot::adapters::hardware::{BoardValve, ProbeBank};
use plantbot::adapters::log_sink::LogEventSink;
use plantbot::adapters::notify::{LogNotifier, LogTransport, MailNotifier};
use plantbot::adapters::time::ReactorTimer;
use plantbot::app::ports::NotifierPort;
use plantbot::{Controller, ControllerConfig, RunSummary, StopSignal};

/// Set from outside the loop to end `run` at the next phase boundary.
/// The host binary wires it to SIGINT / SIGTERM.
static STOP: StopSignal = StopSignal::new();

/// Build every adapter from `config` and drive the controller until it
/// stops (`cycles` bounds the run; `None` loops forever).
fn run_controller(config: &ControllerConfig, cycles: Option<u64>) -> Result<RunSummary> {
    let mut controller = Controller::new(config)?;

    let mut sink = LogEventSink::new();
    let mut probes = ProbeBank::new(config.adc);
    let mut valve = BoardValve::from_config(config.valve);
    let mut timer = ReactorTimer::new();

    let mut console = LogNotifier::new();
    let mut mail = config
        .mail
        .as_ref()
        .map(|m| MailNotifier::new(m, LogTransport::new()));
    let mut notifiers: Vec<&mut dyn NotifierPort> = Vec::new();
    notifiers.push(&mut console);
    if let Some(m) = mail.as_mut() {
        notifiers.push(m);
    }

    controller.start(&mut sink);
    let summary = futures_lite::future::block_on(controller.run(
        &mut probes,
        &mut notifiers,
        &mut valve,
        &mut sink,
        &mut timer,
        &STOP,
        cycles,
    ));
    Ok(summary)
}

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use plantbot::config::{SensorConfig, ValveConfig};
    use plantbot::pins;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PlantBot v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Board configuration ────────────────────────────────
    let mut config = ControllerConfig::default();
    config.sensors.clear();
    for (id, channel) in pins::PROBE_ADC_CHANNELS.iter().enumerate() {
        let _ = config.sensors.push(SensorConfig::normal(id as u8, *channel));
    }
    config.adc = pins::PROBE_ADC_SCALE;
    config.valve = Some(ValveConfig {
        gpio: pins::VALVE_GPIO,
        pulse_ms: pins::VALVE_PULSE_MS,
    });

    // ── 3. Peripherals ────────────────────────────────────────
    plantbot::drivers::hw_init::init_peripherals(&pins::PROBE_ADC_CHANNELS, Some(pins::VALVE_GPIO))?;

    // ── 4. Control loop (never returns unless stopped) ────────
    let summary = run_controller(&config, None)?;
    info!("PlantBot halted: {:?}", summary);
    Ok(())
}

// ── Host ──────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::path::PathBuf;

    use anyhow::{Context, Result, anyhow, bail};
    use clap::{Parser, Subcommand};
    use log::info;

    use plantbot::ControllerConfig;
    use plantbot::adapters::hardware::{ProbeBank, sim_set_raw};
    use plantbot::adapters::shutdown;
    use plantbot::drivers::hw_init::HwDelay;
    use plantbot::sensors::moisture::MoistureSensor;
    use plantbot::sensors::stats::record_range;

    #[derive(Parser)]
    #[command(name = "plantbot")]
    #[command(about = "Closed-loop soil-moisture controller (host simulation)")]
    pub struct Cli {
        /// JSON controller configuration; defaults when omitted
        #[arg(long, env = "PLANTBOT_CONFIG")]
        config: Option<PathBuf>,

        /// Inject a raw ADC sample, e.g. `--sim 0=171`
        #[arg(long = "sim", value_name = "CHANNEL=RAW", value_parser = parse_sim)]
        sim: Vec<(u32, u16)>,

        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,

        #[command(subcommand)]
        command: Option<Commands>,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Sample one probe repeatedly and print mean / deviation
        Record {
            /// Sensor id from the configuration
            #[arg(long)]
            sensor: u8,

            #[arg(long, default_value_t = 16)]
            samples: usize,

            /// Pause between samples
            #[arg(long, default_value_t = 100)]
            delay_ms: u32,
        },
    }

    fn parse_sim(s: &str) -> Result<(u32, u16), String> {
        let (ch, raw) = s.split_once('=').ok_or("expected CHANNEL=RAW")?;
        let ch = ch.trim().parse().map_err(|e| format!("channel: {e}"))?;
        let raw = raw.trim().parse().map_err(|e| format!("raw: {e}"))?;
        Ok((ch, raw))
    }

    fn load_config(path: Option<&PathBuf>) -> Result<ControllerConfig> {
        let config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("reading {}", p.display()))?;
                serde_json::from_str(&text).map_err(|e| anyhow!("parsing {}: {e}", p.display()))?
            }
            None => ControllerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn run(cli: Cli) -> Result<()> {
        let config = load_config(cli.config.as_ref())?;
        for &(channel, raw) in &cli.sim {
            sim_set_raw(channel, raw);
        }

        match cli.command {
            Some(Commands::Record {
                sensor,
                samples,
                delay_ms,
            }) => {
                let Some(sc) = config.sensors.iter().find(|s| s.id == sensor) else {
                    bail!("no sensor with id {sensor}");
                };
                let probe = MoistureSensor::new(
                    sc.id,
                    sc.channel,
                    sc.dry_threshold,
                    sc.wet_threshold,
                    sc.mode,
                    config.adc,
                );
                let mut bank = ProbeBank::new(config.adc);
                let stats = record_range(&probe, &mut bank, samples, &mut HwDelay, delay_ms)?;
                info!(
                    "RECORD | sensor={} | n={} | raw {:.1}±{:.1} | {:.3}±{:.3}V | VWC {:.3}±{:.3}",
                    sensor,
                    stats.samples,
                    stats.mean_raw,
                    stats.sd_raw,
                    stats.mean_volts,
                    stats.sd_volts,
                    stats.mean_vwc,
                    stats.sd_vwc,
                );
                Ok(())
            }
            None => {
                shutdown::install(&super::STOP).context("installing signal handler")?;
                let summary = super::run_controller(&config, cli.cycles)?;
                info!("PlantBot finished: {:?}", summary);
                Ok(())
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("PlantBot v{} (host simulation)", env!("CARGO_PKG_VERSION"));
    host::run(host::Cli::parse())
}
