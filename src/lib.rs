//! PlantBot controller library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! binary.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod sensors;

pub mod adapters;
pub mod drivers;
pub mod pins;

pub use app::service::{Controller, CycleOutcome, CycleReport, RunSummary, StoppedBy};
pub use app::stop::StopSignal;
pub use config::ControllerConfig;
pub use error::{Error, Result};
