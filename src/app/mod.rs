//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for PlantBot: the control
//! loop, edge-triggered action selection and the stop signal.  All
//! interaction with probes, notification channels, the valve and time
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod stop;
pub mod triggers;
