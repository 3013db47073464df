//! Unified error types for the PlantBot controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! binary's error handling uniform.  All variants are `Copy` so they can be
//! carried inside cycle reports and events without allocation.
//!
//! None of these abort the control loop: acquisition, notification and
//! actuation failures are reported and the cycle carries on.  Only
//! [`ConfigError`] is fatal, and only at startup.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A probe could not produce a raw sample.
    Acquisition(AcquisitionError),
    /// A notification channel failed to deliver.
    Notify(NotifyError),
    /// The watering hook failed.
    Actuation(ActuationError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// A sampling batch was requested with zero samples.
    NoSamples,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquisition(e) => write!(f, "acquisition: {e}"),
            Self::Notify(e) => write!(f, "notify: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NoSamples => write!(f, "no samples requested"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Acquisition errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError {
    /// ADC read returned an error code.
    AdcReadFailed(i32),
    /// No probe is wired to the requested channel.
    ChannelUnavailable(u32),
    /// The raw sample exceeds the converter's full-scale value.
    OutOfRange(u16),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed(rc) => write!(f, "ADC read failed (rc={rc})"),
            Self::ChannelUnavailable(ch) => write!(f, "channel {ch} unavailable"),
            Self::OutOfRange(raw) => write!(f, "raw sample {raw} out of range"),
        }
    }
}

impl From<AcquisitionError> for Error {
    fn from(e: AcquisitionError) -> Self {
        Self::Acquisition(e)
    }
}

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// No provider in the routing table matches the recipient address.
    UnknownProvider,
    /// The message did not fit the fixed-capacity buffer.
    MessageTooLong,
    /// The transport refused or dropped the message.
    DeliveryFailed(&'static str),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProvider => write!(f, "no provider matches recipient address"),
            Self::MessageTooLong => write!(f, "message too long"),
            Self::DeliveryFailed(why) => write!(f, "delivery failed: {why}"),
        }
    }
}

impl From<NotifyError> for Error {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// GPIO write to the valve pin failed.
    PinWriteFailed,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWriteFailed => write!(f, "valve pin write failed"),
        }
    }
}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Startup-time validation failures.  The `&'static str` names the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No sensors configured.
    NoSensors,
    /// Two sensors share an id.
    DuplicateSensor(u8),
    /// Thresholds violate `0 <= dry < wet <= 1`.
    ThresholdOrder(u8),
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSensors => write!(f, "no sensors configured"),
            Self::DuplicateSensor(id) => write!(f, "duplicate sensor id {id}"),
            Self::ThresholdOrder(id) => {
                write!(f, "sensor {id}: thresholds must satisfy 0 <= dry < wet <= 1")
            }
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
