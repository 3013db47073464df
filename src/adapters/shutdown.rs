//! Process shutdown hook (host only).
//!
//! Routes SIGINT / SIGTERM / SIGHUP into a [`StopSignal`] so the control
//! loop leaves its idle phase and returns a summary instead of being
//! killed mid-cycle.  On the device the loop runs until power-off.

use log::info;

use crate::app::stop::StopSignal;

/// Install the process-wide handler.  Can only be installed once per
/// process; a second call fails with [`ctrlc::Error::MultipleHandlers`].
pub fn install(stop: &'static StopSignal) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        info!("SHUTDOWN | signal received, stopping after current phase");
        stop.request();
    })
}
