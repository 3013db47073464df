//! External stop request for the control loop.
//!
//! An `embassy-sync` [`Signal`] wakes the idle suspension point; an atomic
//! latch makes the request visible to the between-phase polls as well,
//! since awaiting the signal consumes it.
//!
//! ```text
//!  request() ──▶ latch = true ──▶ is_requested()   (phase boundaries)
//!            └─▶ signal()     ──▶ wait().await      (idle phase)
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

pub struct StopSignal {
    latch: AtomicBool,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    /// `const` so it can live in a `static`.
    pub const fn new() -> Self {
        Self {
            latch: AtomicBool::new(false),
            signal: Signal::new(),
        }
    }

    /// Ask the loop to stop.  Safe to call from any thread.
    pub fn request(&self) {
        self.latch.store(true, Ordering::Release);
        self.signal.signal(());
    }

    pub fn is_requested(&self) -> bool {
        self.latch.load(Ordering::Acquire)
    }

    /// Resolves once a stop has been requested.
    pub async fn wait(&self) {
        while !self.is_requested() {
            self.signal.wait().await;
        }
    }

    /// Clear a previous request so the loop can be started again.
    pub fn reset(&self) {
        self.latch.store(false, Ordering::Release);
        self.signal.reset();
    }
}
