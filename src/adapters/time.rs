//! Idle timer adapter.
//!
//! Implements [`IdleTimer`] on top of the `async-io-mini` reactor timer,
//! which works unchanged on ESP-IDF (select-based reactor) and on the
//! host.  Dropping the returned future cancels the timer, so the
//! controller can race it against a stop request.

use core::future::Future;
use core::time::Duration;

use log::debug;

use crate::app::ports::IdleTimer;

/// Real-time idle suspension.
#[derive(Debug, Default)]
pub struct ReactorTimer {
    #[cfg(not(target_os = "espidf"))]
    started: Option<std::time::Instant>,
}

impl ReactorTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the most recent idle began (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn since_last_idle(&self) -> Option<Duration> {
        self.started.map(|t| t.elapsed())
    }
}

impl IdleTimer for ReactorTimer {
    fn idle(&mut self, period: Duration) -> impl Future<Output = ()> {
        debug!("idle for {} ms", period.as_millis());
        #[cfg(not(target_os = "espidf"))]
        {
            self.started = Some(std::time::Instant::now());
        }
        async move {
            async_io_mini::Timer::after(period).await;
        }
    }
}
