//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to                    |
//! |------------|------------------|--------------------------------|
//! | `hardware` | AcquisitionPort  | ESP32 ADC1 oneshot / sim slots |
//! |            | WateringPort     | Valve GPIO or no-op            |
//! | `log_sink` | EventSink        | Serial / host log output       |
//! | `notify`   | NotifierPort     | Mail / SMS gateway, console    |
//! | `time`     | IdleTimer        | async-io-mini reactor timer    |
//! | `shutdown` | (StopSignal)     | SIGINT / SIGTERM (host only)   |

pub mod hardware;
pub mod log_sink;
pub mod notify;
#[cfg(not(target_os = "espidf"))]
pub mod shutdown;
pub mod time;
