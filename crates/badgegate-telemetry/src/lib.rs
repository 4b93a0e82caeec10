//! Scan-event telemetry for the badgegate terminal.
//!
//! Every processed scan is reported to a collector as one line of JSON over
//! TCP. Telemetry is strictly best-effort: the terminal's access decisions
//! never wait on it beyond the configured timeout and never fail because of
//! it.
//!
//! - [`event`] - the wire payload (`date_heure` + `uid`)
//! - [`publisher`] - the `EventPublisher` trait and the `NullPublisher`
//!   used when telemetry is disabled
//! - [`tcp`] - the lazily-reconnecting TCP publisher
//!
//! All device traits use native `async fn` methods (Edition 2024 RPITIT),
//! so no `async_trait` macro is required.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod event;
pub mod publisher;
pub mod tcp;

pub use error::{Result, TelemetryError};
pub use event::ScanEvent;
pub use publisher::{EventPublisher, NullPublisher};
pub use tcp::{TcpPublisher, TcpPublisherConfig};
