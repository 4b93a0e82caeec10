//! The publisher abstraction and the disabled-telemetry stand-in.

use crate::error::Result;
use crate::event::ScanEvent;
use tracing::trace;

/// Sink for scan events.
///
/// Not object-safe (`async fn` methods), so the terminal is generic over
/// its publisher.
pub trait EventPublisher: Send {
    /// Deliver one event. Callers treat failures as loggable, not fatal.
    async fn publish(&mut self, event: &ScanEvent) -> Result<()>;

    /// Release any held connection. Idempotent; part of shutdown cleanup.
    async fn close(&mut self);
}

/// Publisher used when telemetry is disabled in the configuration.
#[derive(Debug, Default)]
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    async fn publish(&mut self, event: &ScanEvent) -> Result<()> {
        trace!(uid = %event.uid, "telemetry disabled, event dropped");
        Ok(())
    }

    async fn close(&mut self) {}
}
