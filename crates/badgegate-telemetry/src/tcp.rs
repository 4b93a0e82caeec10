//! Best-effort TCP publisher.
//!
//! One JSON object per line, newline-terminated. The connection is opened
//! lazily on the first publish and dropped on any failure; the next publish
//! reconnects. No retries, no buffering of failed events - the terminal
//! keeps serving scans whether the collector is reachable or not.

use crate::error::{Result, TelemetryError};
use crate::event::ScanEvent;
use crate::publisher::EventPublisher;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Collector connection settings.
#[derive(Debug, Clone)]
pub struct TcpPublisherConfig {
    /// Collector `host:port`.
    pub addr: String,

    /// Topic tag carried in every envelope.
    pub topic: String,

    /// Timeout for connect and write, both.
    pub timeout: Duration,

    /// Client certificate and key paths, forwarded to the transport when
    /// the collector requires mutual auth. Carried in configuration; the
    /// plain-TCP publisher does not consume them itself.
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
}

impl Default for TcpPublisherConfig {
    fn default() -> Self {
        TcpPublisherConfig {
            addr: "127.0.0.1:1883".to_string(),
            topic: "scan".to_string(),
            timeout: Duration::from_millis(3000),
            client_cert: None,
            client_key: None,
        }
    }
}

/// One wire line: the topic plus the event payload.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    topic: &'a str,
    #[serde(flatten)]
    event: &'a ScanEvent,
}

/// Lazily-connecting newline-JSON publisher.
pub struct TcpPublisher {
    config: TcpPublisherConfig,
    stream: Option<TcpStream>,
}

impl TcpPublisher {
    #[must_use]
    pub fn new(config: TcpPublisherConfig) -> Self {
        debug!(addr = %config.addr, topic = %config.topic, "creating telemetry publisher");
        TcpPublisher { config, stream: None }
    }

    /// Whether a collector connection is currently held.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn ensure_connected(&mut self) -> Result<&mut TcpStream> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                let timeout_ms = self.config.timeout.as_millis() as u64;
                let stream = match tokio::time::timeout(
                    self.config.timeout,
                    TcpStream::connect(&self.config.addr),
                )
                .await
                {
                    Ok(Ok(stream)) => stream,
                    Ok(Err(error)) => return Err(error.into()),
                    Err(_) => return Err(TelemetryError::ConnectTimeout(timeout_ms)),
                };
                if let Err(error) = stream.set_nodelay(true) {
                    warn!(%error, "failed to set TCP_NODELAY on telemetry socket");
                }
                info!(addr = %self.config.addr, "connected to telemetry collector");
                stream
            }
        };
        Ok(self.stream.insert(stream))
    }
}

impl EventPublisher for TcpPublisher {
    async fn publish(&mut self, event: &ScanEvent) -> Result<()> {
        let mut line = serde_json::to_vec(&Envelope {
            topic: &self.config.topic,
            event,
        })?;
        line.push(b'\n');

        let timeout = self.config.timeout;
        let stream = self.ensure_connected().await?;
        let written = tokio::time::timeout(timeout, stream.write_all(&line)).await;
        match written {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => {
                // Drop the connection so the next publish reconnects.
                self.stream = None;
                Err(error.into())
            }
            Err(_) => {
                self.stream = None;
                Err(TelemetryError::WriteTimeout(timeout.as_millis() as u64))
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let grace = Duration::from_millis(500);
            match tokio::time::timeout(grace, stream.shutdown()).await {
                Ok(Ok(())) => debug!("telemetry connection closed"),
                Ok(Err(error)) => warn!(%error, "error shutting down telemetry connection"),
                Err(_) => warn!("telemetry shutdown timed out"),
            }
        }
    }
}
