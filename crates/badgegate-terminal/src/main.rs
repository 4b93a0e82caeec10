//! badgegate - RFID access-control terminal.
//!
//! Assembles the terminal from its components and serves scans until
//! ctrl-c. The reader and feedback devices are wired through their traits;
//! this build uses the in-memory mock devices, driven from stdin by the
//! frontend task, which is also how the terminal runs on a development
//! machine without hardware attached.

use anyhow::Context;
use badgegate_card::{CardService, CardTransport, MockReader};
use badgegate_engine::ScanSuppressor;
use badgegate_feedback::{FeedbackProbe, FeedbackSet, MockBuzzer, MockDisplay, MockLed};
use badgegate_store::{AdminChallenges, Journal, Ledger};
use badgegate_telemetry::{EventPublisher, NullPublisher, ScanEvent, TcpPublisher, TcpPublisherConfig};
use badgegate_terminal::{ChannelConsole, Terminal, TerminalConfig, frontend};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Either collector, depending on configuration. Enum dispatch because the
/// publisher trait is not object-safe.
enum Publisher {
    Tcp(TcpPublisher),
    Null(NullPublisher),
}

impl EventPublisher for Publisher {
    async fn publish(&mut self, event: &ScanEvent) -> badgegate_telemetry::Result<()> {
        match self {
            Publisher::Tcp(p) => p.publish(event).await,
            Publisher::Null(p) => p.publish(event).await,
        }
    }

    async fn close(&mut self) {
        match self {
            Publisher::Tcp(p) => p.close().await,
            Publisher::Null(p) => p.close().await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "badgegate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting badgegate v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::var("BADGEGATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("badgegate.json"));
    let config = TerminalConfig::load(&config_path)?;

    // The ledger is the only component whose failure to open is fatal.
    let ledger = Ledger::open(&config.ledger_path)
        .with_context(|| format!("opening ledger {}", config.ledger_path.display()))?;
    let journal = Journal::new(&config.journal_path);
    let challenges = match AdminChallenges::load(&config.challenge_path) {
        Ok(challenges) => challenges,
        Err(error) => {
            error!(%error, path = %config.challenge_path.display(),
                "admin challenge file unreadable, continuing without challenges");
            AdminChallenges::empty()
        }
    };

    let publisher = if config.telemetry.enabled {
        Publisher::Tcp(TcpPublisher::new(TcpPublisherConfig {
            addr: config.telemetry.addr.clone(),
            topic: config.telemetry.topic.clone(),
            timeout: config.telemetry_timeout(),
            client_cert: config.telemetry.client_cert.clone(),
            client_key: config.telemetry.client_key.clone(),
        }))
    } else {
        Publisher::Null(NullPublisher)
    };

    let (reader, reader_handle) = MockReader::new();
    let (console_tx, console_rx) = mpsc::channel(16);
    tokio::spawn(frontend::pump(reader_handle, console_tx));

    let probe = FeedbackProbe::new();
    let feedback = FeedbackSet::new(
        MockLed::new(probe.clone()),
        MockBuzzer::new(probe.clone()),
        MockDisplay::new(probe),
    );

    let mut terminal = Terminal::new(
        CardService::new(CardTransport::new(reader)),
        ChannelConsole::new(console_rx),
        ledger,
        journal,
        challenges,
        feedback,
        publisher,
        ScanSuppressor::new(config.cooldown(), config.billed_cooldown()),
        config.scan_cost,
        config.poll_interval(),
    );

    tokio::select! {
        () = terminal.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                warn!(%error, "ctrl-c handler failed, shutting down");
            } else {
                info!("ctrl-c received, shutting down");
            }
        }
    }

    terminal.shutdown().await;
    info!("badgegate stopped");
    Ok(())
}
