//! Terminal configuration.
//!
//! A single JSON file; every field has a default so a partial file (or no
//! file at all) yields a runnable configuration.

use anyhow::Context;
use badgegate_core::constants::{
    BILLED_COOLDOWN_SECS, DEFAULT_COOLDOWN_SECS, DEFAULT_POLL_INTERVAL_MS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Telemetry collector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub enabled: bool,
    /// Collector `host:port`.
    pub addr: String,
    pub topic: String,
    pub timeout_ms: u64,
    /// Client certificate/key paths for collectors requiring mutual auth.
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        TelemetrySettings {
            enabled: false,
            addr: "127.0.0.1:1883".to_string(),
            topic: "badgegate/scans".to_string(),
            timeout_ms: 3000,
            client_cert: None,
            client_key: None,
        }
    }
}

/// Full terminal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub ledger_path: PathBuf,
    pub journal_path: PathBuf,
    pub challenge_path: PathBuf,

    /// Same-card cooldown, seconds.
    pub cooldown_secs: u64,
    /// Cooldown after a billed scan, seconds.
    pub billed_cooldown_secs: u64,
    /// Reader poll interval, milliseconds.
    pub poll_interval_ms: u64,
    /// Credits billed per granted scan.
    pub scan_cost: u16,

    pub telemetry: TelemetrySettings,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            ledger_path: PathBuf::from("cartes.csv"),
            journal_path: PathBuf::from("journal.csv"),
            challenge_path: PathBuf::from("pass.json"),
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            billed_cooldown_secs: BILLED_COOLDOWN_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            scan_cost: 1,
            telemetry: TelemetrySettings::default(),
        }
    }
}

impl TerminalConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no configuration file, using defaults");
            return Ok(TerminalConfig::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let config: TerminalConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        Ok(config)
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    #[must_use]
    pub fn billed_cooldown(&self) -> Duration {
        Duration::from_secs(self.billed_cooldown_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn telemetry_timeout(&self) -> Duration {
        Duration::from_millis(self.telemetry.timeout_ms)
    }
}
