//! Append-only audit trail of scan outcomes.
//!
//! One CSV row per processed scan, header `Date/Heure,UID,Nom,Statut`
//! written when the file is first created. Rows are never mutated; OS
//! append semantics are the only locking a single-writer process needs.

use crate::error::StoreResult;
use badgegate_core::CardUid;
use badgegate_core::constants::TIMESTAMP_FORMAT;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Column headers of the journal schema.
pub const JOURNAL_HEADERS: [&str; 4] = ["Date/Heure", "UID", "Nom", "Statut"];

/// One immutable journal row.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: String,
    pub uid: String,
    pub name: String,
    pub status: String,
}

impl AuditEntry {
    /// Build an entry for a scan processed at `at`.
    #[must_use]
    pub fn new(
        at: DateTime<Local>,
        uid: &CardUid,
        name: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        AuditEntry {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            uid: uid.to_string(),
            name: name.into(),
            status: status.into(),
        }
    }
}

/// Append-only CSV journal.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Journal { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the file with its header first if needed.
    pub fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(JOURNAL_HEADERS)?;
        }
        writer.write_record([
            entry.timestamp.as_str(),
            entry.uid.as_str(),
            entry.name.as_str(),
            entry.status.as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Read every row back, oldest first. Used by tests and the admin
    /// console's history display; the running loop never reads the journal.
    pub fn entries(&self) -> StoreResult<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = Vec::new();
        for row in reader.records() {
            let row = row?;
            entries.push(AuditEntry {
                timestamp: row.get(0).unwrap_or_default().to_string(),
                uid: row.get(1).unwrap_or_default().to_string(),
                name: row.get(2).unwrap_or_default().to_string(),
                status: row.get(3).unwrap_or_default().to_string(),
            });
        }
        Ok(entries)
    }
}
