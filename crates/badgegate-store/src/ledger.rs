//! The authoritative badge registry.
//!
//! A flat CSV file read whole and rewritten whole. Every rewrite goes to a
//! named temp file in the ledger's directory followed by an atomic rename,
//! so a crash mid-write never leaves a truncated ledger behind. The physical
//! card's blocks are only a denormalized mirror of this file; the ledger
//! always wins.

use crate::error::StoreResult;
use crate::models::BadgeRecord;
use badgegate_core::CardUid;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Column headers of the canonical ledger schema.
pub const LEDGER_HEADERS: [&str; 9] = [
    "UID",
    "Nom",
    "Actif",
    "Credits",
    "Id",
    "Expiration",
    "Debut",
    "Fin",
    "Jours",
];

/// Result of an upsert: the resolved id, and whether it was just assigned
/// (the caller writes the identity block to the card only in that case).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub internal_id: u32,
    /// True when the uid had no ledger row before this call.
    pub created: bool,
    /// True when `internal_id` was assigned by this call, either for a new
    /// row or for a legacy row that predates id assignment.
    pub id_assigned: bool,
}

/// CSV-backed badge ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Open the ledger, creating an empty file (header only) if none
    /// exists. This is the terminal's only fatal-on-failure startup path.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let ledger = Ledger { path: path.into() };
        let missing = match fs::metadata(&ledger.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        if missing {
            info!(path = %ledger.path.display(), "initializing empty ledger file");
            ledger.save(&[])?;
        }
        Ok(ledger)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find the record for `uid`. Linear scan, first match wins.
    pub fn lookup(&self, uid: &CardUid) -> StoreResult<Option<BadgeRecord>> {
        Ok(self.load()?.into_iter().find(|r| &r.uid == uid))
    }

    /// Insert or overwrite the record for `record.uid`.
    ///
    /// Existing rows keep their `internal_id` (never reassigned); rows
    /// without one are backfilled with `max + 1`. New rows get the id the
    /// caller provided (used when seeding the reserved admin id 0) or
    /// `max + 1` otherwise; an empty ledger starts at 1.
    pub fn upsert(&self, record: &BadgeRecord) -> StoreResult<UpsertOutcome> {
        let mut records = self.load()?;
        let mut max_id = records.iter().filter_map(|r| r.internal_id).max().unwrap_or(0);

        let outcome = if let Some(existing) = records.iter_mut().find(|r| r.uid == record.uid) {
            existing.name = record.name.clone();
            existing.active = record.active;
            existing.credits = record.credits;
            existing.expiration = record.expiration;
            existing.window_start = record.window_start;
            existing.window_end = record.window_end;
            existing.allowed_weekdays = record.allowed_weekdays;

            let id_assigned = existing.internal_id.is_none();
            if id_assigned {
                max_id += 1;
                existing.internal_id = Some(max_id);
                info!(uid = %record.uid, id = max_id, "assigned id to legacy ledger row");
            }
            UpsertOutcome {
                internal_id: existing.internal_id.unwrap_or(max_id),
                created: false,
                id_assigned,
            }
        } else {
            let internal_id = match record.internal_id {
                Some(id) => id,
                None => {
                    max_id += 1;
                    max_id
                }
            };
            let mut fresh = record.clone();
            fresh.internal_id = Some(internal_id);
            records.push(fresh);
            debug!(uid = %record.uid, id = internal_id, "appended new ledger row");
            UpsertOutcome {
                internal_id,
                created: true,
                id_assigned: true,
            }
        };

        self.save(&records)?;
        Ok(outcome)
    }

    /// Targeted single-field update of a badge's credits.
    ///
    /// Returns false (no write) when the uid has no row.
    pub fn update_credits(&self, uid: &CardUid, value: u16) -> StoreResult<bool> {
        self.update_row(uid, |record| record.credits = value)
    }

    /// Targeted single-field update of a badge's active flag, used by the
    /// decision engine's lazy expiry.
    pub fn set_active(&self, uid: &CardUid, active: bool) -> StoreResult<bool> {
        self.update_row(uid, |record| record.active = active)
    }

    /// Remove the record for `uid`. Returns false when nothing matched.
    pub fn delete(&self, uid: &CardUid) -> StoreResult<bool> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| &r.uid != uid);
        if records.len() == before {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }

    /// Every record, in insertion order.
    pub fn list_all(&self) -> StoreResult<Vec<BadgeRecord>> {
        self.load()
    }

    fn update_row(
        &self,
        uid: &CardUid,
        mutate: impl FnOnce(&mut BadgeRecord),
    ) -> StoreResult<bool> {
        let mut records = self.load()?;
        match records.iter_mut().find(|r| &r.uid == uid) {
            Some(record) => {
                mutate(record);
                self.save(&records)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn load(&self) -> StoreResult<Vec<BadgeRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    /// Rewrite the whole file through a temp file in the same directory,
    /// then rename over the original. The header row is always present,
    /// even for an empty ledger.
    fn save(&self, records: &[BadgeRecord]) -> StoreResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut tmp);
            writer.write_record(LEDGER_HEADERS)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}
