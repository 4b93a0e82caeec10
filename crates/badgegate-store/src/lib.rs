//! Persistence layer for the badgegate terminal.
//!
//! Three stores, all file-backed and all owned by exactly one component:
//!
//! - [`Ledger`] - the authoritative badge registry, a flat CSV file with
//!   whole-file rewrite through a temp file and atomic rename (a crash never
//!   leaves a partially written ledger visible)
//! - [`Journal`] - the append-only audit trail of scan outcomes
//! - [`AdminChallenges`] - the static step-up credential file, loaded once
//!   at startup; its absence is non-fatal
//!
//! # Concurrency
//!
//! None of these types lock internally. The terminal's single-threaded main
//! loop is the only writer; the atomic-rename pattern protects against
//! crash corruption, not concurrent writers.

pub mod challenges;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod models;

pub use challenges::{AdminChallenges, Challenge};
pub use error::{StoreError, StoreResult};
pub use journal::{AuditEntry, Journal};
pub use ledger::{Ledger, UpsertOutcome};
pub use models::BadgeRecord;
