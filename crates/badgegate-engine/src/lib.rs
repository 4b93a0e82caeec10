//! Domain logic of the badgegate terminal.
//!
//! Three collaborators sit between the reader and the files:
//!
//! - [`AccessEngine`] - evaluates a scanned badge against the ledger and
//!   the clock, in a strict fail-fast order, persisting lazy expiry
//! - [`CreditManager`] - guarded credit arithmetic: the ledger write is
//!   authoritative, the card's counter block is a best-effort mirror
//! - [`ScanSuppressor`] - debounces repeated reads of the same badge
//!
//! Expected business outcomes (unknown card, inactive badge, insufficient
//! credits) are values, not errors; `EngineError` is reserved for store and
//! consistency failures.

pub mod credits;
pub mod decision;
pub mod error;
pub mod suppressor;

pub use credits::{CreditManager, CreditOutcome};
pub use decision::AccessEngine;
pub use error::{EngineError, EngineResult};
pub use suppressor::ScanSuppressor;
