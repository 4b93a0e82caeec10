//! Core types for the badgegate access-control terminal.
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: the canonical card UID form, schedule constraints (time
//! windows and weekday sets), the access verdict model, and the constants
//! that describe the on-card memory layout.

pub mod constants;
pub mod error;
pub mod types;
pub mod verdict;

pub use error::{Error, Result};
pub use types::{CardUid, TimeWindow, WeekdaySet};
pub use verdict::{DenyReason, Verdict};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
