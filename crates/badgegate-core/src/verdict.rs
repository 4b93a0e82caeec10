//! Access verdict model.
//!
//! The decision engine reduces every scan to a [`Verdict`]: either a grant
//! carrying the badge's display data, or a denial carrying a structured
//! [`DenyReason`]. The `Display` implementations produce the human-readable
//! status text that lands in the audit journal and on the terminal display.

use crate::constants::{ADMIN_NAME, DATE_FORMAT};
use crate::types::TimeWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a scan was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenyReason {
    /// No ledger record exists for the scanned UID.
    UnknownCard,

    /// The record exists but `active` is false.
    Inactive,

    /// The record's expiration date has passed; evaluation deactivates the
    /// record as a side effect (lazy expiry).
    Expired { on: NaiveDate },

    /// Today's weekday is outside the badge's allowed set.
    DayNotAllowed,

    /// The current time falls outside the badge's access window.
    OutsideWindow { window: TimeWindow },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DenyReason::UnknownCard => write!(f, "unknown card"),
            DenyReason::Inactive => write!(f, "inactive"),
            DenyReason::Expired { on } => {
                write!(f, "expired on {}", on.format(DATE_FORMAT))
            }
            DenyReason::DayNotAllowed => write!(f, "not allowed today"),
            DenyReason::OutsideWindow { window } => {
                write!(f, "outside window {window}")
            }
        }
    }
}

/// Outcome of evaluating one scan against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Access granted. Carries the record data the terminal needs without
    /// a second ledger round-trip.
    Granted {
        name: String,
        credits: u16,
        internal_id: u32,
    },

    /// Access denied, with the badge name for the journal ("Unregistered"
    /// for unknown cards) and the refusal reason.
    Denied { name: String, reason: DenyReason },
}

impl Verdict {
    /// Whether this verdict grants access.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted { .. })
    }

    /// Whether a granted badge routes into the admin console.
    ///
    /// Admin role is carried by the badge name, compared case-insensitively;
    /// denied scans are never admin regardless of name.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        match self {
            Verdict::Granted { name, .. } => name.eq_ignore_ascii_case(ADMIN_NAME),
            Verdict::Denied { .. } => false,
        }
    }

    /// Badge display name for the journal row.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Verdict::Granted { name, .. } | Verdict::Denied { name, .. } => name,
        }
    }

    /// Human-readable status text for the journal row.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Verdict::Granted { .. } => write!(f, "granted"),
            Verdict::Denied { reason, .. } => write!(f, "denied: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn granted_admin_is_case_insensitive() {
        let verdict = Verdict::Granted {
            name: "Admin".to_string(),
            credits: 999,
            internal_id: 0,
        };
        assert!(verdict.is_admin());
    }

    #[test]
    fn denied_is_never_admin() {
        let verdict = Verdict::Denied {
            name: "admin".to_string(),
            reason: DenyReason::Inactive,
        };
        assert!(!verdict.is_admin());
    }

    #[test]
    fn status_text_includes_reason() {
        let verdict = Verdict::Denied {
            name: "Unregistered".to_string(),
            reason: DenyReason::UnknownCard,
        };
        assert_eq!(verdict.status_text(), "denied: unknown card");
    }

    #[test]
    fn expired_reason_formats_the_date() {
        let reason = DenyReason::Expired {
            on: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        };
        assert_eq!(reason.to_string(), "expired on 2026-01-31");
    }

    #[test]
    fn window_reason_formats_the_window() {
        let reason = DenyReason::OutsideWindow {
            window: TimeWindow::new(
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            ),
        };
        assert_eq!(reason.to_string(), "outside window 22:00-06:00");
    }
}
