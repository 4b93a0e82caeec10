//! The scan-event wire payload.

use badgegate_core::CardUid;
use badgegate_core::constants::TIMESTAMP_FORMAT;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One scan, as reported to the collector.
///
/// Field names are part of the wire contract with the existing collector
/// and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Local timestamp, `%Y-%m-%d %H:%M:%S`.
    pub date_heure: String,

    /// Canonical dash-joined uid.
    pub uid: String,
}

impl ScanEvent {
    #[must_use]
    pub fn new(at: DateTime<Local>, uid: &CardUid) -> Self {
        ScanEvent {
            date_heure: at.format(TIMESTAMP_FORMAT).to_string(),
            uid: uid.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn event_serializes_with_the_contract_field_names() {
        let at = Local.with_ymd_and_hms(2026, 6, 1, 8, 30, 15).single().unwrap();
        let uid: CardUid = "250-152-169-174-101".parse().unwrap();
        let event = ScanEvent::new(at, &uid);
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"date_heure":"2026-06-01 08:30:15","uid":"250-152-169-174-101"}"#
        );
    }
}
