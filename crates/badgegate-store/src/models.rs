//! Badge record model and its on-disk field encodings.
//!
//! The ledger file uses one canonical schema with the historical French
//! headers: `UID,Nom,Actif,Credits,Id,Expiration,Debut,Fin,Jours`. The
//! serde `with` modules below pin the exact cell formats: `Actif` is the
//! literal `"True"`/`"False"`, dates are `%Y-%m-%d`, times `%H:%M`, and
//! `Jours` a dash-joined list of weekday indices (empty = all days).

use badgegate_core::constants::{DATE_FORMAT, MAX_COUNTER, TIME_FORMAT, UNREGISTERED_NAME};
use badgegate_core::{CardUid, TimeWindow, WeekdaySet};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One row of the badge ledger.
///
/// # Invariants
///
/// - `uid` is unique across the file (enforced on write, assumed on read)
/// - `internal_id` is unique and never reassigned once set; `None` only for
///   legacy rows that predate id assignment
/// - `credits` stays within `0..=MAX_COUNTER`
/// - a record without `active = true` never authorizes, whatever the other
///   fields say
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRecord {
    #[serde(rename = "UID")]
    pub uid: CardUid,

    #[serde(rename = "Nom")]
    pub name: String,

    #[serde(rename = "Actif", with = "fields::py_bool")]
    pub active: bool,

    #[serde(rename = "Credits")]
    pub credits: u16,

    /// Small positive id assigned monotonically at first provisioning and
    /// mirrored to the card's identity block. Id 0 is reserved for a seeded
    /// admin record.
    #[serde(rename = "Id", with = "fields::opt_u32")]
    pub internal_id: Option<u32>,

    /// Lazy expiry: a past date forces `active = false` at evaluation time.
    #[serde(rename = "Expiration", with = "fields::opt_date")]
    pub expiration: Option<NaiveDate>,

    #[serde(rename = "Debut", with = "fields::opt_time")]
    pub window_start: Option<NaiveTime>,

    #[serde(rename = "Fin", with = "fields::opt_time")]
    pub window_end: Option<NaiveTime>,

    #[serde(rename = "Jours", with = "fields::weekdays")]
    pub allowed_weekdays: WeekdaySet,
}

impl BadgeRecord {
    /// A fresh, unrestricted record for a newly provisioned badge.
    #[must_use]
    pub fn new(uid: CardUid, name: impl Into<String>) -> Self {
        BadgeRecord {
            uid,
            name: name.into(),
            active: true,
            credits: 0,
            internal_id: None,
            expiration: None,
            window_start: None,
            window_end: None,
            allowed_weekdays: WeekdaySet::all_days(),
        }
    }

    /// The display name used when a badge has never been provisioned.
    #[must_use]
    pub fn unregistered_name() -> &'static str {
        UNREGISTERED_NAME
    }

    /// The record's access window, present only when both bounds are set.
    #[must_use]
    pub fn time_window(&self) -> Option<TimeWindow> {
        match (self.window_start, self.window_end) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
            _ => None,
        }
    }

    /// Whether the record's expiration date lies strictly before `today`.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration.is_some_and(|expiration| today > expiration)
    }

    /// Clamp credits into the counter range.
    #[must_use]
    pub fn clamp_credits(value: u32) -> u16 {
        value.min(u32::from(MAX_COUNTER)) as u16
    }
}

/// Cell-level encodings for the ledger file.
mod fields {
    use super::{DATE_FORMAT, TIME_FORMAT};
    use badgegate_core::WeekdaySet;
    use chrono::{NaiveDate, NaiveTime};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// `Actif` column: literal `"True"` / `"False"` (accepted
    /// case-insensitively on read; empty reads as false).
    pub mod py_bool {
        use super::*;

        pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(if *value { "True" } else { "False" })
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
            let s = String::deserialize(deserializer)?;
            match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                other => Err(D::Error::custom(format!("invalid boolean cell '{other}'"))),
            }
        }
    }

    /// `Id` column: decimal id, empty for legacy rows without one.
    pub mod opt_u32 {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<u32>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(id) => serializer.collect_str(id),
                None => serializer.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u32>, D::Error> {
            let s = String::deserialize(deserializer)?;
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse().map(Some).map_err(D::Error::custom)
        }
    }

    /// `Expiration` column: `%Y-%m-%d`, empty for none.
    pub mod opt_date {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
                None => serializer.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            let s = String::deserialize(deserializer)?;
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(Some)
                .map_err(D::Error::custom)
        }
    }

    /// `Debut`/`Fin` columns: `%H:%M`, empty for none.
    pub mod opt_time {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
                None => serializer.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let s = String::deserialize(deserializer)?;
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            NaiveTime::parse_from_str(s, TIME_FORMAT)
                .map(Some)
                .map_err(D::Error::custom)
        }
    }

    /// `Jours` column: dash-joined weekday indices, empty for all days.
    pub mod weekdays {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &WeekdaySet,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_str(value)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<WeekdaySet, D::Error> {
            let s = String::deserialize(deserializer)?;
            let s = s.trim();
            if s.is_empty() {
                return Ok(WeekdaySet::all_days());
            }
            let indices = s
                .split('-')
                .map(|part| part.trim().parse::<u8>().map_err(D::Error::custom))
                .collect::<Result<Vec<u8>, D::Error>>()?;
            WeekdaySet::from_indices(indices).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn uid() -> CardUid {
        "111-111-111-111-111".parse().unwrap()
    }

    #[test]
    fn new_record_is_active_and_unrestricted() {
        let record = BadgeRecord::new(uid(), "Yan LeKerreq");
        assert!(record.active);
        assert_eq!(record.credits, 0);
        assert!(record.internal_id.is_none());
        assert!(record.time_window().is_none());
        assert!(record.allowed_weekdays.is_empty());
    }

    #[test]
    fn window_requires_both_bounds() {
        let mut record = BadgeRecord::new(uid(), "x");
        record.window_start = NaiveTime::from_hms_opt(8, 0, 0);
        assert!(record.time_window().is_none());
        record.window_end = NaiveTime::from_hms_opt(17, 0, 0);
        assert!(record.time_window().is_some());
    }

    #[test]
    fn expiry_is_strictly_after_the_date() {
        let mut record = BadgeRecord::new(uid(), "x");
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        record.expiration = Some(date);
        assert!(!record.is_expired(date));
        assert!(record.is_expired(date.succ_opt().unwrap()));
        assert!(!record.is_expired(date.pred_opt().unwrap()));
    }

    #[test]
    fn credits_clamp_at_the_counter_ceiling() {
        assert_eq!(BadgeRecord::clamp_credits(42), 42);
        assert_eq!(BadgeRecord::clamp_credits(999), 999);
        assert_eq!(BadgeRecord::clamp_credits(1_000), 999);
        assert_eq!(BadgeRecord::clamp_credits(u32::MAX), 999);
    }

    #[test]
    fn record_serializes_to_the_canonical_row() {
        let mut record = BadgeRecord::new(uid(), "Yan LeKerreq");
        record.credits = 12;
        record.internal_id = Some(1);
        record.expiration = NaiveDate::from_ymd_opt(2026, 12, 31);
        record.window_start = NaiveTime::from_hms_opt(22, 0, 0);
        record.window_end = NaiveTime::from_hms_opt(6, 0, 0);
        record.allowed_weekdays = WeekdaySet::from_indices([0, 4]).unwrap();

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&record).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "UID,Nom,Actif,Credits,Id,Expiration,Debut,Fin,Jours"
        );
        assert_eq!(
            lines.next().unwrap(),
            "111-111-111-111-111,Yan LeKerreq,True,12,1,2026-12-31,22:00,06:00,0-4"
        );
    }

    #[rstest]
    #[case::canonical("True", true)]
    #[case::lowercase("true", true)]
    #[case::padded(" TRUE ", true)]
    #[case::canonical_false("False", false)]
    #[case::empty_cell("", false)]
    fn active_cell_variants_parse(#[case] cell: &str, #[case] active: bool) {
        let data = format!(
            "UID,Nom,Actif,Credits,Id,Expiration,Debut,Fin,Jours\n1-2-3,Ada,{cell},0,,,,,\n"
        );
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: BadgeRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(record.active, active);
    }

    #[test]
    fn record_parses_back_from_the_canonical_row() {
        let data = "UID,Nom,Actif,Credits,Id,Expiration,Debut,Fin,Jours\n\
                    1-2-3,Ada,False,7,,,,,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: BadgeRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(record.uid, "1-2-3".parse().unwrap());
        assert!(!record.active);
        assert_eq!(record.credits, 7);
        assert!(record.internal_id.is_none());
        assert!(record.expiration.is_none());
        assert!(record.allowed_weekdays.is_empty());
    }
}
