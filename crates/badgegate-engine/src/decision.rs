//! The access decision engine.
//!
//! Evaluation is a strict fail-fast sequence, and its order is load-bearing:
//!
//! 1. unknown uid
//! 2. `active = false`
//! 3. expiration passed (the only step with a side effect: the record is
//!    deactivated in the ledger - lazy expiry)
//! 4. weekday outside the allowed set
//! 5. time of day outside the access window (with overnight wraparound)
//! 6. granted
//!
//! [`decide`](AccessEngine::decide) is a pure function of `(record, now)`;
//! [`evaluate`](AccessEngine::evaluate) adds the ledger lookup and the
//! expiry persistence around it.

use crate::error::EngineResult;
use badgegate_core::constants::UNREGISTERED_NAME;
use badgegate_core::{CardUid, DenyReason, Verdict};
use badgegate_store::{BadgeRecord, Ledger};
use chrono::{DateTime, Datelike, Local};
use tracing::info;

/// Ledger-backed access decisions.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    ledger: Ledger,
}

impl AccessEngine {
    pub fn new(ledger: Ledger) -> Self {
        AccessEngine { ledger }
    }

    /// Pure verdict for a known record at a given instant. No I/O.
    #[must_use]
    pub fn decide(record: &BadgeRecord, now: DateTime<Local>) -> Verdict {
        if !record.active {
            return deny(record, DenyReason::Inactive);
        }

        if let Some(expiration) = record.expiration
            && record.is_expired(now.date_naive())
        {
            return deny(record, DenyReason::Expired { on: expiration });
        }

        if !record.allowed_weekdays.allows(now.weekday()) {
            return deny(record, DenyReason::DayNotAllowed);
        }

        if let Some(window) = record.time_window()
            && !window.contains(now.time())
        {
            return deny(record, DenyReason::OutsideWindow { window });
        }

        Verdict::Granted {
            name: record.name.clone(),
            credits: record.credits,
            internal_id: record.internal_id.unwrap_or(0),
        }
    }

    /// Evaluate a scanned uid: ledger lookup, pure decision, and - on the
    /// expiration path only - persistence of `active = false`.
    pub fn evaluate(&self, uid: &CardUid, now: DateTime<Local>) -> EngineResult<Verdict> {
        let Some(record) = self.ledger.lookup(uid)? else {
            return Ok(Verdict::Denied {
                name: UNREGISTERED_NAME.to_string(),
                reason: DenyReason::UnknownCard,
            });
        };

        let verdict = Self::decide(&record, now);
        if let Verdict::Denied {
            reason: DenyReason::Expired { on },
            ..
        } = &verdict
        {
            info!(%uid, expired_on = %on, "badge expired, deactivating ledger record");
            self.ledger.set_active(uid, false)?;
        }
        Ok(verdict)
    }
}

fn deny(record: &BadgeRecord, reason: DenyReason) -> Verdict {
    Verdict::Denied {
        name: record.name.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgegate_core::WeekdaySet;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use rstest::rstest;

    fn uid() -> CardUid {
        "1-2-3".parse().unwrap()
    }

    /// Monday 2026-06-01 at the given time.
    fn monday_at(h: u32, m: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 6, 1, h, m, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn record() -> BadgeRecord {
        let mut r = BadgeRecord::new(uid(), "Ada");
        r.credits = 5;
        r.internal_id = Some(3);
        r
    }

    #[test]
    fn active_unrestricted_record_is_granted() {
        let verdict = AccessEngine::decide(&record(), monday_at(12, 0));
        assert_eq!(
            verdict,
            Verdict::Granted {
                name: "Ada".to_string(),
                credits: 5,
                internal_id: 3
            }
        );
    }

    #[rstest]
    #[case::with_credits(10)]
    #[case::without_credits(0)]
    fn inactive_record_is_always_denied(#[case] credits: u16) {
        let mut r = record();
        r.active = false;
        r.credits = credits;
        // Even with every other field permissive.
        r.expiration = None;
        let verdict = AccessEngine::decide(&r, monday_at(12, 0));
        assert_eq!(
            verdict,
            Verdict::Denied {
                name: "Ada".to_string(),
                reason: DenyReason::Inactive
            }
        );
    }

    #[test]
    fn inactive_wins_over_expiration() {
        let mut r = record();
        r.active = false;
        r.expiration = NaiveDate::from_ymd_opt(2020, 1, 1);
        let verdict = AccessEngine::decide(&r, monday_at(12, 0));
        assert!(matches!(
            verdict,
            Verdict::Denied {
                reason: DenyReason::Inactive,
                ..
            }
        ));
    }

    #[test]
    fn expiration_wins_over_weekday_and_window() {
        let mut r = record();
        let expired_on = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        r.expiration = Some(expired_on);
        r.allowed_weekdays = WeekdaySet::from_indices([5]).unwrap(); // Saturday only
        r.window_start = NaiveTime::from_hms_opt(0, 0, 0);
        r.window_end = NaiveTime::from_hms_opt(0, 1, 0);
        let verdict = AccessEngine::decide(&r, monday_at(12, 0));
        assert!(matches!(
            verdict,
            Verdict::Denied {
                reason: DenyReason::Expired { on },
                ..
            } if on == expired_on
        ));
    }

    #[test]
    fn expiration_day_itself_still_grants() {
        let mut r = record();
        r.expiration = NaiveDate::from_ymd_opt(2026, 6, 1);
        assert!(AccessEngine::decide(&r, monday_at(12, 0)).is_granted());
    }

    #[test]
    fn weekday_outside_the_set_is_denied() {
        let mut r = record();
        r.allowed_weekdays = WeekdaySet::from_indices([5, 6]).unwrap(); // weekend only
        let verdict = AccessEngine::decide(&r, monday_at(12, 0));
        assert!(matches!(
            verdict,
            Verdict::Denied {
                reason: DenyReason::DayNotAllowed,
                ..
            }
        ));
    }

    #[rstest]
    #[case(23, 30, true)]
    #[case(5, 0, true)]
    #[case(12, 0, false)]
    fn overnight_window_grants_across_midnight(#[case] h: u32, #[case] m: u32, #[case] granted: bool) {
        let mut r = record();
        r.window_start = NaiveTime::from_hms_opt(22, 0, 0);
        r.window_end = NaiveTime::from_hms_opt(6, 0, 0);
        assert_eq!(AccessEngine::decide(&r, monday_at(h, m)).is_granted(), granted);
    }

    #[test]
    fn evaluate_unknown_uid_is_denied_as_unregistered() {
        let dir = tempfile::tempdir().unwrap();
        let engine = AccessEngine::new(Ledger::open(dir.path().join("l.csv")).unwrap());
        let verdict = engine.evaluate(&uid(), monday_at(12, 0)).unwrap();
        assert_eq!(
            verdict,
            Verdict::Denied {
                name: "Unregistered".to_string(),
                reason: DenyReason::UnknownCard
            }
        );
    }

    #[test]
    fn evaluate_persists_lazy_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("l.csv")).unwrap();
        let mut r = record();
        r.expiration = NaiveDate::from_ymd_opt(2026, 5, 31);
        ledger.upsert(&r).unwrap();

        let engine = AccessEngine::new(ledger.clone());
        let verdict = engine.evaluate(&uid(), monday_at(12, 0)).unwrap();
        assert!(matches!(
            verdict,
            Verdict::Denied {
                reason: DenyReason::Expired { .. },
                ..
            }
        ));

        // A reload of the ledger shows the deactivation persisted.
        let stored = Ledger::open(dir.path().join("l.csv"))
            .unwrap()
            .lookup(&uid())
            .unwrap()
            .unwrap();
        assert!(!stored.active);
    }

    #[test]
    fn evaluate_does_not_write_on_other_denials() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("l.csv")).unwrap();
        let mut r = record();
        r.allowed_weekdays = WeekdaySet::from_indices([5]).unwrap();
        ledger.upsert(&r).unwrap();

        let engine = AccessEngine::new(ledger.clone());
        engine.evaluate(&uid(), monday_at(12, 0)).unwrap();
        assert!(ledger.lookup(&uid()).unwrap().unwrap().active);
    }
}
