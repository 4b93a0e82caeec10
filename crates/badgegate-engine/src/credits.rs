//! Credit accounting against the ledger, mirrored best-effort to the card.
//!
//! The ledger is authoritative. Card writes never gate a decision: when the
//! counter block cannot be updated the drift is logged and the scan proceeds
//! on the ledger value alone.

use crate::error::{EngineError, EngineResult};
use badgegate_card::{CardReader, CardService};
use badgegate_core::CardUid;
use badgegate_core::constants::MAX_COUNTER;
use badgegate_store::{BadgeRecord, Ledger};
use tracing::{debug, warn};

/// Result of a billing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditOutcome {
    /// False when the balance could not cover the amount; nothing was
    /// written in that case.
    pub applied: bool,
    /// Balance after the operation (unchanged when `applied` is false).
    pub remaining: u16,
}

/// Ledger-backed credit mutations.
#[derive(Debug, Clone)]
pub struct CreditManager {
    ledger: Ledger,
}

impl CreditManager {
    pub fn new(ledger: Ledger) -> Self {
        CreditManager { ledger }
    }

    /// Bill `amount` credits. Insufficient balance is a normal outcome, not
    /// an error; an unknown uid at billing time is.
    pub fn decrement(&self, uid: &CardUid, amount: u16) -> EngineResult<CreditOutcome> {
        let record = self.require(uid)?;
        if record.credits < amount {
            debug!(%uid, balance = record.credits, amount, "insufficient credits");
            return Ok(CreditOutcome {
                applied: false,
                remaining: record.credits,
            });
        }
        let remaining = record.credits - amount;
        self.ledger.update_credits(uid, remaining)?;
        Ok(CreditOutcome {
            applied: true,
            remaining,
        })
    }

    /// Top up `amount` credits, clamping at the counter ceiling.
    pub fn increment(&self, uid: &CardUid, amount: u16) -> EngineResult<CreditOutcome> {
        let record = self.require(uid)?;
        let raw = u32::from(record.credits) + u32::from(amount);
        let remaining = BadgeRecord::clamp_credits(raw);
        if u32::from(remaining) < raw {
            warn!(%uid, requested = raw, "counter ceiling reached, clamping to {MAX_COUNTER}");
        }
        self.ledger.update_credits(uid, remaining)?;
        Ok(CreditOutcome {
            applied: true,
            remaining,
        })
    }

    /// Push the ledger balance into the card's counter block. Returns false
    /// on card failure; the ledger value stands regardless.
    pub async fn mirror_to_card<R: CardReader>(
        &self,
        service: &mut CardService<R>,
        uid: &CardUid,
        value: u16,
    ) -> bool {
        match service.write_counter(uid, u32::from(value)).await {
            Ok(()) => true,
            Err(error) => {
                warn!(%uid, value, %error, "card counter write failed, ledger and card now differ");
                false
            }
        }
    }

    fn require(&self, uid: &CardUid) -> EngineResult<BadgeRecord> {
        self.ledger
            .lookup(uid)?
            .ok_or_else(|| EngineError::UnknownBadge {
                uid: uid.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgegate_card::keyring::DEFAULT_KEY;
    use badgegate_card::mock::MockReader;
    use badgegate_card::CardTransport;

    fn uid() -> CardUid {
        "1-2-3".parse().unwrap()
    }

    fn manager_with_balance(credits: u16) -> (tempfile::TempDir, CreditManager, Ledger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("l.csv")).unwrap();
        let mut record = BadgeRecord::new(uid(), "Ada");
        record.credits = credits;
        ledger.upsert(&record).unwrap();
        (dir, CreditManager::new(ledger.clone()), ledger)
    }

    #[test]
    fn decrement_takes_from_the_balance() {
        let (_dir, manager, ledger) = manager_with_balance(5);
        let outcome = manager.decrement(&uid(), 1).unwrap();
        assert_eq!(outcome, CreditOutcome { applied: true, remaining: 4 });
        assert_eq!(ledger.lookup(&uid()).unwrap().unwrap().credits, 4);
    }

    #[test]
    fn decrement_with_insufficient_balance_mutates_nothing() {
        let (_dir, manager, ledger) = manager_with_balance(0);
        let outcome = manager.decrement(&uid(), 1).unwrap();
        assert_eq!(outcome, CreditOutcome { applied: false, remaining: 0 });
        // Repeating the failed billing stays a no-op.
        let again = manager.decrement(&uid(), 1).unwrap();
        assert_eq!(again, outcome);
        assert_eq!(ledger.lookup(&uid()).unwrap().unwrap().credits, 0);
    }

    #[test]
    fn decrement_to_exactly_zero_applies() {
        let (_dir, manager, _ledger) = manager_with_balance(1);
        let outcome = manager.decrement(&uid(), 1).unwrap();
        assert_eq!(outcome, CreditOutcome { applied: true, remaining: 0 });
    }

    #[test]
    fn unknown_badge_is_an_error_not_an_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("l.csv")).unwrap();
        let manager = CreditManager::new(ledger);
        let err = manager.decrement(&uid(), 1).unwrap_err();
        assert!(matches!(err, EngineError::UnknownBadge { .. }));
    }

    #[test]
    fn increment_clamps_at_the_counter_ceiling() {
        let (_dir, manager, ledger) = manager_with_balance(990);
        let outcome = manager.increment(&uid(), 50).unwrap();
        assert_eq!(outcome.remaining, MAX_COUNTER);
        assert_eq!(ledger.lookup(&uid()).unwrap().unwrap().credits, MAX_COUNTER);

        // Pinned at the ceiling, further top-ups are absorbed.
        let again = manager.increment(&uid(), 1).unwrap();
        assert_eq!(again.remaining, MAX_COUNTER);
    }

    #[tokio::test]
    async fn mirror_writes_the_card_counter_block() {
        let (_dir, manager, _ledger) = manager_with_balance(5);
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), DEFAULT_KEY);
        let mut service = CardService::new(CardTransport::new(reader));

        assert!(manager.mirror_to_card(&mut service, &uid(), 4).await);
        assert_eq!(&handle.block(&uid(), 5).unwrap()[..4], &[0, 0, 0, 4]);
    }

    #[tokio::test]
    async fn mirror_failure_is_reported_not_raised() {
        let (_dir, manager, _ledger) = manager_with_balance(5);
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), DEFAULT_KEY);
        handle.fail_writes(true);
        let mut service = CardService::new(CardTransport::new(reader));

        assert!(!manager.mirror_to_card(&mut service, &uid(), 4).await);
    }
}
