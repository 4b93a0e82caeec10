//! Duplicate-scan suppression.
//!
//! A badge left on the reader produces a stream of detections. Only the
//! first one within the cooldown is processed; a billed scan holds the
//! longer cooldown so a slow withdrawal cannot double-charge. The marker is
//! set after the scan fully completes, so a scan aborted mid-processing can
//! be retried immediately.

use badgegate_core::CardUid;
use badgegate_core::constants::{BILLED_COOLDOWN_SECS, DEFAULT_COOLDOWN_SECS};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct LastScan {
    uid: CardUid,
    at: Instant,
    billed: bool,
}

/// Same-card cooldown tracker. Remembers only the most recent completed
/// scan: a different card always passes and resets the window.
#[derive(Debug, Clone)]
pub struct ScanSuppressor {
    cooldown: Duration,
    billed_cooldown: Duration,
    last: Option<LastScan>,
}

impl Default for ScanSuppressor {
    fn default() -> Self {
        ScanSuppressor::new(
            Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            Duration::from_secs(BILLED_COOLDOWN_SECS),
        )
    }
}

impl ScanSuppressor {
    #[must_use]
    pub fn new(cooldown: Duration, billed_cooldown: Duration) -> Self {
        ScanSuppressor {
            cooldown,
            billed_cooldown,
            last: None,
        }
    }

    /// Whether a detection of `uid` at `now` is a duplicate to discard.
    #[must_use]
    pub fn should_suppress(&self, uid: &CardUid, now: Instant) -> bool {
        let Some(last) = &self.last else {
            return false;
        };
        if &last.uid != uid {
            return false;
        }
        let window = if last.billed {
            self.billed_cooldown
        } else {
            self.cooldown
        };
        let elapsed = now.saturating_duration_since(last.at);
        if elapsed < window {
            debug!(%uid, ?elapsed, "duplicate scan suppressed");
            true
        } else {
            false
        }
    }

    /// Record a fully processed scan. `billed` selects the longer cooldown
    /// for subsequent detections of the same card.
    pub fn mark_processed(&mut self, uid: CardUid, now: Instant, billed: bool) {
        self.last = Some(LastScan { uid, at: now, billed });
    }
}
