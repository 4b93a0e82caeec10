//! The terminal's scan loop.
//!
//! One scan flows through a fixed pipeline: duplicate gate, ledger
//! evaluation, telemetry, admin-console or billing branch, journal row,
//! feedback, suppressor update. Failures inside a scan are caught at the
//! loop boundary so a bad card or a full disk never takes the terminal
//! down.

use anyhow::Result;
use badgegate_card::{CardReader, CardService};
use badgegate_core::constants::LOOP_RECOVERY_PAUSE_MS;
use badgegate_core::{CardUid, Verdict};
use badgegate_engine::{AccessEngine, CreditManager, ScanSuppressor};
use badgegate_feedback::{Buzzer, Display, FeedbackSet, StatusLed};
use badgegate_store::{AdminChallenges, AuditEntry, Journal, Ledger};
use badgegate_telemetry::{EventPublisher, ScanEvent};
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::admin::AdminConsole;
use crate::console::Console;

/// The assembled terminal.
pub struct Terminal<R, C, P, L, B, D> {
    service: CardService<R>,
    console: C,
    publisher: P,
    feedback: FeedbackSet<L, B, D>,
    engine: AccessEngine,
    credits: CreditManager,
    suppressor: ScanSuppressor,
    ledger: Ledger,
    journal: Journal,
    challenges: AdminChallenges,
    scan_cost: u16,
    poll_interval: Duration,
}

impl<R, C, P, L, B, D> Terminal<R, C, P, L, B, D>
where
    R: CardReader,
    C: Console,
    P: EventPublisher,
    L: StatusLed,
    B: Buzzer,
    D: Display,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service: CardService<R>,
        console: C,
        ledger: Ledger,
        journal: Journal,
        challenges: AdminChallenges,
        feedback: FeedbackSet<L, B, D>,
        publisher: P,
        suppressor: ScanSuppressor,
        scan_cost: u16,
        poll_interval: Duration,
    ) -> Self {
        Terminal {
            service,
            console,
            publisher,
            feedback,
            engine: AccessEngine::new(ledger.clone()),
            credits: CreditManager::new(ledger.clone()),
            suppressor,
            ledger,
            journal,
            challenges,
            scan_cost,
            poll_interval,
        }
    }

    /// Serve scans until the surrounding task is cancelled. Per-scan
    /// failures are logged; the loop pauses briefly and continues.
    pub async fn run(&mut self) {
        self.feedback.idle().await;
        loop {
            if let Err(error) = self.process_next_scan().await {
                error!(%error, "scan processing failed");
                tokio::time::sleep(Duration::from_millis(LOOP_RECOVERY_PAUSE_MS)).await;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Shutdown cleanup: devices released, telemetry closed. Runs on every
    /// exit path.
    pub async fn shutdown(&mut self) {
        self.feedback.release().await;
        self.publisher.close().await;
    }

    /// Wait for one card and push it through the pipeline.
    pub async fn process_next_scan(&mut self) -> Result<()> {
        let uid = self.service.wait_for_card().await?;
        self.handle_scan(uid).await
    }

    async fn handle_scan(&mut self, uid: CardUid) -> Result<()> {
        let scanned_at = Instant::now();
        let now = Local::now();

        if self.suppressor.should_suppress(&uid, scanned_at) {
            return Ok(());
        }

        let verdict = self.engine.evaluate(&uid, now)?;
        info!(%uid, verdict = %verdict, "scan evaluated");

        if let Err(error) = self.publisher.publish(&ScanEvent::new(now, &uid)).await {
            warn!(%uid, %error, "telemetry publish failed");
        }

        let mut status = verdict.status_text();
        let mut billed = false;
        // Second display line for refusals; None means the door opens.
        let mut denial_note = match &verdict {
            Verdict::Denied { reason, .. } => Some(reason.to_string()),
            Verdict::Granted { .. } => None,
        };

        if verdict.is_granted() {
            if verdict.is_admin() {
                let mut admin = AdminConsole::new(
                    &mut self.console,
                    &mut self.service,
                    &self.ledger,
                    &self.journal,
                    &self.challenges,
                );
                if admin.authorize(&uid).await? {
                    admin.run().await?;
                } else {
                    // The door stays granted; only the console is refused.
                    warn!(%uid, "admin console entry refused");
                }
            } else {
                let outcome = self.credits.decrement(&uid, self.scan_cost)?;
                if outcome.applied {
                    billed = true;
                    self.credits
                        .mirror_to_card(&mut self.service, &uid, outcome.remaining)
                        .await;
                } else {
                    status = "denied: no credits".to_string();
                    denial_note = Some("no credits".to_string());
                }
            }
        }

        self.journal
            .append(&AuditEntry::new(now, &uid, verdict.name(), &status))?;

        match &denial_note {
            None => self.feedback.granted(verdict.name()).await,
            Some(note) => self.feedback.denied(note).await,
        }

        self.suppressor.mark_processed(uid, scanned_at, billed);
        Ok(())
    }
}
