//! The admin console.
//!
//! Entered only after an admin badge has been granted access. If the admin
//! uid carries a challenge question, console entry requires the answer
//! (three attempts); exhausting the attempts denies the console, not the
//! door.

use anyhow::Result;
use badgegate_card::{CardReader, CardService, is_trailer_block};
use badgegate_core::constants::{DATE_FORMAT, MAX_CHALLENGE_ATTEMPTS, MAX_DIAGNOSTIC_BLOCK, TIME_FORMAT};
use badgegate_core::{CardUid, WeekdaySet};
use badgegate_store::{AdminChallenges, BadgeRecord, Journal, Ledger};
use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::console::Console;

const MENU: &str = "\
--- admin console ---
 1  provision / update badge
 2  delete badge
 3  list badges
 4  read card block
 5  write card block
 6  view access history
 0  exit";

/// Menu-driven badge administration over a [`Console`].
pub struct AdminConsole<'a, C, R> {
    console: &'a mut C,
    service: &'a mut CardService<R>,
    ledger: &'a Ledger,
    journal: &'a Journal,
    challenges: &'a AdminChallenges,
}

impl<'a, C: Console, R: CardReader> AdminConsole<'a, C, R> {
    pub fn new(
        console: &'a mut C,
        service: &'a mut CardService<R>,
        ledger: &'a Ledger,
        journal: &'a Journal,
        challenges: &'a AdminChallenges,
    ) -> Self {
        AdminConsole {
            console,
            service,
            ledger,
            journal,
            challenges,
        }
    }

    /// Step-up challenge for the admin uid. True when no challenge is
    /// registered or the question is answered within three attempts.
    pub async fn authorize(&mut self, uid: &CardUid) -> Result<bool> {
        let Some(question) = self.challenges.question(uid) else {
            return Ok(true);
        };
        let question = question.to_string();

        for attempt in 1..=MAX_CHALLENGE_ATTEMPTS {
            let answer = self.console.prompt(&question).await?;
            if self.challenges.verify(uid, &answer) {
                return Ok(true);
            }
            self.console
                .say(&format!("wrong answer ({attempt}/{MAX_CHALLENGE_ATTEMPTS})"));
        }
        warn!(%uid, "admin challenge attempts exhausted");
        Ok(false)
    }

    /// Run the menu until the operator exits.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.console.say(MENU);
            let choice = self.console.prompt("choice:").await?;
            match choice.as_str() {
                "1" => self.provision().await?,
                "2" => self.delete_badge().await?,
                "3" => self.list_badges()?,
                "4" => self.read_block().await?,
                "5" => self.write_block().await?,
                "6" => self.history()?,
                "0" | "" | "q" => break,
                other => self.console.say(&format!("unknown option '{other}'")),
            }
        }
        Ok(())
    }

    async fn provision(&mut self) -> Result<()> {
        self.console.say("present the badge to provision");
        let uid = self.service.wait_for_card().await?;

        // Challenge-holding admin badges are managed by hand, never through
        // this menu.
        if self.challenges.contains(&uid) {
            self.console
                .say("this badge holds an admin challenge and cannot be provisioned here");
            return Ok(());
        }

        let existing = self.ledger.lookup(&uid)?;
        let mut record = existing
            .clone()
            .unwrap_or_else(|| BadgeRecord::new(uid.clone(), BadgeRecord::unregistered_name()));
        self.console.say(&format!(
            "badge {uid} ({})",
            if existing.is_some() { "registered" } else { "new" }
        ));

        let name = self
            .console
            .prompt(&format!("name [{}]:", record.name))
            .await?;
        if !name.is_empty() {
            record.name = name;
        }

        let active = self
            .console
            .prompt(&format!(
                "active (y/n) [{}]:",
                if record.active { "y" } else { "n" }
            ))
            .await?;
        match active.to_ascii_lowercase().as_str() {
            "y" => record.active = true,
            "n" => record.active = false,
            _ => {}
        }

        let credits = self
            .console
            .prompt(&format!("credits [{}]:", record.credits))
            .await?;
        if let Ok(value) = credits.parse::<u32>() {
            record.credits = BadgeRecord::clamp_credits(value);
        }

        record.expiration = self
            .prompt_date(&format!("expiration {DATE_FORMAT} (blank = none):"))
            .await?;

        record.window_start = self
            .prompt_time(&format!("window start {TIME_FORMAT} (blank = none):"))
            .await?;
        record.window_end = self
            .prompt_time(&format!("window end {TIME_FORMAT} (blank = none):"))
            .await?;

        let days = self
            .console
            .prompt("allowed days, dash-joined 0=Mon..6=Sun (blank = all):")
            .await?;
        if days.is_empty() {
            record.allowed_weekdays = WeekdaySet::all_days();
        } else {
            let indices: Option<Vec<u8>> =
                days.split('-').map(|p| p.trim().parse().ok()).collect();
            match indices.and_then(|i| WeekdaySet::from_indices(i).ok()) {
                Some(set) => record.allowed_weekdays = set,
                None => self.console.say("invalid day list, keeping all days"),
            }
        }

        let outcome = self.ledger.upsert(&record)?;
        info!(%uid, id = outcome.internal_id, created = outcome.created, "badge saved");
        self.console
            .say(&format!("saved: {} (id {})", record.name, outcome.internal_id));

        // Mirror to the card: the id only the first time it exists, the
        // counter on every save.
        self.console
            .prompt("hold the badge on the reader and press enter")
            .await?;
        let confirm = self.service.wait_for_card().await?;
        if confirm != uid {
            warn!(expected = %uid, got = %confirm, "different badge presented, card not written");
            self.console.say("different badge presented, card not written");
            return Ok(());
        }
        if outcome.id_assigned {
            if let Err(error) = self
                .service
                .write_identity(&uid, &outcome.internal_id.to_string())
                .await
            {
                warn!(%uid, %error, "identity block write failed");
                self.console.say("warning: identity block write failed");
            }
        }
        if let Err(error) = self
            .service
            .write_counter(&uid, u32::from(record.credits))
            .await
        {
            warn!(%uid, %error, "counter block write failed");
            self.console.say("warning: counter block write failed");
        }
        Ok(())
    }

    async fn delete_badge(&mut self) -> Result<()> {
        self.console.say("present the badge to delete");
        let uid = self.service.wait_for_card().await?;
        let Some(record) = self.ledger.lookup(&uid)? else {
            self.console.say("badge is not registered");
            return Ok(());
        };
        let confirm = self
            .console
            .prompt(&format!("delete '{}' ({uid})? (y/n):", record.name))
            .await?;
        if confirm.eq_ignore_ascii_case("y") {
            self.ledger.delete(&uid)?;
            info!(%uid, name = %record.name, "badge deleted");
            self.console.say("deleted");
        } else {
            self.console.say("kept");
        }
        Ok(())
    }

    fn list_badges(&mut self) -> Result<()> {
        let records = self.ledger.list_all()?;
        self.console.say(&format!(
            "{:>4}  {:<24} {:<20} {:<6} {:>7}  {:<10} {:<11} {}",
            "id", "uid", "name", "active", "credits", "expires", "window", "days"
        ));
        for r in &records {
            self.console.say(&format!(
                "{:>4}  {:<24} {:<20} {:<6} {:>7}  {:<10} {:<11} {}",
                r.internal_id.map_or_else(|| "-".to_string(), |i| i.to_string()),
                r.uid.to_string(),
                r.name,
                if r.active { "yes" } else { "no" },
                r.credits,
                r.expiration
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                r.time_window()
                    .map(|w| w.to_string())
                    .unwrap_or_default(),
                r.allowed_weekdays,
            ));
        }
        self.console.say(&format!("{} badge(s)", records.len()));
        Ok(())
    }

    /// Dump the access journal, oldest scan first.
    fn history(&mut self) -> Result<()> {
        let entries = self.journal.entries()?;
        self.console.say(&format!(
            "{:<19}  {:<24} {:<20} {}",
            "date/time", "uid", "name", "status"
        ));
        for e in &entries {
            self.console.say(&format!(
                "{:<19}  {:<24} {:<20} {}",
                e.timestamp, e.uid, e.name, e.status
            ));
        }
        self.console.say(&format!("{} row(s)", entries.len()));
        Ok(())
    }

    async fn read_block(&mut self) -> Result<()> {
        let Some(block) = self.prompt_block().await? else {
            return Ok(());
        };
        self.console.say("present the badge to read");
        let uid = self.service.wait_for_card().await?;
        match self.service.read_block(&uid, block).await {
            Ok(data) => {
                let hex: String = data.iter().map(|b| format!("{b:02X}")).collect();
                self.console.say(&format!("block {block}: {hex}"));
            }
            Err(error) => self.console.say(&format!("read failed: {error}")),
        }
        Ok(())
    }

    async fn write_block(&mut self) -> Result<()> {
        let Some(block) = self.prompt_block().await? else {
            return Ok(());
        };
        let raw = self.console.prompt("32 hex digits to write:").await?;
        let Some(data) = parse_hex_block(&raw) else {
            self.console.say("invalid hex payload");
            return Ok(());
        };
        self.console.say("present the badge to write");
        let uid = self.service.wait_for_card().await?;
        match self.service.write_block(&uid, block, &data).await {
            Ok(()) => self.console.say("written"),
            Err(error) => self.console.say(&format!("write failed: {error}")),
        }
        Ok(())
    }

    /// Prompt for a diagnostic block number; only blocks 0-5 excluding the
    /// sector trailer are accepted.
    async fn prompt_block(&mut self) -> Result<Option<u8>> {
        let raw = self
            .console
            .prompt(&format!("block number (0-{MAX_DIAGNOSTIC_BLOCK}):"))
            .await?;
        match raw.parse::<u8>() {
            Ok(block) if block <= MAX_DIAGNOSTIC_BLOCK && !is_trailer_block(block) => {
                Ok(Some(block))
            }
            Ok(block) if is_trailer_block(block) => {
                self.console
                    .say(&format!("block {block} is a sector trailer, refusing"));
                Ok(None)
            }
            _ => {
                self.console.say("invalid block number");
                Ok(None)
            }
        }
    }

    async fn prompt_date(&mut self, prompt: &str) -> Result<Option<NaiveDate>> {
        let raw = self.console.prompt(prompt).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                self.console.say("invalid date, ignored");
                Ok(None)
            }
        }
    }

    async fn prompt_time(&mut self, prompt: &str) -> Result<Option<NaiveTime>> {
        let raw = self.console.prompt(prompt).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        match NaiveTime::parse_from_str(&raw, TIME_FORMAT) {
            Ok(time) => Ok(Some(time)),
            Err(_) => {
                self.console.say("invalid time, ignored");
                Ok(None)
            }
        }
    }
}

fn parse_hex_block(raw: &str) -> Option<[u8; 16]> {
    let raw: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if raw.len() != 32 {
        return None;
    }
    let mut data = [0u8; 16];
    for (i, chunk) in raw.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).ok()?;
        data[i] = u8::from_str_radix(pair, 16).ok()?;
    }
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use badgegate_card::keyring::DEFAULT_KEY;
    use badgegate_card::mock::{MockReader, MockReaderHandle};
    use badgegate_card::CardTransport;

    fn uid() -> CardUid {
        "250-152-169-174-101".parse().unwrap()
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        ledger: Ledger,
        journal: Journal,
        challenges: AdminChallenges,
        service: CardService<MockReader>,
        handle: MockReaderHandle,
    }

    fn fixture(challenges: AdminChallenges) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("cartes.csv")).unwrap();
        let journal = Journal::new(dir.path().join("journal.csv"));
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), DEFAULT_KEY);
        Fixture {
            _dir: dir,
            ledger,
            journal,
            challenges,
            service: CardService::new(CardTransport::new(reader)),
            handle,
        }
    }

    fn challenge_file(dir: &tempfile::TempDir) -> AdminChallenges {
        let path = dir.path().join("pass.json");
        std::fs::write(
            &path,
            r#"{"pass":[{"uid":"250-152-169-174-101","nom":"admin","question":"first pet?","reponse":"Rex"}]}"#,
        )
        .unwrap();
        AdminChallenges::load(&path).unwrap()
    }

    #[tokio::test]
    async fn authorize_passes_without_a_challenge() {
        let mut f = fixture(AdminChallenges::empty());
        let mut console = ScriptedConsole::default();
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        assert!(admin.authorize(&uid()).await.unwrap());
    }

    #[tokio::test]
    async fn authorize_accepts_a_case_insensitive_answer() {
        let dir = tempfile::tempdir().unwrap();
        let challenges = challenge_file(&dir);
        let mut f = fixture(challenges);
        let mut console = ScriptedConsole::new(["wrong", "  rex  "]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        assert!(admin.authorize(&uid()).await.unwrap());
        assert!(console.saw("first pet?"));
    }

    #[tokio::test]
    async fn authorize_denies_after_three_wrong_answers() {
        let dir = tempfile::tempdir().unwrap();
        let challenges = challenge_file(&dir);
        let mut f = fixture(challenges);
        let mut console = ScriptedConsole::new(["a", "b", "c"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        assert!(!admin.authorize(&uid()).await.unwrap());
        assert!(console.saw("wrong answer (3/3)"));
    }

    #[tokio::test]
    async fn provision_creates_a_record_and_writes_the_card() {
        let mut f = fixture(AdminChallenges::empty());
        // Two card presentations: the initial scan and the write rescan.
        f.handle.present(uid()).await.unwrap();
        f.handle.present(uid()).await.unwrap();

        // menu: provision, then exit.
        let mut console = ScriptedConsole::new([
            "1",      // provision
            "Ada",    // name
            "y",      // active
            "7",      // credits
            "",       // expiration
            "",       // window start
            "",       // window end
            "",       // days
            "",       // press enter for the card write
            "0",      // exit
        ]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();

        let stored = f.ledger.lookup(&uid()).unwrap().unwrap();
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.credits, 7);
        assert_eq!(stored.internal_id, Some(1));

        // Identity block holds the new id, counter block the credits.
        assert_eq!(&f.handle.block(&uid(), 4).unwrap()[..1], b"1");
        assert_eq!(&f.handle.block(&uid(), 5).unwrap()[..4], &[0, 0, 0, 7]);
    }

    #[tokio::test]
    async fn provision_update_does_not_rewrite_the_identity_block() {
        let mut f = fixture(AdminChallenges::empty());
        let mut record = BadgeRecord::new(uid(), "Ada");
        record.credits = 7;
        f.ledger.upsert(&record).unwrap();
        // Scribble the identity block so a rewrite would be visible.
        f.handle.set_block(&uid(), 4, [0xAA; 16]);

        f.handle.present(uid()).await.unwrap();
        f.handle.present(uid()).await.unwrap();
        let mut console = ScriptedConsole::new(["1", "", "", "9", "", "", "", "", "", "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();

        let stored = f.ledger.lookup(&uid()).unwrap().unwrap();
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.credits, 9);
        // Identity block untouched on update, counter rewritten.
        assert_eq!(f.handle.block(&uid(), 4).unwrap(), [0xAA; 16]);
        assert_eq!(&f.handle.block(&uid(), 5).unwrap()[..4], &[0, 0, 0, 9]);
    }

    #[tokio::test]
    async fn provision_refuses_a_challenge_holding_badge() {
        let dir = tempfile::tempdir().unwrap();
        let challenges = challenge_file(&dir);
        let mut f = fixture(challenges);
        f.handle.present(uid()).await.unwrap();
        let mut console = ScriptedConsole::new(["1", "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();

        assert!(console.saw("cannot be provisioned"));
        assert!(f.ledger.lookup(&uid()).unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut f = fixture(AdminChallenges::empty());
        f.ledger.upsert(&BadgeRecord::new(uid(), "Ada")).unwrap();

        f.handle.present(uid()).await.unwrap();
        let mut console = ScriptedConsole::new(["2", "n", "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();
        assert!(f.ledger.lookup(&uid()).unwrap().is_some());

        f.handle.present(uid()).await.unwrap();
        let mut console = ScriptedConsole::new(["2", "y", "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();
        assert!(f.ledger.lookup(&uid()).unwrap().is_none());
    }

    #[tokio::test]
    async fn list_prints_every_badge() {
        let mut f = fixture(AdminChallenges::empty());
        f.ledger.upsert(&BadgeRecord::new(uid(), "Ada")).unwrap();
        f.ledger
            .upsert(&BadgeRecord::new("1-2-3".parse().unwrap(), "Grace"))
            .unwrap();

        let mut console = ScriptedConsole::new(["3", "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();
        assert!(console.saw("Ada"));
        assert!(console.saw("Grace"));
        assert!(console.saw("2 badge(s)"));
    }

    #[tokio::test]
    async fn history_lists_every_journal_row() {
        use chrono::TimeZone;

        let mut f = fixture(AdminChallenges::empty());
        let at = chrono::Local
            .with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
            .single()
            .unwrap();
        f.journal
            .append(&badgegate_store::AuditEntry::new(at, &uid(), "Ada", "granted"))
            .unwrap();
        f.journal
            .append(&badgegate_store::AuditEntry::new(
                at,
                &"1-2-3".parse().unwrap(),
                "Unregistered",
                "denied: unknown card",
            ))
            .unwrap();

        let mut console = ScriptedConsole::new(["6", "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();

        assert!(console.saw("2026-06-01 08:00:00"));
        assert!(console.saw("Ada"));
        assert!(console.saw("denied: unknown card"));
        assert!(console.saw("2 row(s)"));
    }

    #[tokio::test]
    async fn diagnostic_menu_refuses_the_trailer_block() {
        let mut f = fixture(AdminChallenges::empty());
        let mut console = ScriptedConsole::new(["4", "3", "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();
        assert!(console.saw("sector trailer"));
    }

    #[tokio::test]
    async fn diagnostic_write_round_trips_hex() {
        let mut f = fixture(AdminChallenges::empty());
        f.handle.present(uid()).await.unwrap();
        let payload = "000102030405060708090A0B0C0D0E0F";
        let mut console = ScriptedConsole::new(["5", "1", payload, "0"]);
        let mut admin =
            AdminConsole::new(&mut console, &mut f.service, &f.ledger, &f.journal, &f.challenges);
        admin.run().await.unwrap();

        let expected: [u8; 16] = core::array::from_fn(|i| i as u8);
        assert_eq!(f.handle.block(&uid(), 1).unwrap(), expected);
    }

    #[test]
    fn hex_parser_rejects_bad_payloads() {
        assert!(parse_hex_block("00").is_none());
        assert!(parse_hex_block("zz0102030405060708090A0B0C0D0E0F").is_none());
        assert!(parse_hex_block("00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F").is_some());
    }
}
