//! Stdin frontend for running without reader hardware.
//!
//! The binary ships with the in-memory reader, so something has to play
//! the badge holder. This task owns stdin and splits each line two ways:
//! `scan <uid>` presents a badge to the reader, everything else is
//! forwarded to the admin console's [`ChannelConsole`].
//!
//! [`ChannelConsole`]: crate::console::ChannelConsole

use badgegate_card::MockReaderHandle;
use badgegate_card::keyring::DEFAULT_KEY;
use badgegate_core::CardUid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

/// Where one line of operator input goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `scan <uid>`: present the badge to the reader.
    Present(CardUid),
    /// A `scan` line whose uid did not parse, echoed back verbatim.
    Invalid(String),
    /// Anything else: console input for the admin menu.
    Console(String),
}

/// Classify one line of operator input.
#[must_use]
pub fn route_line(line: &str) -> Route {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix("scan ") {
        let rest = rest.trim();
        return match rest.parse() {
            Ok(uid) => Route::Present(uid),
            Err(_) => Route::Invalid(rest.to_string()),
        };
    }
    Route::Console(trimmed.to_string())
}

/// Drive the reader and the console from stdin until it closes.
///
/// A uid the reader has never seen is enrolled with the transport default
/// key on its first scan, so any `scan 1-2-3` lands a blank card.
pub async fn pump(mut handle: MockReaderHandle, console: mpsc::Sender<String>) {
    println!("type 'scan <uid>' to present a badge (e.g. scan 1-2-3)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match route_line(&line) {
            Route::Present(uid) => {
                if handle.block(&uid, 0).is_none() {
                    handle.add_card(uid.clone(), DEFAULT_KEY);
                }
                if let Err(error) = handle.present(uid).await {
                    warn!(%error, "badge presentation failed");
                }
            }
            Route::Invalid(raw) => println!("not a uid: '{raw}'"),
            Route::Console(text) => {
                if console.send(text).await.is_err() {
                    break;
                }
            }
        }
    }
}
