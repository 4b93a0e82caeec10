//! Mock RFID reader for testing and development.
//!
//! [`MockReader`] simulates a reader with an in-memory population of cards,
//! each with its own sector key and 64 blocks of storage. The paired
//! [`MockReaderHandle`] presents cards to the reader, inspects block
//! contents, and injects transport faults.
//!
//! # Examples
//!
//! ```
//! use badgegate_card::mock::MockReader;
//! use badgegate_card::traits::CardReader;
//! use badgegate_card::keyring::DEFAULT_KEY;
//! use badgegate_core::CardUid;
//!
//! #[tokio::main]
//! async fn main() -> badgegate_card::Result<()> {
//!     let (mut reader, mut handle) = MockReader::new();
//!
//!     let uid = CardUid::new(vec![4, 0xAB, 0xCD, 0xEF]).unwrap();
//!     handle.add_card(uid.clone(), DEFAULT_KEY);
//!     handle.present(uid.clone()).await?;
//!
//!     let seen = reader.wait_for_card().await?;
//!     assert_eq!(seen, uid);
//!     Ok(())
//! }
//! ```

use crate::error::{CardError, Result};
use crate::keyring::Key;
use crate::traits::CardReader;
use badgegate_core::CardUid;
use badgegate_core::constants::BLOCK_LEN;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Blocks on a simulated 1K card (16 sectors of 4 blocks).
const TOTAL_BLOCKS: usize = 64;

#[derive(Debug, Clone)]
struct MockCard {
    key: Key,
    blocks: [[u8; BLOCK_LEN]; TOTAL_BLOCKS],
}

#[derive(Debug, Default)]
struct MockState {
    cards: HashMap<CardUid, MockCard>,
    selected: Option<CardUid>,
    session_open: bool,
    fail_reads: bool,
    fail_writes: bool,
    truncate_reads: bool,
}

/// Simulated RFID reader.
#[derive(Debug)]
pub struct MockReader {
    event_rx: mpsc::Receiver<CardUid>,
    state: Arc<Mutex<MockState>>,
}

impl MockReader {
    /// Create a reader/handle pair.
    pub fn new() -> (Self, MockReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let state = Arc::new(Mutex::new(MockState::default()));
        let reader = MockReader {
            event_rx,
            state: Arc::clone(&state),
        };
        let handle = MockReaderHandle { event_tx, state };
        (reader, handle)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock reader state poisoned")
    }
}

impl CardReader for MockReader {
    async fn wait_for_card(&mut self) -> Result<CardUid> {
        let uid = self
            .event_rx
            .recv()
            .await
            .ok_or_else(|| CardError::device("card event channel closed"))?;
        let mut state = self.lock();
        state.selected = Some(uid.clone());
        state.session_open = false;
        Ok(uid)
    }

    async fn auth(&mut self, uid: &CardUid, _block: u8, key: &Key) -> Result<bool> {
        let mut state = self.lock();
        let matched = state
            .cards
            .get(uid)
            .is_some_and(|card| &card.key == key);
        if matched {
            state.selected = Some(uid.clone());
            state.session_open = true;
        }
        Ok(matched)
    }

    async fn read(&mut self, block: u8) -> Result<Vec<u8>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(CardError::device("injected read fault"));
        }
        let card = selected_card(&state)?;
        if !state.session_open {
            return Err(CardError::device("read without an authenticated session"));
        }
        let data = card.blocks[block as usize].to_vec();
        if state.truncate_reads {
            return Ok(data[..BLOCK_LEN - 1].to_vec());
        }
        Ok(data)
    }

    async fn write(&mut self, block: u8, data: &[u8; BLOCK_LEN]) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(CardError::device("injected write fault"));
        }
        if !state.session_open {
            return Err(CardError::device("write without an authenticated session"));
        }
        let selected = state
            .selected
            .clone()
            .ok_or_else(|| CardError::device("no card selected"))?;
        let card = state
            .cards
            .get_mut(&selected)
            .ok_or_else(|| CardError::device("selected card left the field"))?;
        card.blocks[block as usize] = *data;
        Ok(())
    }

    async fn stop_crypto(&mut self) -> Result<()> {
        self.lock().session_open = false;
        Ok(())
    }
}

fn selected_card<'a>(state: &'a MockState) -> Result<&'a MockCard> {
    let selected = state
        .selected
        .as_ref()
        .ok_or_else(|| CardError::device("no card selected"))?;
    state
        .cards
        .get(selected)
        .ok_or_else(|| CardError::device("selected card left the field"))
}

/// Controller handle for a [`MockReader`].
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    event_tx: mpsc::Sender<CardUid>,
    state: Arc<Mutex<MockState>>,
}

impl MockReaderHandle {
    /// Register a card with its sector key. Blocks start zeroed.
    pub fn add_card(&mut self, uid: CardUid, key: Key) {
        self.lock().cards.insert(
            uid,
            MockCard {
                key,
                blocks: [[0u8; BLOCK_LEN]; TOTAL_BLOCKS],
            },
        );
    }

    /// Present a registered card to the reader.
    ///
    /// # Errors
    /// Returns a device error if the UID is unknown or the reader has been
    /// dropped.
    pub async fn present(&mut self, uid: CardUid) -> Result<()> {
        if !self.lock().cards.contains_key(&uid) {
            return Err(CardError::device(format!("card {uid} not registered")));
        }
        self.event_tx
            .send(uid)
            .await
            .map_err(|_| CardError::device("reader dropped"))
    }

    /// Overwrite a block directly, bypassing authentication.
    pub fn set_block(&mut self, uid: &CardUid, block: u8, data: [u8; BLOCK_LEN]) {
        if let Some(card) = self.lock().cards.get_mut(uid) {
            card.blocks[block as usize] = data;
        }
    }

    /// Inspect a block directly, bypassing authentication.
    #[must_use]
    pub fn block(&self, uid: &CardUid, block: u8) -> Option<[u8; BLOCK_LEN]> {
        self.lock()
            .cards
            .get(uid)
            .map(|card| card.blocks[block as usize])
    }

    /// Make subsequent reads fail at the transport level.
    pub fn fail_reads(&mut self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Make subsequent writes fail at the transport level.
    pub fn fail_writes(&mut self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make subsequent reads return a short payload.
    pub fn truncate_reads(&mut self, truncate: bool) {
        self.lock().truncate_reads = truncate;
    }

    /// Whether a crypto session is currently open (for asserting the
    /// always-release discipline).
    #[must_use]
    pub fn session_open(&self) -> bool {
        self.lock().session_open
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock reader state poisoned")
    }
}
