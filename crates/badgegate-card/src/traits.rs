//! Hardware abstraction for the RFID reader.
//!
//! The [`CardReader`] trait is the seam between the terminal and the radio.
//! A real implementation drives an actual reader chip; [`crate::mock`]
//! provides a programmable in-memory implementation for tests and
//! development.
//!
//! # Object Safety
//!
//! Methods are native `async fn` (Edition 2024 RPITIT), so the trait is not
//! object-safe. Callers use generic type parameters
//! (`fn run<R: CardReader>(reader: R)`), which is how the rest of the
//! workspace consumes it.

use crate::error::Result;
use crate::keyring::Key;
use badgegate_core::CardUid;
use badgegate_core::constants::BLOCK_LEN;

/// Low-level RFID reader operations.
///
/// One card is in the field at a time: [`wait_for_card`](Self::wait_for_card)
/// selects it, and the auth/read/write calls that follow operate on the
/// selected card. [`stop_crypto`](Self::stop_crypto) releases the
/// authenticated session and must be called after every block operation,
/// success or failure.
pub trait CardReader: Send {
    /// Block asynchronously until a card enters the field, then return its
    /// anti-collision UID. Implementations poll with a short sleep rather
    /// than busy-spinning.
    ///
    /// # Errors
    /// Returns a device error if the reader is disconnected.
    async fn wait_for_card(&mut self) -> Result<CardUid>;

    /// Prove knowledge of `key` for the sector containing `block` on the
    /// selected card. Returns `Ok(false)` when the key is rejected; `Err`
    /// is reserved for device failures.
    async fn auth(&mut self, uid: &CardUid, block: u8, key: &Key) -> Result<bool>;

    /// Read the raw payload of `block`. Requires a successful `auth`.
    ///
    /// The payload should be [`BLOCK_LEN`] bytes; the transport layer
    /// rejects anything else.
    async fn read(&mut self, block: u8) -> Result<Vec<u8>>;

    /// Write 16 bytes to `block`. Requires a successful `auth`.
    async fn write(&mut self, block: u8, data: &[u8; BLOCK_LEN]) -> Result<()>;

    /// Release the authenticated session with the selected card.
    async fn stop_crypto(&mut self) -> Result<()>;
}
