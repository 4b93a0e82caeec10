//! Authenticated single-block card I/O.
//!
//! [`CardTransport`] wraps a [`CardReader`] and enforces the invariants the
//! raw trait cannot: trailer blocks are never touched as data, every block
//! operation is preceded by sector authentication, and the crypto session is
//! released on the way out of every operation, success or failure.

use crate::codec::Block;
use crate::error::{CardError, Result};
use crate::keyring::{Key, KeyRing};
use crate::traits::CardReader;
use badgegate_core::CardUid;
use badgegate_core::constants::SECTOR_BLOCKS;
use tracing::{debug, warn};

/// Whether `block` is a sector trailer (keys and access bits).
#[must_use]
pub fn is_trailer_block(block: u8) -> bool {
    (block as usize + 1) % SECTOR_BLOCKS == 0
}

/// Key-ring-aware block transport over a [`CardReader`].
#[derive(Debug)]
pub struct CardTransport<R> {
    reader: R,
    keys: KeyRing,
}

impl<R: CardReader> CardTransport<R> {
    /// Create a transport with the default key ring.
    pub fn new(reader: R) -> Self {
        CardTransport {
            reader,
            keys: KeyRing::default(),
        }
    }

    /// Create a transport with a specific primary key.
    pub fn with_primary_key(reader: R, primary: Key) -> Self {
        CardTransport {
            reader,
            keys: KeyRing::new(primary),
        }
    }

    /// Wait for the next card in the field.
    pub async fn wait_for_card(&mut self) -> Result<CardUid> {
        self.reader.wait_for_card().await
    }

    /// Authenticate the sector containing `block`, walking the key ring.
    ///
    /// The first key that works is remembered, so the next block of a
    /// multi-block operation authenticates on the first try. Returns
    /// `Ok(false)` when no key in the ring matches.
    pub async fn authenticate(&mut self, uid: &CardUid, block: u8) -> Result<bool> {
        for key in self.keys.candidates() {
            if self.reader.auth(uid, block, &key).await? {
                self.keys.remember(key);
                return Ok(true);
            }
        }
        debug!(%uid, block, "no key in the ring authenticated the sector");
        Ok(false)
    }

    /// Read one data block.
    ///
    /// # Errors
    /// `TrailerBlock` for trailer blocks, `Auth` when the key ring is
    /// exhausted, `Read` when the transport fails or the payload is not
    /// exactly 16 bytes.
    pub async fn read_block(&mut self, uid: &CardUid, block: u8) -> Result<Block> {
        self.check_data_block(block)?;
        if !self.authenticate(uid, block).await? {
            return Err(CardError::Auth {
                uid: uid.to_string(),
                block,
            });
        }

        let result = self.reader.read(block).await;
        self.release_session(uid).await;

        let payload = result.map_err(|e| CardError::read(uid, block, e.to_string()))?;
        let data: Block = payload
            .as_slice()
            .try_into()
            .map_err(|_| CardError::read(uid, block, format!("payload was {} bytes", payload.len())))?;
        Ok(data)
    }

    /// Write one data block.
    ///
    /// # Errors
    /// Same taxonomy as [`read_block`](Self::read_block), with `Write` for
    /// transport failures.
    pub async fn write_block(&mut self, uid: &CardUid, block: u8, data: &Block) -> Result<()> {
        self.check_data_block(block)?;
        if !self.authenticate(uid, block).await? {
            return Err(CardError::Auth {
                uid: uid.to_string(),
                block,
            });
        }

        let result = self.reader.write(block, data).await;
        self.release_session(uid).await;

        result.map_err(|e| CardError::write(uid, block, e.to_string()))
    }

    /// Access the underlying reader (used by mocks in tests).
    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    fn check_data_block(&self, block: u8) -> Result<()> {
        if is_trailer_block(block) {
            return Err(CardError::TrailerBlock { block });
        }
        Ok(())
    }

    /// Stop crypto regardless of how the block operation went. A failure to
    /// release is logged, not propagated: the block operation's own result
    /// is the one the caller needs.
    async fn release_session(&mut self, uid: &CardUid) {
        if let Err(e) = self.reader.stop_crypto().await {
            warn!(%uid, error = %e, "failed to release card crypto session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_text;
    use crate::keyring::DEFAULT_KEY;
    use crate::mock::MockReader;
    use rstest::rstest;

    fn uid() -> CardUid {
        CardUid::new(vec![4, 171, 205, 239]).unwrap()
    }

    #[rstest]
    #[case(3)]
    #[case(7)]
    #[case(11)]
    #[case(63)]
    fn trailer_blocks_are_every_fourth(#[case] block: u8) {
        assert!(is_trailer_block(block));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(5)]
    #[case(6)]
    fn data_blocks_are_not_trailers(#[case] block: u8) {
        assert!(!is_trailer_block(block));
    }

    #[tokio::test]
    async fn read_refuses_trailer_blocks() {
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), DEFAULT_KEY);
        let mut transport = CardTransport::new(reader);

        let err = transport.read_block(&uid(), 7).await.unwrap_err();
        assert!(matches!(err, CardError::TrailerBlock { block: 7 }));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), DEFAULT_KEY);
        let mut transport = CardTransport::new(reader);

        let data = encode_text("hello");
        transport.write_block(&uid(), 4, &data).await.unwrap();
        assert_eq!(transport.read_block(&uid(), 4).await.unwrap(), data);
    }

    #[tokio::test]
    async fn fallback_key_authenticates_and_is_cached() {
        let (reader, mut handle) = MockReader::new();
        // Card keyed with a factory key that is not the primary.
        handle.add_card(uid(), [0xA0; 6]);
        let mut transport = CardTransport::new(reader);

        assert!(transport.authenticate(&uid(), 4).await.unwrap());
        assert_eq!(transport.keys.cached(), Some([0xA0; 6]));
    }

    #[tokio::test]
    async fn unknown_key_fails_auth() {
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), [0x13, 0x37, 0x13, 0x37, 0x13, 0x37]);
        let mut transport = CardTransport::new(reader);

        assert!(!transport.authenticate(&uid(), 4).await.unwrap());
        let err = transport.read_block(&uid(), 4).await.unwrap_err();
        assert!(matches!(err, CardError::Auth { .. }));
    }

    #[tokio::test]
    async fn truncated_payload_is_a_read_error() {
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), DEFAULT_KEY);
        handle.truncate_reads(true);
        let mut transport = CardTransport::new(reader);

        let err = transport.read_block(&uid(), 4).await.unwrap_err();
        assert!(matches!(err, CardError::Read { .. }));
    }

    #[tokio::test]
    async fn session_is_released_after_failed_read() {
        let (reader, mut handle) = MockReader::new();
        handle.add_card(uid(), DEFAULT_KEY);
        handle.fail_reads(true);
        let mut transport = CardTransport::new(reader);

        assert!(transport.read_block(&uid(), 4).await.is_err());
        assert!(!handle.session_open());
    }
}
