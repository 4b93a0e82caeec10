//! High-level card operations: identity and counter blocks.
//!
//! The physical layout is fixed: block 4 carries the badge's identity text,
//! block 5 the credit counter. [`CardService`] pairs the transport with the
//! codec so callers deal in domain values, not raw blocks.

use crate::codec::{self, Block};
use crate::error::Result;
use crate::traits::CardReader;
use crate::transport::CardTransport;
use badgegate_core::CardUid;
use badgegate_core::constants::{COUNTER_BLOCK, IDENTITY_BLOCK};

/// Identity/counter access over an authenticated transport.
#[derive(Debug)]
pub struct CardService<R> {
    transport: CardTransport<R>,
}

impl<R: CardReader> CardService<R> {
    pub fn new(transport: CardTransport<R>) -> Self {
        CardService { transport }
    }

    /// Wait for the next card in the field.
    pub async fn wait_for_card(&mut self) -> Result<CardUid> {
        self.transport.wait_for_card().await
    }

    /// Read the identity text from block 4.
    pub async fn read_identity(&mut self, uid: &CardUid) -> Result<String> {
        let block = self.transport.read_block(uid, IDENTITY_BLOCK).await?;
        codec::decode_text(&block)
    }

    /// Write the identity text to block 4.
    pub async fn write_identity(&mut self, uid: &CardUid, identity: &str) -> Result<()> {
        self.transport
            .write_block(uid, IDENTITY_BLOCK, &codec::encode_text(identity))
            .await
    }

    /// Read the credit counter from block 5.
    pub async fn read_counter(&mut self, uid: &CardUid) -> Result<u32> {
        let block = self.transport.read_block(uid, COUNTER_BLOCK).await?;
        codec::decode_int(&block)
    }

    /// Write the credit counter to block 5.
    pub async fn write_counter(&mut self, uid: &CardUid, value: u32) -> Result<()> {
        self.transport
            .write_block(uid, COUNTER_BLOCK, &codec::encode_int(value))
            .await
    }

    /// Raw block read for the admin diagnostic menu.
    pub async fn read_block(&mut self, uid: &CardUid, block: u8) -> Result<Block> {
        self.transport.read_block(uid, block).await
    }

    /// Raw block write for the admin diagnostic menu.
    pub async fn write_block(&mut self, uid: &CardUid, block: u8, data: &Block) -> Result<()> {
        self.transport.write_block(uid, block, data).await
    }
}
