//! Pure conversions between 16-byte card blocks and domain values.
//!
//! The card stores two kinds of payloads: the identity text (zero-padded
//! ASCII) and the credit counter (big-endian `u32` in the first four bytes).
//! Big-endian four-byte binary is the single canonical integer encoding;
//! taking `u32` at the type level makes oversized or negative values
//! unrepresentable instead of silently truncating them.

use crate::error::{CardError, Result};
use badgegate_core::constants::{BLOCK_LEN, COUNTER_BYTES};

/// One addressable unit of card memory.
pub type Block = [u8; BLOCK_LEN];

/// Placeholder substituted for non-ASCII characters on encode and for
/// non-printable bytes on decode.
const PLACEHOLDER: u8 = b'?';

/// Encode a string into a 16-byte block.
///
/// ASCII only: non-ASCII characters are replaced with `?`. Longer input is
/// truncated to 16 bytes, shorter input is zero-padded.
#[must_use]
pub fn encode_text(s: &str) -> Block {
    let mut block = [0u8; BLOCK_LEN];
    for (slot, ch) in block.iter_mut().zip(s.chars()) {
        *slot = if ch.is_ascii() { ch as u8 } else { PLACEHOLDER };
    }
    block
}

/// Decode the text payload of a block, reading up to the first zero byte.
///
/// # Errors
/// Returns `CardError::Codec` if the slice is not exactly 16 bytes, which
/// marks a malformed transport payload rather than empty content.
pub fn decode_text(data: &[u8]) -> Result<String> {
    let block = as_block(data)?;
    let text = block
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { PLACEHOLDER as char })
        .collect();
    Ok(text)
}

/// Encode an integer into a 16-byte block: big-endian value in the first
/// four bytes, zero-padded remainder.
#[must_use]
pub fn encode_int(n: u32) -> Block {
    let mut block = [0u8; BLOCK_LEN];
    block[..COUNTER_BYTES].copy_from_slice(&n.to_be_bytes());
    block
}

/// Decode the integer payload of a block (first four bytes, big-endian).
///
/// # Errors
/// Returns `CardError::Codec` if the slice is not exactly 16 bytes.
pub fn decode_int(data: &[u8]) -> Result<u32> {
    let block = as_block(data)?;
    let mut bytes = [0u8; COUNTER_BYTES];
    bytes.copy_from_slice(&block[..COUNTER_BYTES]);
    Ok(u32::from_be_bytes(bytes))
}

fn as_block(data: &[u8]) -> Result<&Block> {
    data.try_into()
        .map_err(|_| CardError::Codec(format!("expected {BLOCK_LEN} bytes, got {}", data.len())))
}
