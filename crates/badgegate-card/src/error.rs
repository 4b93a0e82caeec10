//! Error types for card operations.

/// Result type alias for card operations.
pub type Result<T> = std::result::Result<T, CardError>;

/// Errors that can occur while talking to a physical card.
///
/// `TrailerBlock` is always a caller bug and fails fast; `Auth` is an
/// expected, recoverable outcome (wrong or re-keyed card); `Read`/`Write`
/// are transport failures after successful authentication; `Codec` marks a
/// block whose content cannot be interpreted and is treated as "no data".
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// Attempted data operation on a sector trailer block.
    #[error("Block {block} is a sector trailer and must never be used for data")]
    TrailerBlock { block: u8 },

    /// No key in the ring authenticated the sector.
    #[error("Authentication failed for block {block} on card {uid}")]
    Auth { uid: String, block: u8 },

    /// Transport-level read failure after successful authentication.
    #[error("Read failed on card {uid}, block {block}: {message}")]
    Read {
        uid: String,
        block: u8,
        message: String,
    },

    /// Transport-level write failure after successful authentication.
    #[error("Write failed on card {uid}, block {block}: {message}")]
    Write {
        uid: String,
        block: u8,
        message: String,
    },

    /// Block content could not be interpreted as the expected value.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Reader device failure (disconnection, channel closed, ...).
    #[error("Reader device error: {message}")]
    Device { message: String },
}

impl CardError {
    /// Create a read error for the given card and block.
    pub fn read(uid: impl ToString, block: u8, message: impl Into<String>) -> Self {
        Self::Read {
            uid: uid.to_string(),
            block,
            message: message.into(),
        }
    }

    /// Create a write error for the given card and block.
    pub fn write(uid: impl ToString, block: u8, message: impl Into<String>) -> Self {
        Self::Write {
            uid: uid.to_string(),
            block,
            message: message.into(),
        }
    }

    /// Create a device error.
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /// Whether this error is an expected, recoverable condition rather
    /// than a caller bug.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CardError::TrailerBlock { .. })
    }
}
