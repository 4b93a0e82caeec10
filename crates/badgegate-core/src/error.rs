use thiserror::Error;

/// Errors produced while constructing or parsing core domain values.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid card UID: {message}")]
    InvalidUid { message: String },

    #[error("Invalid weekday index {index}, expected 0-6 (0=Monday)")]
    InvalidWeekday { index: u8 },

    #[error("Invalid time window: {message}")]
    InvalidTimeWindow { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
