use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("connection timeout after {0}ms")]
    ConnectTimeout(u64),

    #[error("write timeout after {0}ms")]
    WriteTimeout(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("payload encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
