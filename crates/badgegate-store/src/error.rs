use thiserror::Error;

/// Errors raised by the file-backed stores.
///
/// These are hard failures (I/O, corrupt files); expected business outcomes
/// such as "badge not found" are modeled as `Option`/`bool` returns.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A ledger or journal row could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The atomic rename of a rewritten ledger failed.
    #[error("Atomic replace failed: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// The admin challenge file is present but malformed.
    #[error("Challenge file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Specialized result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
