use badgegate_store::StoreError;
use thiserror::Error;

/// Hard failures inside the decision and credit logic.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying ledger or journal failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A billing operation referenced a badge the ledger no longer has.
    /// This cannot happen in the normal grant-then-bill flow and marks a
    /// ledger mutation that raced the scan.
    #[error("no ledger record for badge {uid} at billing time")]
    UnknownBadge { uid: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
