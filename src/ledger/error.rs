//! Ledger error taxonomy.
//!
//! Every failure a public operation can surface is one of these kinds.
//! Validation failures are raised before any mutation; a failure during the
//! mutation phase rolls the whole transaction back. Nothing is retried
//! internally - `LockTimeout` in particular is transient and the caller
//! owns the retry decision.

use thiserror::Error;

use crate::money::MoneyError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing request payload.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Account reference missing, ambiguous, or not owned/found.
    #[error("uncertain account: {0}")]
    UncertainAccount(String),

    /// The operation itself is not allowed: negative or absent amount,
    /// insufficient funds, closing an account that still holds money.
    #[error("forbidden operation: {0}")]
    ForbiddenOperation(String),

    /// Exclusive lock not acquired within the configured wait.
    /// Transient - the caller may retry the whole operation.
    #[error("account is busy, the operation may be retried")]
    LockTimeout,

    /// A referenced entity vanished where its existence is mandatory
    /// (e.g. a validated account deleted before the engine locked it).
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage backend fault.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LockTimeout(_, _) => LedgerError::LockTimeout,
            other => LedgerError::Store(other),
        }
    }
}

impl From<MoneyError> for LedgerError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::Insufficient => {
                LedgerError::ForbiddenOperation("not enough money for this operation".to_string())
            }
            scale_or_range => LedgerError::BadRequest(scale_or_range.to_string()),
        }
    }
}
