//! Account persistence abstraction.
//!
//! The ledger core is storage-agnostic: engines talk to an [`AccountStore`]
//! for plain reads and open a [`StoreSession`] for every mutating operation.
//! A session is one transaction: locked reads, staged writes, then a single
//! `commit`; dropping a session without committing discards everything.
//!
//! Two backends ship with the crate:
//! - [`postgres::PgAccountStore`]: `SELECT ... FOR UPDATE` row locks inside
//!   an sqlx transaction, with a statement-local `lock_timeout`.
//! - [`memory::MemoryStore`]: per-row async mutexes with a bounded wait,
//!   staged writes applied atomically at commit. Used by the test suite and
//!   as an embedded backend.
//!
//! Both satisfy the same contract: concurrent mutation of one account is
//! serialized, and a lock not acquired within the timeout fails the
//! operation with [`StoreError::LockTimeout`].

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::account::{Account, AccountId, ActorId};

/// Default exclusive-lock wait, matching the 3000ms the engines were tuned
/// against.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(3000);

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The exclusive hold on a row was not acquired within the wait.
    /// Transient: the caller may retry the whole operation.
    #[error("lock on account {0} not acquired within {1:?}")]
    LockTimeout(AccountId, Duration),

    /// A session tried to mutate a row it never locked. Programming error
    /// in the calling engine, never caused by user input.
    #[error("account {0} mutated without holding its lock")]
    LockNotHeld(AccountId),

    /// Backstop for the balance >= 0 invariant at the persistence boundary.
    /// The pipelines check first; this only fires if an engine slips.
    #[error("negative balance rejected for account {0}")]
    NegativeBalance(AccountId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence over account rows.
///
/// `create` is a single-statement transaction of its own; everything that
/// mutates an existing row goes through [`StoreSession`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Plain fetch. May be stale relative to in-flight sessions.
    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Existence check without materializing the row.
    async fn exists(&self, id: AccountId) -> Result<bool, StoreError>;

    /// All accounts owned by `owner`, ordered by ascending id.
    async fn find_by_owner(&self, owner: ActorId) -> Result<Vec<Account>, StoreError>;

    /// Persist a fresh zero-balance account and return it with its assigned id.
    async fn create(&self, owner: ActorId) -> Result<Account, StoreError>;

    /// Open a transactional session.
    async fn begin(&self) -> Result<Box<dyn StoreSession>, StoreError>;
}

/// One transaction against the store.
///
/// `locked_get` acquires an exclusive hold on the row for the remainder of
/// the session; `save` and `delete` must only be called on rows the session
/// holds. Nothing becomes visible to other readers until `commit`.
#[async_trait]
pub trait StoreSession: Send {
    /// Exclusive-lock fetch with a bounded wait.
    async fn locked_get(
        &mut self,
        id: AccountId,
        timeout: Duration,
    ) -> Result<Option<Account>, StoreError>;

    /// Stage an updated row. Requires the row's lock.
    async fn save(&mut self, account: &Account) -> Result<(), StoreError>;

    /// Stage a row deletion. Requires the row's lock.
    async fn delete(&mut self, id: AccountId) -> Result<(), StoreError>;

    /// Atomically publish every staged mutation and release all locks.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every staged mutation and release all locks.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
