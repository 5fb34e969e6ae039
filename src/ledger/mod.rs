//! The ledger core: validation pipelines, mutation engines, and the public
//! operation facade.
//!
//! Every public operation runs as one atomic transaction: validate first
//! (no mutation), then lock, mutate, and commit - or abort with zero
//! observable side effects. The actor is always an explicit parameter,
//! resolved once per operation at the calling layer.

pub mod error;
pub mod funding;
pub mod lifecycle;
pub mod transfer;
pub mod types;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use crate::account::{Account, AccountId, Actor};
use crate::store::{AccountStore, DEFAULT_LOCK_TIMEOUT, StoreSession};

pub use error::LedgerError;
pub use funding::FundingEngine;
pub use lifecycle::AccountLifecycleManager;
pub use transfer::TransferEngine;
pub use types::{FundRequest, TransferRequest};

/// Exclusive-lock fetch that treats a vanished row as a hard failure.
///
/// Used by the engines after validation: the row existed moments ago, so a
/// miss here means it was deleted mid-flight and the operation must abort.
pub(crate) async fn locked(
    session: &mut dyn StoreSession,
    id: AccountId,
    timeout: Duration,
) -> Result<Account, LedgerError> {
    session
        .locked_get(id, timeout)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("account {id} disappeared mid-operation")))
}

/// The public face of the ledger: create, fund, transfer, close.
pub struct Ledger<S: AccountStore> {
    store: Arc<S>,
    lock_timeout: Duration,
}

impl<S: AccountStore> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lock_timeout: self.lock_timeout,
        }
    }
}

impl<S: AccountStore> Ledger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override the exclusive-lock wait (default 3000ms).
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new zero-balance account for `actor` and return its id.
    pub async fn create_account(&self, actor: &Actor) -> Result<AccountId, LedgerError> {
        AccountLifecycleManager::create(self.store.as_ref(), actor).await
    }

    /// Deposit into one of `actor`'s accounts and return the funded id.
    pub async fn fund(&self, actor: &Actor, req: FundRequest) -> Result<AccountId, LedgerError> {
        let (to, amount) = validation::resolve_funding(self.store.as_ref(), actor, &req).await?;
        FundingEngine::execute(self.store.as_ref(), to, amount, self.lock_timeout).await
    }

    /// Move money from one of `actor`'s accounts to any existing account.
    pub async fn transfer(&self, actor: &Actor, req: TransferRequest) -> Result<(), LedgerError> {
        let (from, to, amount) =
            validation::resolve_transfer(self.store.as_ref(), actor, &req).await?;
        TransferEngine::execute(self.store.as_ref(), from, to, amount, self.lock_timeout).await?;
        Ok(())
    }

    /// Close an empty account owned by `actor`.
    pub async fn close_account(&self, actor: &Actor, id: AccountId) -> Result<(), LedgerError> {
        AccountLifecycleManager::close(self.store.as_ref(), actor, id, self.lock_timeout).await
    }

    /// All accounts owned by `actor`, ascending by id.
    pub async fn accounts_of(&self, actor: &Actor) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.find_by_owner(actor.id).await?)
    }
}
