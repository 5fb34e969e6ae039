//! Account lifecycle: creation and closure.
//!
//! An account has a single `Active` state ended only by deletion. Closure
//! re-reads the balance under lock so a deposit racing the close cannot
//! strand money in a deleted row.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::info;

use crate::account::{AccountId, Actor};
use crate::ledger::error::LedgerError;
use crate::ledger::locked;
use crate::store::{AccountStore, StoreSession};

pub struct AccountLifecycleManager;

impl AccountLifecycleManager {
    /// Open a fresh zero-balance account owned by `actor`.
    pub async fn create<S: AccountStore + ?Sized>(
        store: &S,
        actor: &Actor,
    ) -> Result<AccountId, LedgerError> {
        let account = store.create(actor.id).await?;
        info!(actor = %actor.id, account = %account.id(), "account opened");
        Ok(account.id())
    }

    /// Close `id`, which must be owned by `actor` and hold exactly `0.00`.
    pub async fn close<S: AccountStore + ?Sized>(
        store: &S,
        actor: &Actor,
        id: AccountId,
        lock_timeout: Duration,
    ) -> Result<(), LedgerError> {
        if !id.is_positive() {
            return Err(LedgerError::BadRequest(
                "wrong id: no such account in the system".to_string(),
            ));
        }

        let owned = store.find_by_owner(actor.id).await?;
        if !owned.iter().any(|a| a.id() == id) {
            return Err(LedgerError::ForbiddenOperation(
                "forbidden: not an account of the current actor".to_string(),
            ));
        }

        let mut session = store.begin().await?;
        let result = async {
            let account = locked(session.as_mut(), id, lock_timeout).await?;
            if account.balance() > Decimal::ZERO {
                return Err(LedgerError::ForbiddenOperation(
                    "this account has a positive balance".to_string(),
                ));
            }
            session.delete(id).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                session.commit().await?;
                info!(actor = %actor.id, account = %id, "account closed");
                Ok(())
            }
            Err(err) => {
                session.rollback().await?;
                Err(err)
            }
        }
    }
}
