//! Funding engine.
//!
//! Single-account deposit under an exclusive lock. Not idempotent by
//! design: repeated calls with the same request keep adding, and
//! deduplication belongs to the caller.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::account::AccountId;
use crate::ledger::error::LedgerError;
use crate::ledger::locked;
use crate::store::{AccountStore, StoreSession};

pub struct FundingEngine;

impl FundingEngine {
    /// Credit `amount` to `to` atomically. Returns the funded account id.
    pub async fn execute<S: AccountStore + ?Sized>(
        store: &S,
        to: AccountId,
        amount: Decimal,
        lock_timeout: Duration,
    ) -> Result<AccountId, LedgerError> {
        let mut session = store.begin().await?;
        match Self::run(session.as_mut(), to, amount, lock_timeout).await {
            Ok(()) => {
                session.commit().await?;
                info!(%to, %amount, "deposit committed");
                Ok(to)
            }
            Err(err) => {
                debug!(%to, %amount, error = %err, "deposit aborted");
                session.rollback().await?;
                Err(err)
            }
        }
    }

    async fn run(
        session: &mut dyn StoreSession,
        to: AccountId,
        amount: Decimal,
        lock_timeout: Duration,
    ) -> Result<(), LedgerError> {
        let mut account = locked(session, to, lock_timeout).await?;
        account.credit(amount)?;
        session.save(&account).await?;
        Ok(())
    }
}
