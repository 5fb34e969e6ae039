//! Transfer engine.
//!
//! Two-account balance mutation under ordered exclusive locks. Both rows are
//! locked in ascending-id order before anything is touched, so two opposing
//! concurrent transfers can never form a lock-wait cycle. Balances are
//! re-read under lock - the pre-validation snapshot is advisory only.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::account::AccountId;
use crate::ledger::error::LedgerError;
use crate::ledger::locked;
use crate::store::{AccountStore, StoreSession};

pub struct TransferEngine;

impl TransferEngine {
    /// Move `amount` from `from` to `to` atomically.
    ///
    /// Any failure after lock acquisition aborts the whole transaction -
    /// neither mutation is retained. Returns the destination account id.
    pub async fn execute<S: AccountStore + ?Sized>(
        store: &S,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        lock_timeout: Duration,
    ) -> Result<AccountId, LedgerError> {
        let mut session = store.begin().await?;
        match Self::run(session.as_mut(), from, to, amount, lock_timeout).await {
            Ok(()) => {
                session.commit().await?;
                info!(%from, %to, %amount, "transfer committed");
                Ok(to)
            }
            Err(err) => {
                debug!(%from, %to, %amount, error = %err, "transfer aborted");
                session.rollback().await?;
                Err(err)
            }
        }
    }

    async fn run(
        session: &mut dyn StoreSession,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        lock_timeout: Duration,
    ) -> Result<(), LedgerError> {
        if from == to {
            // Degenerate self-transfer: one lock, and the debit/credit pair
            // cancels out. Still verified so an uncovered amount fails the
            // same way it would against any other destination.
            let account = locked(session, from, lock_timeout).await?;
            if account.balance() < amount {
                return Err(LedgerError::ForbiddenOperation(
                    "not enough money for this operation".to_string(),
                ));
            }
            return Ok(());
        }

        // Deterministic global order: ascending account id.
        let (first, second) = if from < to { (from, to) } else { (to, from) };
        let mut first_row = locked(session, first, lock_timeout).await?;
        let mut second_row = locked(session, second, lock_timeout).await?;

        let (source, dest) = if first == from {
            (&mut first_row, &mut second_row)
        } else {
            (&mut second_row, &mut first_row)
        };

        if source.balance() < amount {
            return Err(LedgerError::ForbiddenOperation(
                "not enough money for this operation".to_string(),
            ));
        }

        source.debit(amount)?;
        dest.credit(amount)?;

        session.save(source).await?;
        session.save(dest).await?;
        Ok(())
    }
}
