//! Validation pipelines.
//!
//! Stateless checks that run strictly in order and short-circuit on the
//! first failure; no store mutation happens until a pipeline has fully
//! succeeded. Reads here may be slightly stale - the engines re-read every
//! balance under lock before mutating.

use rust_decimal::Decimal;

use crate::account::{Account, AccountId, Actor};
use crate::ledger::error::LedgerError;
use crate::ledger::types::{FundRequest, TransferRequest};
use crate::money;
use crate::store::AccountStore;

/// Resolve and authorize a transfer request.
///
/// Order: empty body, source resolution, destination resolution, amount,
/// sufficiency. Returns `(from, to, amount)` with the amount normalized to
/// scale 2.
pub async fn resolve_transfer<S: AccountStore + ?Sized>(
    store: &S,
    actor: &Actor,
    req: &TransferRequest,
) -> Result<(AccountId, AccountId, Decimal), LedgerError> {
    if req.is_empty() {
        return Err(LedgerError::BadRequest("empty request body".to_string()));
    }

    let owned = store.find_by_owner(actor.id).await?;
    let from = resolve_owned(&owned, req.from_id)?;

    let to = match req.to_id {
        None => {
            return Err(LedgerError::UncertainAccount(
                "destination account has not been defined".to_string(),
            ));
        }
        Some(to) => {
            if !store.exists(to).await? {
                return Err(LedgerError::UncertainAccount(
                    "destination account does not exist".to_string(),
                ));
            }
            to
        }
    };

    let amount = check_amount(req.amount)?;

    let source = store
        .get(from)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("account {from}")))?;
    if source.balance() < amount {
        return Err(LedgerError::ForbiddenOperation(
            "not enough money for this operation".to_string(),
        ));
    }

    Ok((from, to, amount))
}

/// Resolve and authorize a funding request.
///
/// Order: empty body, amount, destination resolution. The destination must
/// be owned by the actor - funding someone else's account is not a thing.
pub async fn resolve_funding<S: AccountStore + ?Sized>(
    store: &S,
    actor: &Actor,
    req: &FundRequest,
) -> Result<(AccountId, Decimal), LedgerError> {
    if req.is_empty() {
        return Err(LedgerError::BadRequest("empty request body".to_string()));
    }

    let amount = check_amount(req.amount)?;

    let owned = store.find_by_owner(actor.id).await?;
    let to = resolve_owned(&owned, req.to_id)?;

    Ok((to, amount))
}

/// Implicit account resolution: with no explicit id the actor must own
/// exactly one account - zero or several is ambiguous and fails rather than
/// silently picking one. An explicit id must be among the actor's accounts.
fn resolve_owned(owned: &[Account], explicit: Option<AccountId>) -> Result<AccountId, LedgerError> {
    match explicit {
        None => {
            if owned.len() == 1 {
                Ok(owned[0].id())
            } else {
                Err(LedgerError::UncertainAccount(
                    "actor owns no account or more than one".to_string(),
                ))
            }
        }
        Some(id) => {
            if owned.iter().any(|a| a.id() == id) {
                Ok(id)
            } else {
                Err(LedgerError::UncertainAccount(
                    "forbidden: not an account of the current actor".to_string(),
                ))
            }
        }
    }
}

/// Amount must be present and non-negative; sub-cent precision is a
/// malformed payload.
fn check_amount(amount: Option<Decimal>) -> Result<Decimal, LedgerError> {
    let amount = amount.ok_or_else(|| {
        LedgerError::ForbiddenOperation("request does not contain the amount".to_string())
    })?;
    if amount < Decimal::ZERO {
        return Err(LedgerError::ForbiddenOperation(
            "negative amount cannot be transferred".to_string(),
        ));
    }
    Ok(money::normalize(amount)?)
}
