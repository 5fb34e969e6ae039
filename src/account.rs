//! Core domain types: account and actor identifiers, the account row, and
//! the authenticated actor.
//!
//! Ownership is a foreign-key style reference (`Account::owner`), never an
//! object graph: the set of accounts an actor owns is always derived through
//! [`crate::store::AccountStore::find_by_owner`].

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{self, MoneyError};

/// Account identifier, assigned by the store (BIGSERIAL in PostgreSQL).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn get(self) -> i64 {
        self.0
    }

    /// Store-assigned identifiers are always positive; anything else can
    /// never name an account.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Identifier of the principal an account belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single monetary account.
///
/// The balance is private: it starts at `0.00`, never goes negative, and is
/// only moved through the validated [`credit`](Account::credit) /
/// [`debit`](Account::debit) operations the engines call under lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    owner: ActorId,
    balance: Decimal,
}

impl Account {
    /// Open a fresh account with a zero balance.
    pub fn open(id: AccountId, owner: ActorId) -> Self {
        Self {
            id,
            owner,
            balance: money::zero(),
        }
    }

    /// Rehydrate an account from a stored row.
    pub fn from_row(id: AccountId, owner: ActorId, balance: Decimal) -> Self {
        Self { id, owner, balance }
    }

    #[inline]
    pub fn id(&self) -> AccountId {
        self.id
    }

    #[inline]
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    #[inline]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Add funds to the account.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), MoneyError> {
        self.balance = money::credit(self.balance, amount)?;
        Ok(())
    }

    /// Remove funds from the account. Fails rather than going negative.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), MoneyError> {
        self.balance = money::debit(self.balance, amount)?;
        Ok(())
    }
}

/// The authenticated principal an operation runs on behalf of.
///
/// Read-only to the ledger core; produced by
/// [`crate::auth::ActorResolver::current_actor`] once per operation and
/// threaded explicitly through every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub username: String,
}

impl Actor {
    pub fn new(id: ActorId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}
