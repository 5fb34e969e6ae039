//! Request payloads for the public ledger operations.
//!
//! Optional fields stay optional here on purpose: implicit account
//! resolution (inferring the account when an actor owns exactly one) is the
//! validation pipeline's job, not the deserializer's.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Move money between two accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Source account. May be omitted when the actor owns exactly one.
    #[serde(default)]
    pub from_id: Option<AccountId>,
    /// Destination account. Required, but validated rather than rejected at
    /// the wire so the failure is a structured `UncertainAccount`.
    #[serde(default)]
    pub to_id: Option<AccountId>,
    /// Non-negative, at most two fractional digits.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl TransferRequest {
    /// A body that carries no information at all.
    pub fn is_empty(&self) -> bool {
        self.from_id.is_none() && self.to_id.is_none() && self.amount.is_none()
    }
}

/// Deposit money into an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundRequest {
    /// Destination account. May be omitted when the actor owns exactly one.
    #[serde(default)]
    pub to_id: Option<AccountId>,
    /// Non-negative, at most two fractional digits.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl FundRequest {
    pub fn is_empty(&self) -> bool {
        self.to_id.is_none() && self.amount.is_none()
    }
}
