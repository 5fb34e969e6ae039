//! Money handling
//!
//! All ledger amounts are fixed-point decimals with exactly two fractional
//! digits. This module is the single place that enforces that scale:
//! request amounts are normalized here before any engine sees them, and
//! balance arithmetic goes through the checked helpers below.

use rust_decimal::Decimal;
use thiserror::Error;

/// Fractional digits carried by every amount and balance.
pub const SCALE: u32 = 2;

/// Money handling errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount has {provided} fractional digits, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("amount exceeds the representable range")]
    Overflow,

    #[error("not enough money for this operation")]
    Insufficient,
}

/// Largest amount the ledger accepts (matches NUMERIC(20, 2) comfortably).
pub fn max_amount() -> Decimal {
    Decimal::new(i64::MAX, SCALE)
}

/// Normalize an amount to scale 2.
///
/// Trailing zeros beyond the scale are fine (`1.500` is `1.50`); real
/// sub-cent precision is rejected rather than silently truncated.
pub fn normalize(amount: Decimal) -> Result<Decimal, MoneyError> {
    let trimmed = amount.normalize();
    if trimmed.scale() > SCALE {
        return Err(MoneyError::PrecisionOverflow {
            provided: trimmed.scale(),
            max: SCALE,
        });
    }
    if amount.abs() > max_amount() {
        return Err(MoneyError::Overflow);
    }
    let mut out = trimmed;
    out.rescale(SCALE);
    Ok(out)
}

/// `balance + amount`, guarding the upper bound.
pub fn credit(balance: Decimal, amount: Decimal) -> Result<Decimal, MoneyError> {
    let next = balance.checked_add(amount).ok_or(MoneyError::Overflow)?;
    if next > max_amount() {
        return Err(MoneyError::Overflow);
    }
    Ok(next)
}

/// `balance - amount`, guarding the zero floor.
pub fn debit(balance: Decimal, amount: Decimal) -> Result<Decimal, MoneyError> {
    let next = balance.checked_sub(amount).ok_or(MoneyError::Overflow)?;
    if next < Decimal::ZERO {
        return Err(MoneyError::Insufficient);
    }
    Ok(next)
}

/// Zero at the ledger scale (`0.00`).
pub fn zero() -> Decimal {
    let mut z = Decimal::ZERO;
    z.rescale(SCALE);
    z
}

/// Render an amount for API responses, always with two fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.prec$}", amount, prec = SCALE as usize)
}
