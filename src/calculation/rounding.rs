//! Currency rounding.
//!
//! Derived amounts (tax, card fees) are rounded to whole cents, half a cent
//! rounding away from zero. Subtotals are never rounded.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

/// Number of decimal places in a currency amount.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Rounds an amount to cents, with midpoints rounded away from zero.
///
/// # Examples
///
/// ```
/// use stay_pricing::calculation::round_to_cents;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_cents(Decimal::from_str("22.505").unwrap()), Decimal::from_str("22.51").unwrap());
/// assert_eq!(round_to_cents(Decimal::from_str("22.504").unwrap()), Decimal::from_str("22.50").unwrap());
/// ```
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a currency amount to integer cents for a payment processor.
///
/// # Examples
///
/// ```
/// use stay_pricing::calculation::to_cents;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(to_cents(Decimal::from_str("772.50").unwrap()).unwrap(), 77250);
/// ```
pub fn to_cents(amount: Decimal) -> EngineResult<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| EngineError::InvalidChargeAmount {
            message: format!("charge amount {} is out of range", amount),
        })
}

/// Converts integer cents back to a currency amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CURRENCY_DECIMAL_PLACES)
}
