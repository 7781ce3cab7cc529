//! Card-processing surcharge.
//!
//! Long-term stays paid by card carry a surcharge to offset processor costs.
//! Short stays never do; the property absorbs the fee. Bank transfers are
//! never surcharged.

use rust_decimal::Decimal;

use crate::config::PricingPolicy;

use super::round_to_cents;

/// Returns the card surcharge rate for a stay.
///
/// # Examples
///
/// ```
/// use stay_pricing::calculation::card_fee_percent;
/// use stay_pricing::config::PricingPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PricingPolicy::new(Decimal::new(8, 2));
/// assert_eq!(card_fee_percent(true, &policy), Decimal::new(3, 2));
/// assert_eq!(card_fee_percent(false, &policy), Decimal::ZERO);
/// ```
pub fn card_fee_percent(is_long_term: bool, policy: &PricingPolicy) -> Decimal {
    if is_long_term {
        policy.cc_fee_rate
    } else {
        Decimal::ZERO
    }
}

/// Surcharge on `amount` at `fee_percent`, rounded to cents.
pub fn calculate_card_fee(amount: Decimal, fee_percent: Decimal) -> Decimal {
    round_to_cents(amount * fee_percent)
}
